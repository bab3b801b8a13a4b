//! State-diff fallback: reconstructs a plausible move list by comparing
//! two snapshots when the server update carried no move metadata at all.

use std::collections::BTreeMap;

use common::game::command::MoveRecordKind;
use common::model::player::PlayerSlot;
use common::model::region::RegionIndex;
use common::model::state::GameState;

/// A move inferred purely from the difference between two states; unlike
/// [`common::game::command::MoveRecord`] it never carries an attack
/// sequence, since the server omitted one.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedMove {
    pub source: Option<RegionIndex>,
    pub target: RegionIndex,
    pub count: u32,
    pub kind: MoveRecordKind,
    pub new_owner: Option<PlayerSlot>,
}

struct Source {
    region: RegionIndex,
    owner: Option<PlayerSlot>,
    remaining: u32,
}

struct Gain {
    region: RegionIndex,
    owner_before: Option<PlayerSlot>,
    owner_after: Option<PlayerSlot>,
    amount: u32,
    is_conquest: bool,
}

/// Compares `previous` and `new` region-by-region and emits the best-effort
/// move list the real commands must have produced.
pub fn detect_moves(previous: &GameState, new: &GameState) -> Vec<DetectedMove> {
    let mut sources: Vec<Source> = Vec::new();
    let mut gains: Vec<Gain> = Vec::new();

    for region in new.regions.iter().map(|r| r.index) {
        let before = previous.soldier_count_at(region) as i64;
        let after = new.soldier_count_at(region) as i64;
        let owner_before = previous.owner(region);
        let owner_after = new.owner(region);

        if after < before && owner_before == owner_after {
            sources.push(Source { region, owner: owner_before, remaining: (before - after) as u32 });
        } else if after > before {
            let owner_changed = owner_before != owner_after;
            let neutral_takeover = owner_before.is_none() && owner_after.is_some();
            gains.push(Gain {
                    region,
                    owner_before,
                    owner_after,
                    amount: (after - before) as u32,
                    is_conquest: owner_changed || neutral_takeover,
            });
        }
    }

    gains.sort_by_key(|g| !g.is_conquest);

    let mut moves = Vec::new();
    for gain in &gains {
        let source = find_and_claim_source(new, &mut sources, gain);
        // Recruitment only applies when the gain can't be traced to any
        // neighboring source: a region with an unchanged owner that just
        // grew its garrison. A gain paired to an adjacent source, or one
        // landing on a region with no established owner at all (there is
        // no player to have recruited for), is movement instead.
        let kind = if gain.is_conquest {
            MoveRecordKind::Conquest
        } else if source.is_none() && gain.owner_before.is_some() {
            MoveRecordKind::Recruitment
        } else {
            MoveRecordKind::Peaceful
        };
        moves.push(DetectedMove {
                source,
                target: gain.region,
                count: gain.amount,
                kind,
                new_owner: if gain.is_conquest { gain.owner_after } else { None },
        });
    }

    let temple_upgrades = detect_temple_upgrades(previous, new);
    moves.extend(temple_upgrades);
    moves
}

/// Finds the best adjacent source for `gain`: a neighbor of the target
/// region that lost soldiers, preferring one whose owner matches the
/// expected actor (the mover for a peaceful move, the attacker for a
/// conquest) but falling back to any adjacent source when ownership
/// bookkeeping doesn't line up, e.g. a move into a region that stays
/// unowned.
fn find_and_claim_source(state: &GameState, sources: &mut [Source], gain: &Gain) -> Option<RegionIndex> {
    let neighbors = &state.region(gain.region)?.neighbors;
    let wants_owner = if gain.is_conquest { gain.owner_after } else { gain.owner_before };

    let idx = sources
        .iter()
        .position(|s| neighbors.contains(&s.region) && s.remaining > 0 && s.owner == wants_owner)
        .or_else(|| sources.iter().position(|s| neighbors.contains(&s.region) && s.remaining > 0))?;

    let candidate = &mut sources[idx];
    candidate.remaining = candidate.remaining.saturating_sub(gain.amount);
    Some(candidate.region)
}

fn detect_temple_upgrades(previous: &GameState, new: &GameState) -> Vec<DetectedMove> {
    let mut moves = Vec::new();
    let previous_levels: BTreeMap<RegionIndex, (u32, bool)> = previous
        .temples_by_region
        .iter()
        .map(|(r, t)| (*r, (t.level, t.upgrade.is_some())))
        .collect();

    for (region, temple) in &new.temples_by_region {
        let grew = match previous_levels.get(region) {
            Some((level, had_upgrade)) => temple.level > *level || (temple.upgrade.is_some() && !had_upgrade),
            None => temple.upgrade.is_some(),
        };
        if grew {
            moves.push(DetectedMove {
                    source: None,
                    target: *region,
                    count: 0,
                    kind: MoveRecordKind::Upgrade,
                    new_owner: None,
            });
        }
    }
    moves
}
