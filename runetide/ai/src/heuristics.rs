//! Position evaluation: sliding bonuses, per-region value/threat/opportunity,
//! temple danger, and the top-level player heuristic the search maximizes.

use std::collections::{BTreeSet, VecDeque};

use common::model::player::{AiLevel, PlayerSlot};
use common::model::region::RegionIndex;
use common::model::state::GameState;
use common::model::temple::Temple;

const EPS: f64 = 1e-6;

/// Linearly interpolates from `start` to `end`, flat at `start` until turn
/// `drop_off_fraction * max_turns`, flat at `end` from `max_turns` onward.
/// An unlimited game (`max_turns == 0`) never reaches its drop-off, so it
/// stays at `start`.
pub fn sliding_bonus(start: f64, end: f64, drop_off_fraction: f64, turn: u32, max_turns: u32) -> f64 {
    if max_turns == 0 {
        return start;
    }
    let max_turns = max_turns as f64;
    let drop_off_turn = drop_off_fraction * max_turns;
    let span = (max_turns - drop_off_turn).max(EPS);
    let t = ((turn as f64 - drop_off_turn) / span).clamp(0.0, 1.0);
    start + (end - start) * t
}

/// The standing value of holding `region`: a base of 1, plus a temple bonus
/// that fades over the game, plus an upgrade bonus scaled by the upgrade's
/// level that fades even faster.
pub fn region_full_value(state: &GameState, region: RegionIndex, turn: u32, max_turns: u32) -> f64 {
    let Some(temple) = state.temple_at(region) else {
        return 1.0;
    };
    let temple_bonus = sliding_bonus(6.0, 0.0, 0.5, turn, max_turns);
    let upgrade_bonus = sliding_bonus(4.0, 0.0, 0.9, turn, max_turns);
    let upgrade_multiplier = if temple.upgrade.is_some() { (temple.level + 1) as f64 } else { 0.0 };
    1.0 + temple_bonus + upgrade_bonus * upgrade_multiplier
}

/// Enemy soldier presence reachable from `region` within `radius` hops.
/// `RUDE` only looks at direct neighbors (radius 1, unweighted); `MEAN`
/// scans two hops out with presence at hop `d` weighted `(2+d)/4`, so
/// closer threats count for more.
fn enemy_presence_near(state: &GameState, observer: PlayerSlot, region: RegionIndex, radius: u32, weighted: bool) -> f64 {
    let mut visited: BTreeSet<RegionIndex> = BTreeSet::new();
    visited.insert(region);
    let mut frontier = VecDeque::new();
    frontier.push_back((region, 0u32));
    let mut total = 0.0;

    while let Some((r, dist)) = frontier.pop_front() {
        if dist >= radius {
            continue;
        }
        let Some(current) = state.region(r) else { continue };
        for &n in &current.neighbors {
            if visited.insert(n) {
                let next_dist = dist + 1;
                if let Some(owner) = state.owner(n) {
                    if owner != observer {
                        let weight = if weighted { (2.0 + next_dist as f64) / 4.0 } else { 1.0 };
                        total += state.soldier_count_at(n) as f64 * weight;
                    }
                }
                frontier.push_back((n, next_dist));
            }
        }
    }
    total
}

/// How exposed `region` is to enemy attack, in `[0, clamp_high]`. `NICE`
/// never perceives threat.
pub fn region_threat(state: &GameState, player: PlayerSlot, region: RegionIndex, level: AiLevel) -> f64 {
    if level == AiLevel::Nice {
        return 0.0;
    }
    let our_presence = state.soldier_count_at(region) as f64;
    let (radius, weighted, clamp_high) = match level {
        AiLevel::Rude => (1, false, 0.5),
        AiLevel::Mean => (2, true, 1.1),
        AiLevel::Nice => unreachable!(),
    };
    let enemy_presence = enemy_presence_near(state, player, region, radius, weighted);
    (((enemy_presence / (our_presence + EPS)) - 1.0) / 1.5).clamp(0.0, clamp_high)
}

/// How much consolidating soldiers into this region's owned neighbors is
/// worth: for every neighbor of `region` the evaluated player also owns,
/// add a favorability ratio times that neighbor's standing value. `NICE`
/// never perceives opportunity.
pub fn region_opportunity(
    state: &GameState,
    player: PlayerSlot,
    region: RegionIndex,
    level: AiLevel,
    turn: u32,
    max_turns: u32,
) -> f64 {
    if level == AiLevel::Nice {
        return 0.0;
    }
    let Some(r) = state.region(region) else {
        return 0.0;
    };
    let atk = state.soldier_count_at(region) as f64;
    let mut total = 0.0;
    for &n in &r.neighbors {
        if state.owner(n) == Some(player) {
            let def = state.soldier_count_at(n) as f64;
            let ratio = ((atk / (def + EPS)) - 0.9) * 0.5;
            total += ratio.clamp(0.0, 0.5) * region_full_value(state, n, turn, max_turns);
        }
    }
    total
}

/// How worth defending a temple is: the threat and opportunity of the
/// region it sits on, from its owner's perspective.
pub fn temple_dangerousness(state: &GameState, temple: &Temple, level: AiLevel, turn: u32, max_turns: u32) -> f64 {
    let Some(owner) = state.owner(temple.region) else {
        return 0.0;
    };
    region_threat(state, owner, temple.region, level) + region_opportunity(state, owner, temple.region, level, turn, max_turns)
}

/// The search leaf evaluation: how good is `state` for `player`, summed
/// over owned regions plus a soldier-count bonus that also feeds a faith
/// income term.
pub fn heuristic_for_player(state: &GameState, player: PlayerSlot, level: AiLevel) -> f64 {
    let turn = state.turn_number;
    let max_turns = state.max_turns;

    let sliding_mult = sliding_bonus(0.25, 0.0, 0.83, turn, max_turns);

    let mut total = 0.0;
    for region in state.regions_owned_by(player) {
        let value = region_full_value(state, region, turn, max_turns);
        let threat = region_threat(state, player, region, level);
        let opportunity = region_opportunity(state, player, region, level, turn, max_turns);
        total += value + (opportunity - threat * value) * sliding_mult;
    }

    total += sliding_mult * state.total_soldiers(player) as f64;
    total += common::game::income::income_for_player(state, player) as f64 * sliding_mult / 12.0;
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::player::Player;
    use common::model::region::Region;
    use common::model::soldier::Soldier;
    use common::rng::RngSeed;

    fn base_state() -> GameState {
        let regions = vec![
            Region::new(0, 0.0, 0.0).with_neighbors([1]),
            Region::new(1, 1.0, 0.0).with_neighbors([0, 2]),
            Region::new(2, 2.0, 0.0).with_neighbors([1]),
        ];
        let players = vec![Player::human(0, "P0", "red"), Player::human(1, "P1", "blue")];
        GameState::new(regions, players, 10, RngSeed::from_u64(1))
    }

    #[test]
    fn sliding_bonus_is_flat_before_drop_off_and_after_max_turns() {
        assert_eq!(sliding_bonus(6.0, 0.0, 0.5, 0, 10), 6.0);
        assert_eq!(sliding_bonus(6.0, 0.0, 0.5, 4, 10), 6.0);
        assert_eq!(sliding_bonus(6.0, 0.0, 0.5, 10, 10), 0.0);
        assert_eq!(sliding_bonus(6.0, 0.0, 0.5, 20, 10), 0.0);
    }

    #[test]
    fn sliding_bonus_never_decays_for_unlimited_games() {
        assert_eq!(sliding_bonus(6.0, 0.0, 0.5, 10_000, 0), 6.0);
    }

    #[test]
    fn nice_ai_never_perceives_threat_or_opportunity() {
        let mut state = base_state();
        state.owners_by_region.insert(0, 0);
        state.owners_by_region.insert(1, 1);
        state.soldiers_by_region.insert(1, (0..10).map(Soldier::new).collect());
        assert_eq!(region_threat(&state, 0, 0, AiLevel::Nice), 0.0);
        assert_eq!(region_opportunity(&state, 0, 0, AiLevel::Nice, 0, 10), 0.0);
    }

    #[test]
    fn region_threat_rises_with_nearby_enemy_presence() {
        let mut state = base_state();
        state.owners_by_region.insert(0, 0);
        state.owners_by_region.insert(1, 1);
        state.soldiers_by_region.insert(0, vec![Soldier::new(0)]);
        state.soldiers_by_region.insert(1, (0..20).map(Soldier::new).collect());
        let threat = region_threat(&state, 0, 0, AiLevel::Rude);
        assert!(threat > 0.0);
    }

    #[test]
    fn temple_with_upgrade_adds_to_region_value() {
        use common::model::temple::{Temple, Upgrade};
        let mut state = base_state();
        state.owners_by_region.insert(0, 0);
        let bare = region_full_value(&state, 0, 0, 10);
        let mut temple = Temple::new(0);
        temple.upgrade = Some(Upgrade::Water);
        temple.level = 1;
        state.temples_by_region.insert(0, temple);
        let with_temple = region_full_value(&state, 0, 0, 10);
        assert!(with_temple > bare);
    }
}

