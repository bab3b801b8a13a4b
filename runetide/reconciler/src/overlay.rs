//! A transient rendering overlay on top of a `GameState` snapshot: tracks
//! per-soldier animation flags the authoritative engine has no concept of,
//! and applies each plan step's effect so the next step starts from the
//! right positions.

use std::collections::BTreeMap;

use common::model::region::RegionIndex;
use common::model::soldier::{Soldier, SoldierId};
use common::model::state::GameState;

/// Rendering-only state for one soldier, cleared once its step settles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransientFlags {
    pub in_motion: bool,
    pub attacked_region: Option<RegionIndex>,
}

/// A `GameState` clone plus the transient flags the renderer needs.
/// Never sent back to the server; it exists only so the client can derive
/// sequential animation frames from successive plan steps.
pub struct Overlay {
    pub state: GameState,
    flags: BTreeMap<SoldierId, TransientFlags>,
}

impl Overlay {
    pub fn new(state: GameState) -> Self {
        Self { state, flags: BTreeMap::new() }
    }

    pub fn flags_for(&self, soldier: SoldierId) -> TransientFlags {
        self.flags.get(&soldier).copied().unwrap_or_default()
    }

    pub fn mark_in_motion(&mut self, soldier: SoldierId) {
        self.flags.entry(soldier).or_default().in_motion = true;
    }

    pub fn mark_attacked(&mut self, soldier: SoldierId, target: RegionIndex) {
        self.flags.entry(soldier).or_default().attacked_region = Some(target);
    }

    pub fn clear_transient_flags(&mut self) {
        self.flags.clear();
    }

    /// Moves the last `count` soldiers at `source` to the end of `target`'s
    /// stack, for a peaceful move or a successful conquest.
    pub fn transfer(&mut self, source: RegionIndex, target: RegionIndex, count: u32) {
        let moved = pop_from_end(&mut self.state, source, count);
        self.state.soldiers_by_region.entry(target).or_default().extend(moved);
    }

    pub fn set_owner(&mut self, region: RegionIndex, owner: common::model::player::PlayerSlot) {
        self.state.owners_by_region.insert(region, owner);
    }
}

fn pop_from_end(state: &mut GameState, region: RegionIndex, count: u32) -> Vec<Soldier> {
    let stack = state.soldiers_by_region.entry(region).or_default();
    let split_at = stack.len().saturating_sub(count as usize);
    stack.split_off(split_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::player::Player;
    use common::model::region::Region;
    use common::rng::RngSeed;

    fn base_state() -> GameState {
        let regions = vec![Region::new(0, 0.0, 0.0).with_neighbors([1]), Region::new(1, 1.0, 0.0).with_neighbors([0])];
        let players = vec![Player::human(0, "P0", "red")];
        let mut state = GameState::new(regions, players, 0, RngSeed::from_u64(1));
        state.soldiers_by_region.insert(0, (0..3).map(Soldier::new).collect());
        state
    }

    #[test]
    fn transfer_moves_soldiers_from_end_of_source() {
        let mut overlay = Overlay::new(base_state());
        overlay.transfer(0, 1, 2);
        assert_eq!(overlay.state.soldier_count_at(0), 1);
        assert_eq!(overlay.state.soldier_count_at(1), 2);
    }

    #[test]
    fn flags_default_to_cleared() {
        let overlay = Overlay::new(base_state());
        assert_eq!(overlay.flags_for(0), TransientFlags::default());
    }
}

