//! Turn bookkeeping: income collection, per-turn reset, and handing
//! play to the next active player.

use crate::log::{LogTarget, Message, MessageSource};
use crate::model::player::PlayerSlot;
use crate::model::state::GameState;
use crate::model::temple::Upgrade;

use super::command::SimConfig;
use super::income;

/// Closes out the current player's turn and opens the next one: collects
/// income for the player who just finished, clears the per-turn
/// `conquered_regions`/`soldiers_bought_this_turn` trackers, advances
/// `current_player_slot` to the next non-eliminated player (wrapping
/// around), and grants the new player their move budget for the turn,
/// including any AIR temple bonus. `turn_number` only advances when the
/// active-player cursor wraps back around past the last player — it does
/// not bump on every player-turn.
pub fn end_turn(state: &GameState, sim: SimConfig, log: &mut impl LogTarget) -> GameState {
    let mut next = state.clone();
    let finishing = next.current_player_slot;

    let income = income::income_for_player(&next, finishing);
    if income > 0 {
        *next.faith_by_player.entry(finishing).or_insert(0) += income;
        if !sim.simulation {
            log.log(Message::new(
                    format!("Player {finishing} collects {income} faith."),
                    Some(MessageSource::Income),
            ));
        }
    }

    next.conquered_regions.clear();
    next.soldiers_bought_this_turn = 0;
    let (next_slot, wrapped) = next_active_slot(&next, finishing);
    next.current_player_slot = next_slot;
    if wrapped {
        next.turn_number += 1;
    }
    next.moves_remaining = crate::conf::DEFAULT_MOVES_PER_TURN + air_move_bonus(&next, next.current_player_slot);

    if !sim.simulation {
        log.log(Message::new(
                format!("Turn {} begins for player {}.", next.turn_number, next.current_player_slot),
                Some(MessageSource::Turn),
        ));
    }

    next.update_id += 1;
    next
}

/// Finds the next non-eliminated player after `current`, wrapping around.
/// The bool is true when that search wrapped past the last slot back to
/// one at or behind `current`'s own position — the signal to advance
/// `turn_number`.
fn next_active_slot(state: &GameState, current: PlayerSlot) -> (PlayerSlot, bool) {
    let slots: Vec<PlayerSlot> = state.players.iter().map(|p| p.slot).collect();
    let pos = slots.iter().position(|s| *s == current).unwrap_or(0);
    for offset in 1..=slots.len() {
        let idx = (pos + offset) % slots.len();
        let candidate = slots[idx];
        if !state.is_eliminated(candidate) {
            return (candidate, idx <= pos);
        }
    }
    (current, true)
}

fn air_move_bonus(state: &GameState, slot: PlayerSlot) -> u32 {
    state
        .regions_owned_by(slot)
        .filter_map(|r| state.temple_at(r))
        .map(|t| t.upgrade_level(Upgrade::Air))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NullLog;
    use crate::model::player::Player;
    use crate::model::region::Region;
    use crate::rng::RngSeed;

    fn state_with_players(n: usize) -> GameState {
        let regions = (0..4).map(|i| Region::new(i, 0.0, 0.0)).collect();
        let players = (0..n).map(|i| Player::human(i, format!("P{i}"), "red")).collect();
        let mut state = GameState::new(regions, players, 0, RngSeed::from_u64(7));
        for r in 0..4 {
            state.owners_by_region.insert(r, (r as usize % n) as PlayerSlot);
        }
        state
    }

    #[test]
    fn end_turn_advances_to_next_player_without_wrapping_turn_number() {
        let state = state_with_players(2);
        let mut log = NullLog;
        let next = end_turn(&state, SimConfig::default(), &mut log);
        assert_eq!(next.current_player_slot, 1);
        assert_eq!(next.turn_number, 0);
        assert_eq!(next.moves_remaining, crate::conf::DEFAULT_MOVES_PER_TURN);
    }

    #[test]
    fn turn_number_increments_only_once_per_full_round() {
        let state = state_with_players(2);
        let mut log = NullLog;
        let after_first = end_turn(&state, SimConfig::default(), &mut log);
        assert_eq!(after_first.current_player_slot, 1);
        assert_eq!(after_first.turn_number, 0);
        let after_second = end_turn(&after_first, SimConfig::default(), &mut log);
        assert_eq!(after_second.current_player_slot, 0);
        assert_eq!(after_second.turn_number, 1);
    }

    #[test]
    fn end_turn_skips_eliminated_players() {
        let mut state = state_with_players(3);
        state.eliminated_players.insert(1);
        let mut log = NullLog;
        let next = end_turn(&state, SimConfig::default(), &mut log);
        assert_eq!(next.current_player_slot, 2);
    }

    #[test]
    fn end_turn_clears_conquered_regions_and_resets_purchase_counter() {
        let mut state = state_with_players(2);
        state.conquered_regions.insert(3);
        state.soldiers_bought_this_turn = 2;
        let mut log = NullLog;
        let next = end_turn(&state, SimConfig::default(), &mut log);
        assert!(next.conquered_regions.is_empty());
        assert_eq!(next.soldiers_bought_this_turn, 0);
    }

    #[test]
    fn air_upgrade_grants_extra_moves_next_turn() {
        use crate::model::temple::Temple;
        let mut state = state_with_players(2);
        state.owners_by_region.insert(1, 1);
        let mut temple = Temple::new(1);
        temple.upgrade = Some(Upgrade::Air);
        temple.level = 1;
        state.temples_by_region.insert(1, temple);
        let mut log = NullLog;
        let next = end_turn(&state, SimConfig::default(), &mut log);
        assert_eq!(next.current_player_slot, 1);
        assert_eq!(next.moves_remaining, crate::conf::DEFAULT_MOVES_PER_TURN + 2);
    }
}

