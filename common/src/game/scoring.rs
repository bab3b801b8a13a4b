//! End-of-game detection and scoring.

use serde::{Deserialize, Serialize};

use crate::model::player::PlayerSlot;
use crate::model::state::GameState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TurnLimit,
    Elimination,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEndStatus {
    pub reason: EndReason,
    /// `None` for a drawn game: every top scorer tied, or zero players
    /// remain.
    pub winner: Option<PlayerSlot>,
}

/// `score = 1000·regionCount + 10·totalSoldiers + faith`.
pub fn score(state: &GameState, slot: PlayerSlot) -> u64 {
    1000 * state.region_count(slot) as u64 + 10 * state.total_soldiers(slot) as u64 + state.faith(slot)
}

fn remaining_player_slots(state: &GameState) -> Vec<PlayerSlot> {
    state.active_player_slots().collect()
}

/// Turn-limit end: `maxTurns > 0 AND turnNumber + 1 ≥ maxTurns`.
pub fn is_turn_limit_reached(state: &GameState) -> bool {
    state.max_turns > 0 && state.turn_number + 1 >= state.max_turns
}

/// Elimination end: at most one player owns any region.
pub fn is_elimination_complete(state: &GameState) -> bool {
    let owners_with_regions: std::collections::BTreeSet<PlayerSlot> = state.owners_by_region.values().copied().collect();
    owners_with_regions.len() <= 1
}

/// Evaluates end-of-game status. Returns `None` while the game continues.
/// Once this returns `Some`, it must keep returning `Some` for any later
/// state of the same game (a monotonicity property) — callers enforce
/// that by never un-ending a game, since neither check here can become
/// false again: the turn number only increases and eliminations only
/// accumulate.
pub fn evaluate_end(state: &GameState) -> Option<GameEndStatus> {
    if is_elimination_complete(state) {
        let remaining = remaining_player_slots(state);
        let winner = remaining.into_iter().find(|slot| state.region_count(*slot) > 0);
        return Some(GameEndStatus { reason: EndReason::Elimination, winner });
    }

    if is_turn_limit_reached(state) {
        return Some(GameEndStatus { reason: EndReason::TurnLimit, winner: winner_by_score(state) });
    }

    None
}

fn winner_by_score(state: &GameState) -> Option<PlayerSlot> {
    let scores: Vec<(PlayerSlot, u64)> = state.active_player_slots().map(|slot| (slot, score(state, slot))).collect();

    let max = scores.iter().map(|(_, s)| *s).max()?;
    let mut top = scores.into_iter().filter(|(_, s)| *s == max);
    let first = top.next()?;
    if top.next().is_some() {
        None // exact tie among top scorers is a drawn game
    } else {
        Some(first.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::Player;
    use crate::model::region::Region;
    use crate::rng::RngSeed;

    fn state_with_players(n: usize, max_turns: u32) -> GameState {
        let regions = (0..8).map(|i| Region::new(i, 0.0, 0.0)).collect();
        let players = (0..n).map(|i| Player::human(i, format!("P{i}"), "red")).collect();
        GameState::new(regions, players, max_turns, RngSeed::from_u64(1))
    }

    #[test]
    fn turn_limit_winner_decided_by_score() {
        // maxTurns=10, turnNumber=10 (past the limit already, which still
        // counts as reached), P0 score 4128, P1 4135.
        let mut state = state_with_players(2, 10);
        state.turn_number = 10;
        for r in 0..4 {
            state.owners_by_region.insert(r, 0);
        }
        for r in 4..8 {
            state.owners_by_region.insert(r, 1);
        }
        state.soldiers_by_region.insert(0, (0..11).map(crate::model::soldier::Soldier::new).collect());
        state.soldiers_by_region.insert(4, (100..111).map(crate::model::soldier::Soldier::new).collect());
        state.faith_by_player.insert(0, 18);
        state.faith_by_player.insert(1, 25);

        assert_eq!(score(&state, 0), 4128);
        assert_eq!(score(&state, 1), 4135);

        let end = evaluate_end(&state).expect("game should have ended");
        assert_eq!(end.reason, EndReason::TurnLimit);
        assert_eq!(end.winner, Some(1));
    }

    #[test]
    fn unlimited_turns_never_end_by_turn_limit() {
        let mut state = state_with_players(2, 0);
        state.turn_number = 10_000;
        for r in 0..4 {
            state.owners_by_region.insert(r, 0);
        }
        for r in 4..8 {
            state.owners_by_region.insert(r, 1);
        }
        assert!(!is_turn_limit_reached(&state));
        assert!(evaluate_end(&state).is_none());
    }

    #[test]
    fn elimination_end_declares_sole_owner_winner() {
        let mut state = state_with_players(2, 0);
        for r in 0..8 {
            state.owners_by_region.insert(r, 0);
        }
        state.eliminated_players.insert(1);
        let end = evaluate_end(&state).expect("game should have ended");
        assert_eq!(end.reason, EndReason::Elimination);
        assert_eq!(end.winner, Some(0));
    }

    #[test]
    fn end_detection_is_monotone() {
        let mut state = state_with_players(2, 5);
        state.turn_number = 5;
        for r in 0..8 {
            state.owners_by_region.insert(r, 0);
        }
        assert!(evaluate_end(&state).is_some());
        state.turn_number += 1;
        assert!(evaluate_end(&state).is_some());
    }

    proptest::proptest! {
        /// *End-detection monotonicity*: once `evaluate_end` is `Some`, it
        /// stays `Some` under any later turn-number advance or further
        /// elimination of that same game.
        #[test]
        fn end_detection_stays_ended_once_true(
            max_turns in 1u32..40,
            start_turn in 0u32..60,
            turn_deltas in proptest::collection::vec(0u32..6, 1..8),
        ) {
            let mut state = state_with_players(2, max_turns);
            state.turn_number = start_turn;
            for r in 0..8 {
                state.owners_by_region.insert(r, 0);
            }

            let mut was_ended = evaluate_end(&state).is_some();
            for delta in turn_deltas {
                state.turn_number += delta;
                let ended = evaluate_end(&state).is_some();
                if was_ended {
                    proptest::prop_assert!(ended);
                }
                was_ended = was_ended || ended;
            }
        }

        /// *Idempotent scoring*: `score` is a pure function of `state` —
        /// calling it twice on the same snapshot never changes the result.
        #[test]
        fn score_is_a_pure_function_of_state(
            region_count in 0u32..8,
            soldier_count in 0u32..30,
            faith in 0u64..500,
        ) {
            let mut state = state_with_players(2, 10);
            for r in 0..region_count {
                state.owners_by_region.insert(r, 0);
            }
            state.soldiers_by_region.insert(0, (0..soldier_count).map(crate::model::soldier::Soldier::new).collect());
            state.faith_by_player.insert(0, faith);

            proptest::prop_assert_eq!(score(&state, 0), score(&state, 0));
        }
    }
}

