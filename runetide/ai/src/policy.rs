//! The top-level decision an AI-controlled player makes each time it's
//! asked for a move: a short priority pipeline ahead of the full search,
//! so a bot under threat reaches for its wallet before it bothers
//! searching a losing attack.

use common::game::command::{BuildTarget, Command};
use common::model::player::{AiLevel, PlayerSlot};
use common::model::region::RegionIndex;
use common::model::state::GameState;
use common::model::temple::Upgrade;
use common::rng::SeededRng;
use common::rules;

use crate::heuristics::temple_dangerousness;
use crate::personality::Personality;
use crate::search::{self, SearchConfig};

/// `player`'s next command, in priority order: build a soldier if the
/// threat this player faces outweighs its cost, else buy the next
/// preferred upgrade if affordable, else fall back to the time-bounded
/// search.
pub fn choose_command(
    state: &GameState,
    player: PlayerSlot,
    personality: &Personality,
    level: AiLevel,
    search_config: SearchConfig,
    rng: &mut SeededRng,
) -> Command {
    if let Some(command) = maybe_build_soldier(state, player, personality, level) {
        return command;
    }
    if let Some(command) = maybe_upgrade(state, player, personality, level) {
        return command;
    }
    search::pick_ai_move(state, player, personality, level, search_config, rng)
}

/// `force = 2*regionCount + totalSoldiers`, the same composite strength
/// figure used on both sides of the disparity ratio.
fn force(state: &GameState, slot: PlayerSlot) -> f64 {
    (2 * state.region_count(slot) + state.total_soldiers(slot)) as f64
}

fn max_enemy_force(state: &GameState, player: PlayerSlot) -> f64 {
    state
        .active_player_slots()
        .filter(|&slot| slot != player)
        .map(|slot| force(state, slot))
        .fold(0.0, f64::max)
}

fn most_dangerous_temple(state: &GameState, player: PlayerSlot, level: AiLevel) -> Option<RegionIndex> {
    state
        .regions_owned_by(player)
        .filter_map(|r| state.temple_at(r).map(|t| (r, temple_dangerousness(state, t, level, state.turn_number, state.max_turns))))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(r, _)| r)
}

/// The safest temple eligible to host `upgrade`: an empty slot, or one
/// already carrying the same upgrade (for leveling it up). A temple
/// holding a different element is never a candidate, however safe.
fn safest_temple_for(state: &GameState, player: PlayerSlot, level: AiLevel, upgrade: Upgrade) -> Option<RegionIndex> {
    state
        .regions_owned_by(player)
        .filter_map(|r| state.temple_at(r).map(|t| (r, t)))
        .filter(|(_, t)| t.upgrade.is_none() || t.upgrade == Some(upgrade))
        .map(|(r, t)| (r, temple_dangerousness(state, t, level, state.turn_number, state.max_turns)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(r, _)| r)
}

fn maybe_build_soldier(state: &GameState, player: PlayerSlot, personality: &Personality, level: AiLevel) -> Option<Command> {
    if state.regions_owned_by(player).all(|r| state.temple_at(r).is_none()) {
        return None;
    }
    let cost = rules::soldier_cost(state.soldiers_bought_this_turn);
    let faith = state.faith(player);
    if faith < cost {
        return None;
    }

    let our_force = force(state, player).max(1.0);
    let force_disparity = max_enemy_force(state, player) / our_force;
    let relative_cost = cost as f64 / (faith as f64 + 1.0);

    // When there's no more affordable/eligible upgrade worth wanting, lean
    // fully into soldiers rather than letting a low personal eagerness
    // stall the pipeline on an unreachable upgrade.
    let no_upgrade_desired = search::best_affordable_upgrade(state, player, personality).is_none();
    let eagerness = if no_upgrade_desired { 1.0 } else { personality.soldier_eagerness };

    if force_disparity * eagerness - relative_cost < 0.0 {
        return None;
    }

    let region = most_dangerous_temple(state, player, level)?;
    Some(Command::Build { region, target: BuildTarget::Soldier })
}

fn maybe_upgrade(state: &GameState, player: PlayerSlot, personality: &Personality, level: AiLevel) -> Option<Command> {
    let (_, upgrade) = search::best_affordable_upgrade(state, player, personality)?;
    let region = safest_temple_for(state, player, level, upgrade)?;
    Some(Command::Build { region, target: BuildTarget::Upgrade(upgrade) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::player::Player;
    use common::model::region::Region;
    use common::model::soldier::Soldier;
    use common::model::temple::Temple;
    use common::rng::RngSeed;
    use std::time::Duration;

    fn state_two_players() -> GameState {
        let regions = vec![
            Region::new(0, 0.0, 0.0).with_neighbors([1]),
            Region::new(1, 1.0, 0.0).with_neighbors([0]),
        ];
        let players = vec![Player::human(0, "P0", "red"), Player::human(1, "P1", "blue")];
        let mut state = GameState::new(regions, players, 0, RngSeed::from_u64(5));
        state.owners_by_region.insert(0, 0);
        state.owners_by_region.insert(1, 1);
        state.soldiers_by_region.insert(0, (0..2).map(Soldier::new).collect());
        state.soldiers_by_region.insert(1, (0..20).map(Soldier::new).collect());
        state
    }

    #[test]
    fn builds_a_soldier_under_heavy_threat_when_affordable() {
        let mut state = state_two_players();
        state.temples_by_region.insert(0, Temple::new(0));
        state.faith_by_player.insert(0, 100);
        let command = choose_command(
            &state,
            0,
            &crate::personality::DEFENDER,
            AiLevel::Rude,
            SearchConfig { max_depth: 1, time_budget: Duration::from_millis(50), nodes_per_time_check: 8 },
            &mut SeededRng::from_seed(&RngSeed::from_u64(1)),
        );
        assert_eq!(command, Command::Build { region: 0, target: BuildTarget::Soldier });
    }

    #[test]
    fn falls_back_to_search_when_not_threatened_and_no_upgrade_affordable() {
        let state = state_two_players();
        let command = choose_command(
            &state,
            1,
            &crate::personality::AGGRESSOR,
            AiLevel::Rude,
            SearchConfig { max_depth: 1, time_budget: Duration::from_millis(50), nodes_per_time_check: 8 },
            &mut SeededRng::from_seed(&RngSeed::from_u64(1)),
        );
        let legal = search::legal_moves(&state, 1, &crate::personality::AGGRESSOR);
        assert!(legal.contains(&command));
    }

    #[test]
    fn no_temple_means_soldier_build_is_never_offered() {
        let state = state_two_players();
        assert!(maybe_build_soldier(&state, 0, &crate::personality::AGGRESSOR, AiLevel::Mean).is_none());
    }

    #[test]
    fn upgrade_skips_temples_already_holding_a_different_element() {
        let mut state = state_two_players();
        let regions = vec![
            Region::new(0, 0.0, 0.0).with_neighbors([1, 2]),
            Region::new(1, 1.0, 0.0).with_neighbors([0]),
            Region::new(2, 2.0, 0.0).with_neighbors([0]),
        ];
        let players = vec![Player::human(0, "P0", "red"), Player::human(1, "P1", "blue")];
        state = GameState::new(regions, players, 0, RngSeed::from_u64(5));
        state.owners_by_region.insert(0, 0);
        state.owners_by_region.insert(2, 0);
        state.owners_by_region.insert(1, 1);

        // Region 0 is the safest (undefended by the enemy) but already
        // holds a Fire upgrade. Region 2 is the only remaining candidate
        // eligible to host a newly-chosen Water upgrade.
        let mut fire_temple = Temple::new(0);
        fire_temple.upgrade = Some(common::model::temple::Upgrade::Fire);
        fire_temple.level = 1;
        state.temples_by_region.insert(0, fire_temple);
        state.temples_by_region.insert(2, Temple::new(2));
        state.faith_by_player.insert(0, 1000);

        let region = safest_temple_for(&state, 0, AiLevel::Rude, common::model::temple::Upgrade::Water);
        assert_eq!(region, Some(2));
    }

    proptest::proptest! {
        /// *AI legality*: every move `choose_command` returns for a player
        /// is accepted by the command validator on the same state.
        #[test]
        fn every_ai_move_is_accepted_by_the_validator(
            p0_soldiers in 0u32..30,
            p1_soldiers in 0u32..30,
            p0_faith in 0u64..300,
            seed in proptest::prelude::any::<u64>(),
        ) {
            use common::game::command::{apply_command, SimConfig};
            use common::log::NullLog;

            let mut state = state_two_players();
            state.soldiers_by_region.insert(0, (0..p0_soldiers).map(Soldier::new).collect());
            state.soldiers_by_region.insert(1, (0..p1_soldiers).map(Soldier::new).collect());
            state.faith_by_player.insert(0, p0_faith);
            state.temples_by_region.insert(0, Temple::new(0));

            let command = choose_command(
                    &state,
                    0,
                    &crate::personality::AGGRESSOR,
                    AiLevel::Rude,
                    SearchConfig { max_depth: 1, time_budget: Duration::from_millis(20), nodes_per_time_check: 8 },
                    &mut SeededRng::from_seed(&RngSeed::from_u64(seed)),
            );

            let mut rng = SeededRng::from_seed(&RngSeed::from_u64(seed));
            let mut log = NullLog;
            let outcome = apply_command(&state, 0, command.clone(), SimConfig { simulation: true }, &mut rng, &mut log);
            proptest::prop_assert!(outcome.success, "AI returned an illegal move {:?}: {:?}", command, outcome.error);
        }
    }
}

