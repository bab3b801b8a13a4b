//! Move selection: legal-move generation, dumb-move pruning, and a
//! time-bounded iterative-deepening search that picks one `Command` for an
//! AI-controlled player to submit next.
//!
//! The game is N-player, so this plays the table "paranoid": the mover
//! being searched tries to maximize its own heuristic while every other
//! player is treated as a single adversary trying to minimize it. That is
//! a standard reduction of multiplayer minimax to the two-player case, and
//! it keeps the search tractable within the wall-clock budget.

use std::time::{Duration, Instant};

use common::game::command::{apply_command, BuildTarget, Command, SimConfig};
use common::log::NullLog;
use common::model::player::{AiLevel, PlayerSlot};
use common::model::region::RegionIndex;
use common::model::state::GameState;
use common::model::temple::Upgrade;
use common::rng::SeededRng;
use common::rules;

use crate::heuristics::heuristic_for_player;
use crate::personality::Personality;

#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    pub max_depth: u32,
    pub time_budget: Duration,
    pub nodes_per_time_check: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            time_budget: Duration::from_millis(common::conf::AI_THINK_TIME_MS_MAX),
            nodes_per_time_check: common::conf::AI_SEARCH_YIELD_INTERVAL as u32,
        }
    }
}

/// All commands worth considering for `player` at `state`: every legal
/// full-stack army move, a soldier purchase if affordable, an upgrade
/// purchase from `personality`'s preference list if affordable, and always
/// `EndTurn`. Moves where the target holds strictly more defenders than
/// the proposed attack is large are skipped (the "dumb move" prune): no
/// personality benefits from searching a move certain to fail.
pub fn legal_moves(state: &GameState, player: PlayerSlot, personality: &Personality) -> Vec<Command> {
    let mut moves = Vec::new();

    if state.moves_remaining > 0 {
        for source in state.regions_owned_by(player) {
            if state.conquered_regions.contains(&source) {
                continue;
            }
            let attackers = state.soldier_count_at(source) as u32;
            if attackers == 0 {
                continue;
            }
            let Some(region) = state.region(source) else { continue };
            for &target in &region.neighbors {
                let defenders = state.soldier_count_at(target) as u32;
                let friendly = state.owner(target) == Some(player);
                for count in candidate_counts(attackers) {
                    if !friendly && defenders > count {
                        continue;
                    }
                    moves.push(Command::ArmyMove { source, target, count });
                }
            }
        }
    }

    let faith = state.faith(player);
    let soldier_cost = rules::soldier_cost(state.soldiers_bought_this_turn);
    if faith >= soldier_cost {
        if let Some(region) = cheapest_garrisoned_temple(state, player) {
            moves.push(Command::Build { region, target: BuildTarget::Soldier });
        }
    }

    if let Some((region, upgrade)) = best_affordable_upgrade(state, player, personality) {
        moves.push(Command::Build { region, target: BuildTarget::Upgrade(upgrade) });
    }

    moves.push(Command::EndTurn { queued: Vec::new() });
    moves
}

/// Full-stack and half-stack attack sizes, per the move-generation rule:
/// a half move only exists when it's distinct from a full one.
fn candidate_counts(available: u32) -> Vec<u32> {
    let half = available / 2;
    if half > 0 && half != available {
        vec![available, half]
    } else {
        vec![available]
    }
}

pub(crate) fn cheapest_garrisoned_temple(state: &GameState, player: PlayerSlot) -> Option<RegionIndex> {
    state.regions_owned_by(player).find(|&r| state.temple_at(r).is_some())
}

pub(crate) fn best_affordable_upgrade(state: &GameState, player: PlayerSlot, personality: &Personality) -> Option<(RegionIndex, Upgrade)> {
    let faith = state.faith(player);
    for region in state.regions_owned_by(player) {
        let Some(temple) = state.temple_at(region) else { continue };
        if let Some(existing) = temple.upgrade {
            if temple.level >= rules::MAX_UPGRADE_LEVEL {
                continue;
            }
            let cost = rules::upgrade_cost(existing, temple.level);
            if faith >= cost {
                return Some((region, existing));
            }
            continue;
        }
        for &candidate in personality.upgrade_preference {
            let cost = rules::upgrade_cost(candidate, 0);
            if faith >= cost {
                return Some((region, candidate));
            }
        }
    }
    None
}

fn apply_for_search(state: &GameState, player: PlayerSlot, command: Command, rng: &mut SeededRng) -> GameState {
    let outcome = apply_command(state, player, command, SimConfig { simulation: true }, rng, &mut NullLog);
    outcome.new_state.unwrap_or_else(|| state.clone())
}

fn next_mover(state: &GameState, mover: PlayerSlot) -> PlayerSlot {
    let slots: Vec<PlayerSlot> = state.active_player_slots().collect();
    if slots.is_empty() {
        return mover;
    }
    let pos = slots.iter().position(|s| *s == mover).unwrap_or(0);
    slots[(pos + 1) % slots.len()]
}

struct SearchState {
    deadline: Instant,
    nodes_per_time_check: u32,
    nodes_since_check: u32,
    out_of_time: bool,
}

fn minimax(
    state: &GameState,
    root_player: PlayerSlot,
    personality: &Personality,
    mover: PlayerSlot,
    level: AiLevel,
    depth: u32,
    rng: &mut SeededRng,
    search: &mut SearchState,
) -> f64 {
    search.nodes_since_check += 1;
    if search.nodes_since_check >= search.nodes_per_time_check {
        search.nodes_since_check = 0;
        if Instant::now() >= search.deadline {
            search.out_of_time = true;
        }
    }
    if search.out_of_time || depth == 0 || common::game::scoring::evaluate_end(state).is_some() {
        return heuristic_for_player(state, root_player, level);
    }

    let mut moves = legal_moves(state, mover, personality);
    rng.shuffle(&mut moves);

    let maximizing = mover == root_player;
    let mut best = if maximizing { f64::NEG_INFINITY } else { f64::INFINITY };
    for command in moves {
        if search.out_of_time {
            break;
        }
        let next_state = apply_for_search(state, mover, command, rng);
        let next_mover_slot = next_mover(&next_state, mover);
        let value = minimax(&next_state, root_player, personality, next_mover_slot, level, depth - 1, rng, search);
        if maximizing {
            best = best.max(value);
        } else {
            best = best.min(value);
        }
    }
    if best.is_finite() {
        best
    } else {
        heuristic_for_player(state, root_player, level)
    }
}

/// Picks the best `Command` for `player` via iterative-deepening search
/// bounded by `config.time_budget`. Falls back to `EndTurn` if the budget
/// expires before depth 1 completes or no legal move exists.
pub fn pick_ai_move(
    state: &GameState,
    player: PlayerSlot,
    personality: &Personality,
    level: AiLevel,
    config: SearchConfig,
    rng: &mut SeededRng,
) -> Command {
    // Search explores speculative futures that are thrown away; it must
    // never advance the real per-game dice stream the caller will use once
    // a move is actually applied.
    let mut rng = rng.fork_by_path(&[player as u64]);
    let rng = &mut rng;

    let deadline = Instant::now() + config.time_budget;
    let mut best_move = Command::EndTurn { queued: Vec::new() };

    for depth in 1..=config.max_depth {
        if Instant::now() >= deadline {
            break;
        }
        let mut search = SearchState {
            deadline,
            nodes_per_time_check: config.nodes_per_time_check,
            nodes_since_check: 0,
            out_of_time: false,
        };
        let mut moves = legal_moves(state, player, personality);
        rng.shuffle(&mut moves);

        let mut depth_best_value = f64::NEG_INFINITY;
        let mut depth_best_move = None;
        for command in moves {
            if search.out_of_time {
                break;
            }
            let next_state = apply_for_search(state, player, command.clone(), rng);
            let next_mover_slot = next_mover(&next_state, player);
            let value = minimax(&next_state, player, personality, next_mover_slot, level, depth.saturating_sub(1), rng, &mut search);
            if value > depth_best_value {
                depth_best_value = value;
                depth_best_move = Some(command);
            }
        }

        if search.out_of_time {
            break;
        }
        if let Some(command) = depth_best_move {
            best_move = command;
        }
    }

    best_move
}
