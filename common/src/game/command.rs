//! Commands: a tagged union over `{ArmyMove, Build, EndTurn, Resign}`
//! dispatched by a single validator/applier. A polymorphic-command-classes
//! design needs no virtual hierarchy here: reified actions, a
//! `Result`-returning applier, no trait objects.

use serde::{Deserialize, Serialize};

use crate::log::{LogTarget, Message, MessageSource};
use crate::model::player::PlayerSlot;
use crate::model::region::RegionIndex;
use crate::model::state::GameState;
use crate::model::temple::{Temple, Upgrade};
use crate::rng::SeededRng;
use crate::rules;

use super::combat::{self, AttackEvent, CombatModifiers, CombatResultKind};
use super::error::GameError;
use super::turn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildTarget {
    Soldier,
    Upgrade(Upgrade),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    ArmyMove { source: RegionIndex, target: RegionIndex, count: u32 },
    Build { region: RegionIndex, target: BuildTarget },
    EndTurn { queued: Vec<Command> },
    Resign { player: PlayerSlot },
}

/// Disables logging side effects without perturbing the RNG draw
/// sequence — "simulation mode". Threaded through every `apply_*` call
/// instead of a bare bool so AI search and property tests share one
/// on/off switch with the combat resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimConfig {
    pub simulation: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveRecordKind {
    Peaceful,
    Conquest,
    Defeated,
    Retreat,
    Recruitment,
    Upgrade,
}

/// Enough detail about one resolved move for the reconciler to
/// animate it without re-deriving provenance from a state diff. This is
/// what `lastMove` and each element of `turnMoves[]` carry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    pub source: Option<RegionIndex>,
    pub target: RegionIndex,
    pub count: u32,
    pub kind: MoveRecordKind,
    pub attack_sequence: Vec<AttackEvent>,
    pub new_owner: Option<PlayerSlot>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub new_state: Option<GameState>,
    pub attack_sequence: Option<Vec<AttackEvent>>,
    pub error: Option<GameError>,
    pub last_move: Option<MoveRecord>,
    pub turn_moves: Option<Vec<MoveRecord>>,
}

impl CommandOutcome {
    fn ok(new_state: GameState) -> Self {
        Self { success: true, new_state: Some(new_state), ..Default::default() }
    }

    fn err(error: GameError) -> Self {
        Self { success: false, error: Some(error), ..Default::default() }
    }
}

/// Applies `command` as `acting_player` against `state`, returning a fresh
/// state on success (copy-on-write) and leaving `state` untouched on
/// failure — a rejected command reports `{success: false, error}` and
/// never mutates the caller's state.
pub fn apply_command(
    state: &GameState,
    acting_player: PlayerSlot,
    command: Command,
    sim: SimConfig,
    rng: &mut SeededRng,
    log: &mut impl LogTarget,
) -> CommandOutcome {
    if super::scoring::evaluate_end(state).is_some() {
        return CommandOutcome::err(GameError::GameEnded);
    }

    match command {
        Command::ArmyMove { source, target, count } => {
            match apply_army_move(state, acting_player, source, target, count, sim, rng, log) {
                Ok((new_state, record)) => {
                    let mut outcome = CommandOutcome::ok(new_state);
                    outcome.attack_sequence = Some(record.attack_sequence.clone());
                    outcome.last_move = Some(record);
                    outcome
                }
                Err(e) => CommandOutcome::err(e),
            }
        }
        Command::Build { region, target } => match apply_build(state, acting_player, region, target, sim, log) {
            Ok((new_state, record)) => {
                let mut outcome = CommandOutcome::ok(new_state);
                outcome.last_move = Some(record);
                outcome
            }
            Err(e) => CommandOutcome::err(e),
        },
        Command::EndTurn { queued } => apply_end_turn(state, acting_player, queued, sim, rng, log),
        Command::Resign { player } => match apply_resign(state, player) {
            Ok(new_state) => CommandOutcome::ok(new_state),
            Err(e) => CommandOutcome::err(e),
        },
    }
}

fn require_current_player(state: &GameState, acting_player: PlayerSlot) -> Result<(), GameError> {
    if state.current_player_slot != acting_player {
        return Err(GameError::NotPlayersTurn { player: acting_player });
    }
    Ok(())
}

fn apply_army_move(
    state: &GameState,
    acting_player: PlayerSlot,
    source: RegionIndex,
    target: RegionIndex,
    count: u32,
    sim: SimConfig,
    rng: &mut SeededRng,
    log: &mut impl LogTarget,
) -> Result<(GameState, MoveRecord), GameError> {
    require_current_player(state, acting_player)?;

    if state.owner(source) != Some(acting_player) {
        return Err(GameError::RegionNotOwnedByPlayer { player: acting_player, region: source });
    }
    if state.conquered_regions.contains(&source) {
        return Err(GameError::ConqueredCannotMove(source));
    }
    let source_region = state.region(source).ok_or(GameError::NoSuchRegion(source))?;
    if !source_region.is_neighbor(target) {
        return Err(GameError::NotAdjacent { source, target });
    }
    state.region(target).ok_or(GameError::NoSuchRegion(target))?;
    if source == target {
        return Err(GameError::CannotAttackOwnRegion(target));
    }
    let available = state.soldier_count_at(source) as u32;
    if count < 1 || count > available {
        return Err(GameError::InsufficientForces { region: source, requested: count, available });
    }
    if state.moves_remaining < 1 {
        return Err(GameError::NoMovesRemaining);
    }

    let mut next = state.clone();
    let target_owner = next.owner(target);

    let record = if target_owner == Some(acting_player) {
        // Peaceful transfer.
        peaceful_transfer(&mut next, source, target, count);
        MoveRecord {
            source: Some(source),
            target,
            count,
            kind: MoveRecordKind::Peaceful,
            attack_sequence: Vec::new(),
            new_owner: None,
        }
    } else if target_owner.is_none() && next.soldier_count_at(target) == 0 {
        // Neutral conquest with no defenders: skip combat and
        // immediately conquer, still emitting a "Conquered!" event.
        let attacking = pop_from_end(&mut next, source, count);
        next.owners_by_region.insert(target, acting_player);
        next.soldiers_by_region.insert(target, attacking);
        next.conquered_regions.insert(target);
        let event = combat::AttackEvent {
            sound_cue: Some(combat::SoundCue::Combat),
            delay: Some(crate::conf::COMBAT_FINAL_DELAY_MS),
            floating_text: vec![combat::FloatingText {
                    region_index: target,
                    text: "Conquered!".to_string(),
                    color: combat::FloatingTextColor::Gold,
                    width: 200,
            }],
                ..Default::default()
        };
        if !sim.simulation {
            log.log(Message::new("Conquered!".to_string(), Some(MessageSource::Combat)));
        }
        MoveRecord {
            source: Some(source),
            target,
            count,
            kind: MoveRecordKind::Conquest,
            attack_sequence: vec![event],
            new_owner: Some(acting_player),
        }
    } else {
        // Combat.
        let mut attacking = pop_from_end(&mut next, source, count);
        let modifiers = CombatModifiers {
            attacker_fire_level: next
                .temple_at(source)
                .map(|t| t.upgrade_level(Upgrade::Fire))
                .unwrap_or(0),
            defender_earth_level: next
                .temple_at(target)
                .map(|t| t.upgrade_level(Upgrade::Earth))
                .unwrap_or(0),
        };

        let mut defending = next.soldiers_by_region.remove(&target).unwrap_or_default();
        let mut null_log = crate::log::NullLog;
        let combat_log: &mut dyn LogTarget = if sim.simulation { &mut null_log } else { log };
        let outcome = combat::resolve(
            &mut attacking,
            &mut defending,
            source,
            target,
            modifiers,
            rng,
            combat_log,
        );

        let kind = match outcome.result {
            CombatResultKind::Conquest => {
                next.owners_by_region.insert(target, acting_player);
                next.soldiers_by_region.insert(target, attacking);
                next.conquered_regions.insert(target);
                MoveRecordKind::Conquest
            }
            CombatResultKind::Defended => {
                next.soldiers_by_region.insert(target, defending);
                // Attacking soldiers were destroyed; nothing returns to
                // source.
                MoveRecordKind::Defeated
            }
            CombatResultKind::Retreat => {
                next.soldiers_by_region.insert(target, defending);
                let source_stack = next.soldiers_by_region.entry(source).or_default();
                source_stack.append(&mut attacking);
                MoveRecordKind::Retreat
            }
        };

        MoveRecord {
            source: Some(source),
            target,
            count,
            kind,
            attack_sequence: outcome.events,
            new_owner: if kind == MoveRecordKind::Conquest { Some(acting_player) } else { None },
        }
    };

    next.moves_remaining -= 1;
    next.update_id += 1;
    Ok((next, record))
}

fn pop_from_end(
    state: &mut GameState,
    region: RegionIndex,
    count: u32,
) -> Vec<crate::model::soldier::Soldier> {
    let stack = state.soldiers_by_region.entry(region).or_default();
    let split_at = stack.len().saturating_sub(count as usize);
    stack.split_off(split_at)
}

fn peaceful_transfer(state: &mut GameState, source: RegionIndex, target: RegionIndex, count: u32) {
    let moved = pop_from_end(state, source, count);
    state.soldiers_by_region.entry(target).or_default().extend(moved);
}

fn apply_build(
    state: &GameState,
    acting_player: PlayerSlot,
    region: RegionIndex,
    target: BuildTarget,
    sim: SimConfig,
    log: &mut impl LogTarget,
) -> Result<(GameState, MoveRecord), GameError> {
    require_current_player(state, acting_player)?;

    if state.owner(region) != Some(acting_player) {
        return Err(GameError::RegionNotOwnedByPlayer { player: acting_player, region });
    }
    let temple = state.temple_at(region).ok_or(GameError::NoTempleAtRegion(region))?.clone();

    let mut next = state.clone();

    let record = match target {
        BuildTarget::Soldier => {
            let cost = rules::soldier_cost(next.soldiers_bought_this_turn);
            let available = next.faith(acting_player);
            if available < cost {
                return Err(GameError::InsufficientFaith { player: acting_player, required: cost, available });
            }
            *next.faith_by_player.entry(acting_player).or_insert(0) -= cost;
            next.soldiers_bought_this_turn += 1;
            let id = next.next_soldier_id();
            next.soldiers_by_region.entry(region).or_default().push(crate::model::soldier::Soldier::new(id));
            if !sim.simulation {
                log.log(Message::new(
                        format!("A new soldier joins the temple garrison at region {region}."),
                        Some(MessageSource::Income),
                ));
            }
            MoveRecord {
                source: None,
                target: region,
                count: 1,
                kind: MoveRecordKind::Recruitment,
                attack_sequence: Vec::new(),
                new_owner: None,
            }
        }
        BuildTarget::Upgrade(upgrade) => {
            match temple.upgrade {
                Some(existing) if existing != upgrade => {
                    return Err(GameError::UpgradeSlotOccupied { region, existing, requested: upgrade });
                }
                Some(existing) if temple.level >= rules::MAX_UPGRADE_LEVEL => {
                    let _ = existing;
                    return Err(GameError::UpgradeAtMaxLevel(region));
                }
                _ => {}
            }
            let level_after_purchase = temple.level + if temple.upgrade.is_some() { 1 } else { 0 };
            let cost = rules::upgrade_cost(upgrade, temple.level);
            let available = next.faith(acting_player);
            if available < cost {
                return Err(GameError::InsufficientFaith { player: acting_player, required: cost, available });
            }
            *next.faith_by_player.entry(acting_player).or_insert(0) -= cost;
            let updated = Temple { region, upgrade: Some(upgrade), level: level_after_purchase };
            next.temples_by_region.insert(region, updated);
            if !sim.simulation {
                log.log(Message::new(
                        format!("Temple at region {region} channels {upgrade}."),
                        Some(MessageSource::Income),
                ));
            }
            MoveRecord {
                source: None,
                target: region,
                count: 0,
                kind: MoveRecordKind::Upgrade,
                attack_sequence: Vec::new(),
                new_owner: None,
            }
        }
    };

    next.update_id += 1;
    Ok((next, record))
}

fn apply_end_turn(
    state: &GameState,
    acting_player: PlayerSlot,
    queued: Vec<Command>,
    sim: SimConfig,
    rng: &mut SeededRng,
    log: &mut impl LogTarget,
) -> CommandOutcome {
    if let Err(e) = require_current_player(state, acting_player) {
        return CommandOutcome::err(e);
    }

    // Apply the queued envelope against a scratch clone first; if any
    // command fails, the whole envelope is rejected and the turn does not
    // end — it never applies just a prefix of the queue.
    let mut scratch = state.clone();
    let mut moves = Vec::with_capacity(queued.len());
    for (index, command) in queued.into_iter().enumerate() {
        let outcome = apply_command(&scratch, acting_player, command, sim, rng, log);
        if !outcome.success {
            return CommandOutcome {
                success: false,
                error: Some(GameError::QueuedCommandInvalid {
                        index,
                        error: Box::new(outcome.error.unwrap_or(GameError::GameEnded)),
                }),
                    ..Default::default()
            };
        }
        scratch = outcome.new_state.expect("successful outcome always carries a new state");
        if let Some(record) = outcome.last_move {
            moves.push(record);
        }
    }

    let next = turn::end_turn(&scratch, sim, log);
    let mut outcome = CommandOutcome::ok(next);
    if !moves.is_empty() {
        outcome.turn_moves = Some(moves);
    }
    outcome
}

fn apply_resign(state: &GameState, player: PlayerSlot) -> Result<GameState, GameError> {
    state.player(player).ok_or(GameError::NoSuchPlayer(player))?;
    let mut next = state.clone();
    next.eliminated_players.insert(player);
    for region in next.regions_owned_by(player).collect::<Vec<_>>() {
        next.owners_by_region.remove(&region);
    }
    next.update_id += 1;
    Ok(next)
}

