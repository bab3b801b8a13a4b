//! One task per game: "multiple games may run in parallel... one
//! dedicated worker per game." Each [`GameActor`] owns its `GameState`, its
//! live `SeededRng` stream, and the narration log, and is driven entirely
//! through an unbounded mpsc channel — no lock is ever shared across games
//! or across a game's own command/AI-turn sequencing.

use std::collections::HashMap;

use common::game::command::{apply_command, BuildTarget, Command, CommandOutcome, SimConfig};
use common::log::Message;
use common::model::player::{AiLevel, PlayerSlot};
use common::model::region::RegionIndex;
use common::model::state::GameState;
use common::rng::SeededRng;
use common::rpc::{GameStateUpdate, PlayerSecret};
use runetide_ai::personality::Personality;
use runetide_ai::SearchConfig;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// A registered AI-controlled seat: which personality and difficulty drive
/// its `choose_command` calls once it becomes the active player.
#[derive(Clone, Copy)]
pub struct AiSeat {
    pub personality: &'static Personality,
    pub level: AiLevel,
}

enum Request {
    GameState { secret: PlayerSecret, reply: oneshot::Sender<Option<GameState>> },
    ArmyMove {
        secret: PlayerSecret,
        source: RegionIndex,
        target: RegionIndex,
        count: u32,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Build { secret: PlayerSecret, region: RegionIndex, target: BuildTarget, reply: oneshot::Sender<CommandOutcome> },
    EndTurn { secret: PlayerSecret, queued: Vec<Command>, reply: oneshot::Sender<CommandOutcome> },
    Resign { secret: PlayerSecret, reply: oneshot::Sender<CommandOutcome> },
    WaitForUpdate { secret: PlayerSecret, since_update_id: u64, reply: oneshot::Sender<GameStateUpdate> },
}

/// A cheaply-cloned handle to a running [`GameActor`]. Every RPC call is
/// translated into a [`Request`] sent down this channel; the actor answers
/// through the paired oneshot.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::UnboundedSender<Request>,
}

impl GameHandle {
    pub async fn game_state(&self, secret: PlayerSecret) -> Option<GameState> {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(Request::GameState { secret, reply }).is_err() {
            return None;
        }
        rx.await.ok().flatten()
    }

    pub async fn army_move(&self, secret: PlayerSecret, source: RegionIndex, target: RegionIndex, count: u32) -> CommandOutcome {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(Request::ArmyMove { secret, source, target, count, reply }).is_err() {
            return unavailable();
        }
        rx.await.unwrap_or_else(|_| unavailable())
    }

    pub async fn build(&self, secret: PlayerSecret, region: RegionIndex, target: BuildTarget) -> CommandOutcome {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(Request::Build { secret, region, target, reply }).is_err() {
            return unavailable();
        }
        rx.await.unwrap_or_else(|_| unavailable())
    }

    pub async fn end_turn(&self, secret: PlayerSecret, queued: Vec<Command>) -> CommandOutcome {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(Request::EndTurn { secret, queued, reply }).is_err() {
            return unavailable();
        }
        rx.await.unwrap_or_else(|_| unavailable())
    }

    pub async fn resign(&self, secret: PlayerSecret) -> CommandOutcome {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(Request::Resign { secret, reply }).is_err() {
            return unavailable();
        }
        rx.await.unwrap_or_else(|_| unavailable())
    }

    pub async fn wait_for_update(&self, secret: PlayerSecret, since_update_id: u64) -> Option<GameStateUpdate> {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(Request::WaitForUpdate { secret, since_update_id, reply }).is_err() {
            return None;
        }
        rx.await.ok()
    }
}

fn unavailable() -> CommandOutcome {
    CommandOutcome { success: false, ..Default::default() }
}

struct Waiter {
    since_update_id: u64,
    reply: oneshot::Sender<GameStateUpdate>,
}

struct GameActor {
    state: GameState,
    rng: SeededRng,
    log: Vec<Message>,
    secrets: HashMap<PlayerSecret, PlayerSlot>,
    ai_seats: HashMap<PlayerSlot, AiSeat>,
    waiters: Vec<Waiter>,
}

impl GameActor {
    fn player_of(&self, secret: PlayerSecret) -> Option<PlayerSlot> {
        self.secrets.get(&secret).copied()
    }

    fn snapshot(&self) -> GameStateUpdate {
        GameStateUpdate { state: self.state.clone(), last_move: None, turn_moves: None }
    }

    fn apply_outcome(&mut self, outcome: &CommandOutcome) {
        if !outcome.success {
            return;
        }
        if let Some(new_state) = &outcome.new_state {
            self.state = new_state.clone();
        }
        let update = GameStateUpdate {
            state: self.state.clone(),
            last_move: outcome.last_move.clone(),
            turn_moves: outcome.turn_moves.clone(),
        };
        self.notify_waiters(update);
    }

    fn notify_waiters(&mut self, update: GameStateUpdate) {
        let update_id = self.state.update_id;
        let mut still_waiting = Vec::with_capacity(self.waiters.len());
        for waiter in self.waiters.drain(..) {
            if waiter.since_update_id < update_id {
                let _ = waiter.reply.send(update.clone());
            } else {
                still_waiting.push(waiter);
            }
        }
        self.waiters = still_waiting;
    }

    /// Runs every AI seat's turn in sequence until either a human becomes
    /// the active player or the game ends, "runs commands
    /// sequentially per game."
    fn drive_ai_turns(&mut self) {
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > common::conf::MAX_PLAYER_SLOTS * 64 {
                warn!("AI turn driver bailed out after an unexpectedly long run");
                break;
            }
            if common::game::scoring::evaluate_end(&self.state).is_some() {
                break;
            }
            let Some(seat) = self.ai_seats.get(&self.state.current_player_slot).copied() else {
                break;
            };
            let command = runetide_ai::choose_command(
                &self.state,
                self.state.current_player_slot,
                seat.personality,
                seat.level,
                SearchConfig::default(),
                &mut self.rng,
            );
            debug!(player = self.state.current_player_slot, ?command, "AI turn");
            let outcome = apply_command(&self.state, self.state.current_player_slot, command, SimConfig::default(), &mut self.rng, &mut self.log);
            if !outcome.success {
                warn!(error = ?outcome.error, "AI produced an invalid command, ending its turn instead");
                let fallback = apply_command(
                    &self.state,
                    self.state.current_player_slot,
                    Command::EndTurn { queued: Vec::new() },
                    SimConfig::default(),
                    &mut self.rng,
                    &mut self.log,
                );
                self.apply_outcome(&fallback);
                continue;
            }
            self.apply_outcome(&outcome);
        }
    }

    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Request>) {
        while let Some(request) = receiver.recv().await {
            match request {
                Request::GameState { secret, reply } => {
                    let state = self.player_of(secret).map(|_| self.state.clone());
                    let _ = reply.send(state);
                }
                Request::ArmyMove { secret, source, target, count, reply } => {
                    let Some(slot) = self.player_of(secret) else {
                        let _ = reply.send(unavailable());
                        continue;
                    };
                    let outcome = apply_command(
                        &self.state,
                        slot,
                        Command::ArmyMove { source, target, count },
                        SimConfig::default(),
                        &mut self.rng,
                        &mut self.log,
                    );
                    self.apply_outcome(&outcome);
                    if outcome.success {
                        self.drive_ai_turns();
                    }
                    let _ = reply.send(outcome);
                }
                Request::Build { secret, region, target, reply } => {
                    let Some(slot) = self.player_of(secret) else {
                        let _ = reply.send(unavailable());
                        continue;
                    };
                    let outcome = apply_command(&self.state, slot, Command::Build { region, target }, SimConfig::default(), &mut self.rng, &mut self.log);
                    self.apply_outcome(&outcome);
                    if outcome.success {
                        self.drive_ai_turns();
                    }
                    let _ = reply.send(outcome);
                }
                Request::EndTurn { secret, queued, reply } => {
                    let Some(slot) = self.player_of(secret) else {
                        let _ = reply.send(unavailable());
                        continue;
                    };
                    let outcome = apply_command(&self.state, slot, Command::EndTurn { queued }, SimConfig::default(), &mut self.rng, &mut self.log);
                    self.apply_outcome(&outcome);
                    if outcome.success {
                        self.drive_ai_turns();
                    }
                    let _ = reply.send(outcome);
                }
                Request::Resign { secret, reply } => {
                    let Some(slot) = self.player_of(secret) else {
                        let _ = reply.send(unavailable());
                        continue;
                    };
                    let outcome = apply_command(&self.state, slot, Command::Resign { player: slot }, SimConfig::default(), &mut self.rng, &mut self.log);
                    self.apply_outcome(&outcome);
                    if outcome.success {
                        self.drive_ai_turns();
                    }
                    let _ = reply.send(outcome);
                }
                Request::WaitForUpdate { secret, since_update_id, reply } => {
                    if self.player_of(secret).is_none() {
                        let _ = reply.send(self.snapshot());
                        continue;
                    }
                    if since_update_id < self.state.update_id {
                        let _ = reply.send(self.snapshot());
                    } else {
                        self.waiters.push(Waiter { since_update_id, reply });
                    }
                }
            }
        }
        info!("game actor exiting: no more handles");
    }
}

/// Spawns a game actor seeded from `state`'s own `rng_seed`, and kicks off
/// any AI seats that happen to start the game in the active slot.
pub fn spawn(state: GameState, secrets: HashMap<PlayerSecret, PlayerSlot>, ai_seats: HashMap<PlayerSlot, AiSeat>) -> GameHandle {
    let (sender, receiver) = mpsc::unbounded_channel();
    let rng = SeededRng::from_seed(&state.rng_seed);
    let mut actor = GameActor { state, rng, log: Vec::new(), secrets, ai_seats, waiters: Vec::new() };
    actor.drive_ai_turns();
    tokio::spawn(actor.run(receiver));
    GameHandle { sender }
}

