//! Holds every currently-running game's [`GameHandle`], addressed by
//! [`GameId`]. Insertion and lookup are the only operations this registry
//! performs, so a plain mutex is enough — all the actual game-mutating work
//! happens inside each game's own actor task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use common::rpc::{GameId, PlayerSecret};

use crate::actor::GameHandle;

#[derive(Default)]
pub struct GameRegistry {
    games: Mutex<HashMap<GameId, GameHandle>>,
    next_game_id: AtomicU64,
    next_secret: AtomicU64,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next `GameId`, without yet registering a handle for it.
    pub fn reserve_game_id(&self) -> GameId {
        GameId(self.next_game_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Mints a fresh opaque credential for one seat in a not-yet-registered
    /// game.
    pub fn mint_secret(&self) -> PlayerSecret {
        PlayerSecret(self.next_secret.fetch_add(1, Ordering::Relaxed))
    }

    pub fn register(&self, id: GameId, handle: GameHandle) {
        self.games.lock().unwrap().insert(id, handle);
    }

    pub fn get(&self, id: GameId) -> Option<GameHandle> {
        self.games.lock().unwrap().get(&id).cloned()
    }
}

