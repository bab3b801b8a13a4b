//! The external command surface: `ARMY_MOVE`/`BUILD`/`END_TURN`/`RESIGN`
//! plus a long-poll `wait_for_update` standing in for the push
//! `gameStateUpdate` event, since tarpc is request/response. One
//! `#[tarpc::service]` with a `player_secret` on every call that touches a
//! specific player's view.

use serde::{Deserialize, Serialize};

use crate::game::{BuildTarget, Command, CommandOutcome, MoveRecord};
use crate::model::region::RegionIndex;
use crate::model::GameState;

/// Identifies which of the server's concurrently-running games a call
/// targets: "multiple games may run in parallel... one dedicated
/// worker per game."
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

/// Opaque per-connection credential, handed to a client when it joins a
/// game and required on every call that acts as a specific player. Not a
/// cryptographic secret, just enough to keep one client from impersonating
/// another over the same server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSecret(pub u64);

/// What `wait_for_update` resolves with once `GameState::update_id`
/// advances past the caller's watermark: the fresh state, plus enough of
/// the move that produced it for a client-side reconciler to animate
/// without re-deriving provenance from a diff.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameStateUpdate {
    pub state: GameState,
    pub last_move: Option<MoveRecord>,
    pub turn_moves: Option<Vec<MoveRecord>>,
}

/// The Runetide RPC interface. The macro generates a client impl called
/// `RunetideRpcClient`.
#[tarpc::service]
pub trait RunetideRpc {
    /// The authoritative state as of the last applied command.
    async fn game_state(game: GameId, player_secret: PlayerSecret) -> Option<GameState>;

    async fn army_move(
        game: GameId,
        player_secret: PlayerSecret,
        source: RegionIndex,
        target: RegionIndex,
        count: u32,
    ) -> CommandOutcome;

    async fn build(
        game: GameId,
        player_secret: PlayerSecret,
        region: RegionIndex,
        target: BuildTarget,
    ) -> CommandOutcome;

    /// Submits an `END_TURN` envelope, optionally carrying queued commands
    /// to apply first — all-or-nothing, never a partial prefix.
    async fn end_turn(game: GameId, player_secret: PlayerSecret, queued: Vec<Command>) -> CommandOutcome;

    async fn resign(game: GameId, player_secret: PlayerSecret) -> CommandOutcome;

    /// Long-polls for the next state with `update_id > since_update_id`.
    /// Stands in for the push-based `gameStateUpdate` event in a
    /// request/response RPC transport.
    async fn wait_for_update(game: GameId, player_secret: PlayerSecret, since_update_id: u64) -> GameStateUpdate;
}

