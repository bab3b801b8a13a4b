use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::player::PlayerSlot;
use crate::model::region::RegionIndex;
use crate::model::temple::Upgrade;

/// Validation and rule-violation errors. These are returned as values
/// from the command processor — the engine never panics on a malformed
/// command, and never retries a rule internally.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameError {
    #[error("it isn't player {player}'s turn")]
    NotPlayersTurn { player: PlayerSlot },

    #[error("there is no player {0}")]
    NoSuchPlayer(PlayerSlot),

    #[error("no region with index {0}")]
    NoSuchRegion(RegionIndex),

    #[error("region {source} is not adjacent to region {target}")]
    NotAdjacent { source: RegionIndex, target: RegionIndex },

    #[error("player {player} does not own region {region}")]
    RegionNotOwnedByPlayer { player: PlayerSlot, region: RegionIndex },

    #[error("region {0} was conquered this turn and cannot move again")]
    ConqueredCannotMove(RegionIndex),

    #[error("no moves remaining this turn")]
    NoMovesRemaining,

    #[error("cannot move {requested} soldiers from region {region}, which has only {available}")]
    InsufficientForces { region: RegionIndex, requested: u32, available: u32 },

    #[error("region {0} has no temple")]
    NoTempleAtRegion(RegionIndex),

    #[error("temple at region {region} already has upgrade {existing}, cannot take {requested}")]
    UpgradeSlotOccupied { region: RegionIndex, existing: Upgrade, requested: Upgrade },

    #[error("temple at region {0} already has its upgrade at the max level")]
    UpgradeAtMaxLevel(RegionIndex),

    #[error("player {player} has {available} faith, needs {required}")]
    InsufficientFaith { player: PlayerSlot, required: u64, available: u64 },

    #[error("cannot attack your own region {0}")]
    CannotAttackOwnRegion(RegionIndex),

    #[error("the game has already ended")]
    GameEnded,

    #[error("queued end-turn envelope contained an invalid command at index {index}: {error}")]
    QueuedCommandInvalid { index: usize, error: Box<GameError> },
}

/// client-facing error code taxonomy. `GameError` carries full detail
/// for logging; `error_code` is the coarse, stable string clients switch
/// on.
impl GameError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GameError::NotPlayersTurn {.. } => "NOT_YOUR_TURN",
            GameError::NotAdjacent {.. } => "NOT_ADJACENT",
            GameError::ConqueredCannotMove(_) => "CONQUERED_CANNOT_MOVE",
            GameError::InsufficientFaith {.. } => "INSUFFICIENT_FAITH",
            GameError::GameEnded => "GAME_ENDED",
            _ => "INVALID_MOVE",
        }
    }
}

