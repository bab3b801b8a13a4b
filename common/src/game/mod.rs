pub mod combat;
pub mod command;
pub mod error;
pub mod income;
pub mod scoring;
pub mod turn;

pub use combat::AttackEvent;
pub use command::{BuildTarget, Command, CommandOutcome, MoveRecord, MoveRecordKind, SimConfig};
pub use error::GameError;
pub use scoring::{EndReason, GameEndStatus};
pub use turn::end_turn;

