#![forbid(unsafe_code)]
#![allow(clippy::too_many_arguments)]

pub mod conf;
pub mod game;
pub mod log;
pub mod model;
pub mod rng;
pub mod rpc;
pub mod rules;

pub use game::error::GameError;
pub use model::state::GameState;

pub type GameResult<T> = Result<T, GameError>;

