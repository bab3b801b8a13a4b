//! Heuristic evaluation and time-bounded search for AI-controlled players.
//! `policy::choose_command` is the entry point a server turn-driver calls
//! once per AI player's decision point.

pub mod heuristics;
pub mod personality;
pub mod policy;
pub mod search;

pub use personality::Personality;
pub use policy::choose_command;
pub use search::SearchConfig;

