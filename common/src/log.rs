//! An abstract, game-facing logging interface.
//!
//! This is the channel over which the engine narrates what happened (a
//! conquest, a retreat, a temple upgrade) to whatever is presenting the
//! game to a player. It is distinct from the operational `tracing` spans
//! emitted by the server process — this log is part of the game's output,
//! not its diagnostics.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageSource {
    Combat,
    Income,
    Turn,
    Ai,
}

/// A loggable narration of something that happened in the game, along with
/// presentation hints a renderer may use (or ignore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub source: Option<MessageSource>,
}

impl Message {
    pub fn new(text: String, source: Option<MessageSource>) -> Self {
        Self { text, source }
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message { text: s, source: None }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Self::from(String::from(s))
    }
}

/// A valid target to which game messages can be logged. Kept object-safe
/// (no generic methods) so the command processor can pick between a real
/// sink and [`NullLog`] at runtime for simulation mode.
pub trait LogTarget {
    fn log(&mut self, message: Message);
}

impl LogTarget for Vec<Message> {
    fn log(&mut self, message: Message) {
        self.push(message);
    }
}

/// A log target that discards everything, for simulation runs (AI search,
/// property tests) that must not pay for narration they'll never read.
#[derive(Default)]
pub struct NullLog;

impl LogTarget for NullLog {
    fn log(&mut self, _message: Message) {}
}

