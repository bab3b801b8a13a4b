use serde::{Deserialize, Serialize};

/// The canonical identity of a player within a game: "Slot indices are
/// the canonical identity everywhere; never rely on object identity or
/// array position."
pub type PlayerSlot = usize;

/// AI difficulty. `Nice` never perceives threat or opportunity;
/// `Rude` and `Mean` differ in how deep they scan for enemy presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiLevel {
    Nice,
    Rude,
    Mean,
}

impl AiLevel {
    pub fn from_difficulty_str(s: &str) -> Self {
        match s {
            "Nice" => AiLevel::Nice,
            "Hard" => AiLevel::Mean,
            _ => AiLevel::Rude, // "Normal" and anything unrecognized default to Rude, matching default aiLevel=1
        }
    }
}

impl Default for AiLevel {
    fn default() -> Self {
        AiLevel::Rude
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub slot: PlayerSlot,
    pub name: String,
    pub color: String,
    pub is_ai: bool,

    /// Personality key, e.g. `"Aggressor"`. `None` for human players.
    pub personality: Option<String>,
}

impl Player {
    pub fn human(slot: PlayerSlot, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self { slot, name: name.into(), color: color.into(), is_ai: false, personality: None }
    }

    pub fn ai(
        slot: PlayerSlot,
        name: impl Into<String>,
        color: impl Into<String>,
        personality: impl Into<String>,
    ) -> Self {
        Self {
            slot,
            name: name.into(),
            color: color.into(),
            is_ai: true,
            personality: Some(personality.into()),
        }
    }
}

