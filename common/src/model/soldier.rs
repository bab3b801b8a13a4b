use serde::{Deserialize, Serialize};

/// Stable integer id of a soldier. Soldier ids are never reused within
/// a game: `GameState::next_soldier_id` only ever increases.
pub type SoldierId = u64;

/// A single unit in a region's garrison.
///
/// Transient per-soldier animation flags (which region a soldier just
/// attacked, which region it's mid-move toward) are a rendering concern
/// and must never enter authoritative state or any equality/rules check,
/// so this type carries nothing but identity — the reconciler crate keeps
/// the transient overlay (`runetide_reconciler::overlay`) separately,
/// keyed by `SoldierId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Soldier {
    pub id: SoldierId,
}

impl Soldier {
    pub fn new(id: SoldierId) -> Self {
        Self { id }
    }
}

