use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable integer identity of a region. Indices are the only thing
/// rules code should ever key on — never array position, never identity.
pub type RegionIndex = u32;

/// A node in the map graph. Regions are created once by the map generator
/// (an external collaborator) and are immutable thereafter; the engine
/// only ever reads them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub index: RegionIndex,

    /// Display coordinates. Purely a rendering hint; rules never consult
    /// these — an optional static attribute, not game state.
    pub x: f32,
    pub y: f32,

    pub neighbors: BTreeSet<RegionIndex>,

    /// Free-form display name, e.g. for a renderer's region labels.
    pub name: Option<String>,
}

impl Region {
    pub fn new(index: RegionIndex, x: f32, y: f32) -> Self {
        Self { index, x, y, neighbors: BTreeSet::new(), name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_neighbors(mut self, neighbors: impl IntoIterator<Item = RegionIndex>) -> Self {
        self.neighbors.extend(neighbors);
        self
    }

    pub fn is_neighbor(&self, other: RegionIndex) -> bool {
        self.neighbors.contains(&other)
    }
}

