use serde::{Deserialize, Serialize};

use super::region::RegionIndex;

/// The elemental upgrade catalog:
///
/// - `Earth`: preemptive defender damage before melee.
/// - `Fire`: preemptive attacker damage before melee.
/// - `Water`: income multiplier.
/// - `Air`: grants the owning player `level` extra army-move points at the
/// start of each of their turns — movement economy is the one lever the
/// income/turn model exposes that doesn't collide with the
/// exhaustively-specified combat math, so that's where Air's bonus lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Upgrade {
    Earth,
    Fire,
    Water,
    Air,
}

impl Upgrade {
    pub const ALL: [Upgrade; 4] = [Upgrade::Earth, Upgrade::Fire, Upgrade::Water, Upgrade::Air];
}

impl std::fmt::Display for Upgrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Upgrade::Earth => "Earth",
            Upgrade::Fire => "Fire",
            Upgrade::Water => "Water",
            Upgrade::Air => "Air",
        };
        f.write_str(s)
    }
}

/// A region has at most one temple; its upgrade slot holds exactly one
/// elemental upgrade once purchased and cannot be swapped (/).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Temple {
    pub region: RegionIndex,
    pub upgrade: Option<Upgrade>,
    pub level: u32,
}

impl Temple {
    pub fn new(region: RegionIndex) -> Self {
        Self { region, upgrade: None, level: 0 }
    }

    /// The effective level of `upgrade` at this temple, 0 if this temple
    /// doesn't have that upgrade at all. Combat math reads this
    /// directly: `defender.upgradeLevel(EARTH)`.
    pub fn upgrade_level(&self, upgrade: Upgrade) -> u32 {
        if self.upgrade == Some(upgrade) {
            self.level + 1
        } else {
            0
        }
    }
}

