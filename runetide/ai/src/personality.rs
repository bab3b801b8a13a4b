//! AI personalities: how eagerly a bot buys soldiers versus temple
//! upgrades, and which upgrade it reaches for first.

use common::model::temple::Upgrade;

/// A named tendency for the build-versus-upgrade-versus-attack pipeline in
/// [`crate::policy`].
#[derive(Clone, Debug, PartialEq)]
pub struct Personality {
    pub name: &'static str,

    /// Upgrades tried in order when a temple slot is free or eligible for
    /// another level; the first affordable one wins.
    pub upgrade_preference: &'static [Upgrade],

    /// How much a region's (enemy soldiers - our soldiers) disparity has to
    /// favor the enemy before this personality reaches for its wallet
    /// instead of attacking with what it already has.
    pub soldier_eagerness: f64,
}

pub const DEFENDER: Personality = Personality {
    name: "Defender",
    upgrade_preference: &[Upgrade::Earth, Upgrade::Water, Upgrade::Air, Upgrade::Fire],
    soldier_eagerness: 0.5,
};

pub const ECONOMIST: Personality = Personality {
    name: "Economist",
    upgrade_preference: &[Upgrade::Water, Upgrade::Earth, Upgrade::Air, Upgrade::Fire],
    soldier_eagerness: 0.2,
};

pub const AGGRESSOR: Personality = Personality {
    name: "Aggressor",
    upgrade_preference: &[Upgrade::Fire, Upgrade::Air, Upgrade::Water, Upgrade::Earth],
    soldier_eagerness: 1.0,
};

pub const BERSERKER: Personality = Personality {
    name: "Berserker",
    upgrade_preference: &[Upgrade::Fire, Upgrade::Fire, Upgrade::Air, Upgrade::Water],
    soldier_eagerness: 1.8,
};

/// Resolves a player's stored personality key to its table entry, falling
/// back to `Defender` for an unrecognized or missing key.
pub fn by_name(name: Option<&str>) -> &'static Personality {
    match name {
        Some("Economist") => &ECONOMIST,
        Some("Aggressor") => &AGGRESSOR,
        Some("Berserker") => &BERSERKER,
        _ => &DEFENDER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_personality_falls_back_to_defender() {
        assert_eq!(by_name(Some("Unknown")), &DEFENDER);
        assert_eq!(by_name(None), &DEFENDER);
    }

    #[test]
    fn berserker_is_most_eager_to_attack() {
        assert!(BERSERKER.soldier_eagerness > AGGRESSOR.soldier_eagerness);
        assert!(AGGRESSOR.soldier_eagerness > DEFENDER.soldier_eagerness);
        assert!(DEFENDER.soldier_eagerness > ECONOMIST.soldier_eagerness);
    }
}

