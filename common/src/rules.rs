//! Static rules tables: "AI personality tables and upgrade tables:
//! static data; load once from config; never mutate at runtime." Personality
//! tables live in `runetide_ai::personality` since they're AI-only; the
//! tables here are read by the command processor and income calculator,
//! i.e. shared rules everyone agrees on regardless of who's playing.

use crate::model::temple::Upgrade;

/// Highest level an elemental upgrade can reach (level is 0-based, so this
/// is 3 distinct tiers: 0, 1, 2).
pub const MAX_UPGRADE_LEVEL: u32 = 2;

/// Faith cost to take an upgrade from `level` to `level + 1` (or to buy the
/// first tier of a fresh upgrade at `level == 0`).
pub fn upgrade_cost(_upgrade: Upgrade, level: u32) -> u64 {
    const BASE_UPGRADE_COST: u64 = 10;
    BASE_UPGRADE_COST * (level as u64 + 1)
}

/// WATER's income multiplier in percentage points per level:
/// "WATER: e.g. +20% per level". `level` is 0-based (level 0 -> +20%).
pub fn water_income_bonus_percent(level: u32) -> u64 {
    20 * (level as u64 + 1)
}

/// open question 1, resolved: soldier cost scales with how many
/// soldiers this player has already bought *this turn* — buying a second
/// soldier the same turn costs more than the first, discouraging
/// stockpiling faith for a single mega-turn while keeping the schedule
/// simple to reason about (and trivially resettable at turn start, unlike
/// a schedule keyed off a never-resetting global index).
pub fn soldier_cost(soldiers_bought_this_turn: u32) -> u64 {
    const BASE_SOLDIER_COST: u64 = 5;
    const PER_EXTRA_SOLDIER_SURCHARGE: u64 = 2;
    BASE_SOLDIER_COST + PER_EXTRA_SOLDIER_SURCHARGE * soldiers_bought_this_turn as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soldier_cost_increases_with_count_this_turn() {
        assert!(soldier_cost(0) < soldier_cost(1));
        assert!(soldier_cost(1) < soldier_cost(2));
    }

    #[test]
    fn upgrade_cost_increases_with_level() {
        assert!(upgrade_cost(Upgrade::Earth, 0) < upgrade_cost(Upgrade::Earth, 1));
    }

    #[test]
    fn water_bonus_scales_with_level() {
        // level 0 -> +20%, level 1 -> +40%.
        assert_eq!(water_income_bonus_percent(0), 20);
        assert_eq!(water_income_bonus_percent(1), 40);
    }
}

