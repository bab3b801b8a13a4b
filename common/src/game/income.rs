//! Per-turn faith income.

use crate::model::player::PlayerSlot;
use crate::model::state::GameState;
use crate::model::temple::Upgrade;
use crate::rules::water_income_bonus_percent;

/// ```text
/// base = |regions_owned_by_player|
/// + Σ over owned temple regions r: |soldiers at r|
/// waterBonusPercent = Σ over owned temple regions: incomeBonus(temple)
/// income = floor(base * (1 + waterBonusPercent/100))
/// ```
pub fn income_for_player(state: &GameState, slot: PlayerSlot) -> u64 {
    let region_count = state.region_count(slot) as u64;

    let mut praying_soldiers = 0u64;
    let mut water_bonus_percent = 0u64;

    for region in state.regions_owned_by(slot) {
        if let Some(temple) = state.temple_at(region) {
            praying_soldiers += state.soldier_count_at(region) as u64;
            if temple.upgrade == Some(Upgrade::Water) {
                water_bonus_percent += water_income_bonus_percent(temple.level);
            }
        }
    }

    let base = region_count + praying_soldiers;
    base * (100 + water_bonus_percent) / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::Player;
    use crate::model::region::Region;
    use crate::model::soldier::Soldier;
    use crate::model::temple::Temple;
    use crate::rng::RngSeed;

    fn base_state(num_regions: u32) -> GameState {
        let regions = (0..num_regions).map(|i| Region::new(i, 0.0, 0.0)).collect();
        let players = vec![Player::human(0, "P0", "red")];
        GameState::new(regions, players, 10, RngSeed::from_u64(1))
    }

    #[test]
    fn water_temple_income_rounds_down() {
        // 5 regions, 5 soldiers at a WATER L0 (+20%) temple
        // -> floor((5+5)*1.20) = 12.
        let mut state = base_state(5);
        for r in 0..5 {
            state.owners_by_region.insert(r, 0);
        }
        state.soldiers_by_region.insert(0, (0..5).map(Soldier::new).collect());
        let mut temple = Temple::new(0);
        temple.upgrade = Some(Upgrade::Water);
        temple.level = 0;
        state.temples_by_region.insert(0, temple);

        assert_eq!(income_for_player(&state, 0), 12);

        // Level 1 (+40%) -> floor(10*1.40) = 14.
        state.temples_by_region.get_mut(&0).unwrap().level = 1;
        assert_eq!(income_for_player(&state, 0), 14);
    }

    #[test]
    fn two_water_temples_stack_bonus_percent() {
        // 10 regions, two L0 WATER temples, 0 soldiers -> floor(10*1.40)=14.
        let mut state = base_state(10);
        for r in 0..10 {
            state.owners_by_region.insert(r, 0);
        }
        for r in [0u32, 1u32] {
            let mut temple = Temple::new(r);
            temple.upgrade = Some(Upgrade::Water);
            temple.level = 0;
            state.temples_by_region.insert(r, temple);
        }
        assert_eq!(income_for_player(&state, 0), 14);
    }
}

