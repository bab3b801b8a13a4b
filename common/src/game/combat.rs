//! The combat resolver: Risk-style dice with temple upgrade effects,
//! retreat, and a fully-ordered event stream the reconciler later replays
//! for animation.
//!
//! Dice shape: roll `min(3, attackers)` vs `min(2, defenders)`, sort
//! descending, compare pairwise, ties favor the defender — with
//! preemptive EARTH/FIRE damage and a retreat rule layered on top.

use serde::{Deserialize, Serialize};

use crate::log::{LogTarget, Message, MessageSource};
use crate::model::region::RegionIndex;
use crate::model::soldier::Soldier;
use crate::rng::SeededRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Attack,
    Combat,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub region_index: RegionIndex,
    pub text: String,
    pub color: FloatingTextColor,
    pub width: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatingTextColor {
    Gold,
    Attacker,
    Defender,
}

/// One step of a combat animation plan. The sole interchange
/// between the resolver and the feedback layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    pub attacker_casualties: Option<u32>,
    pub defender_casualties: Option<u32>,
    pub running_attacker_total: Option<u32>,
    pub running_defender_total: Option<u32>,
    pub sound_cue: Option<SoundCue>,
    pub delay: Option<u32>,
    pub floating_text: Vec<FloatingText>,
    pub is_retreat: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatResultKind {
    Conquest,
    Defended,
    Retreat,
}

pub struct CombatOutcome {
    pub events: Vec<AttackEvent>,
    pub result: CombatResultKind,
}

/// Inputs the resolver needs about each side's temple upgrades. Computed
/// by the caller from `GameState::temple_at(region)` so this module stays
/// decoupled from the full state shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct CombatModifiers {
    pub attacker_fire_level: u32,
    pub defender_earth_level: u32,
}

fn retreat_threshold(original_count: u32) -> u32 {
    original_count / 2
}

/// Resolves an attack of `attacking.len()` soldiers against `defending`.
/// Both stacks are mutated in place: casualties are popped from the end,
/// matching the stack semantics ("moves consume from the end").
///
/// Deterministic: reads exclusively from `rng`; given the same
/// `(attacking, defending, modifiers, rng stream)` the emitted event list
/// is byte-identical run to run.
pub fn resolve(
    attacking: &mut Vec<Soldier>,
    defending: &mut Vec<Soldier>,
    source: RegionIndex,
    target: RegionIndex,
    modifiers: CombatModifiers,
    rng: &mut SeededRng,
    log: &mut dyn LogTarget,
) -> CombatOutcome {
    let original_count = attacking.len() as u32;
    let mut events = Vec::new();
    let mut attacker_casualties_total: u32 = 0;
    let mut defender_casualties_total: u32 = 0;

    // 1. Preemptive EARTH damage (defender bonus).
    let preemptive_earth = modifiers.defender_earth_level.min(attacking.len() as u32);
    if preemptive_earth > 0 {
        kill_from_end(attacking, preemptive_earth as usize);
        attacker_casualties_total += preemptive_earth;
        events.push(AttackEvent {
                attacker_casualties: Some(preemptive_earth),
                running_attacker_total: Some(attacker_casualties_total),
                sound_cue: Some(SoundCue::Attack),
                delay: Some(crate::conf::COMBAT_ROUND_DELAY_MS),
                floating_text: vec![FloatingText {
                        region_index: target,
                        text: format!("Earth kills {}!", preemptive_earth),
                        color: FloatingTextColor::Defender,
                        width: 160,
                }],
                    ..Default::default()
        });
        log.log(Message::new(
                format!("Earth kills {} attacker(s)!", preemptive_earth),
                Some(MessageSource::Combat),
        ));
    }

    // 2. Preemptive FIRE damage (attacker bonus).
    let preemptive_fire = modifiers.attacker_fire_level.min(defending.len() as u32);
    if preemptive_fire > 0 {
        kill_from_end(defending, preemptive_fire as usize);
        defender_casualties_total += preemptive_fire;
        events.push(AttackEvent {
                defender_casualties: Some(preemptive_fire),
                running_defender_total: Some(defender_casualties_total),
                sound_cue: Some(SoundCue::Attack),
                delay: Some(crate::conf::COMBAT_ROUND_DELAY_MS),
                floating_text: vec![FloatingText {
                        region_index: target,
                        text: format!("Fire kills {}!", preemptive_fire),
                        color: FloatingTextColor::Attacker,
                        width: 160,
                }],
                    ..Default::default()
        });
        log.log(Message::new(
                format!("Fire kills {} defender(s)!", preemptive_fire),
                Some(MessageSource::Combat),
        ));
    }

    // 3. Retreat check after preemptive damage.
    if should_retreat(attacker_casualties_total, original_count, attacking, defending) {
        return finish_retreat(attacking, events, source);
    }

    // 4. Melee rounds.
    while !attacking.is_empty() && !defending.is_empty() {
        let atk_dice = 3.min(attacking.len());
        let def_dice = 2.min(defending.len());

        let mut atk_rolls = rng.roll_dice_n(6, atk_dice);
        let mut def_rolls = rng.roll_dice_n(6, def_dice);
        atk_rolls.sort_unstable_by(|a, b| b.cmp(a));
        def_rolls.sort_unstable_by(|a, b| b.cmp(a));

        let compared = atk_rolls.len().min(def_rolls.len());
        let mut round_attacker_casualties = 0u32;
        let mut round_defender_casualties = 0u32;
        for i in 0..compared {
            if atk_rolls[i] > def_rolls[i] {
                round_defender_casualties += 1;
            } else {
                // Ties go to the defender.
                round_attacker_casualties += 1;
            }
        }

        kill_from_end(attacking, round_attacker_casualties as usize);
        kill_from_end(defending, round_defender_casualties as usize);
        attacker_casualties_total += round_attacker_casualties;
        defender_casualties_total += round_defender_casualties;

        events.push(AttackEvent {
                attacker_casualties: Some(round_attacker_casualties),
                defender_casualties: Some(round_defender_casualties),
                running_attacker_total: Some(attacker_casualties_total),
                running_defender_total: Some(defender_casualties_total),
                sound_cue: Some(SoundCue::Combat),
                delay: Some(crate::conf::COMBAT_ROUND_DELAY_MS),
                    ..Default::default()
        });

        if should_retreat(attacker_casualties_total, original_count, attacking, defending) {
            return finish_retreat(attacking, events, source);
        }
    }

    // 5. Outcome.
    if defending.is_empty() {
        events.push(AttackEvent {
                sound_cue: Some(SoundCue::Combat),
                delay: Some(crate::conf::COMBAT_FINAL_DELAY_MS),
                floating_text: vec![FloatingText {
                        region_index: target,
                        text: "Conquered!".to_string(),
                        color: FloatingTextColor::Gold,
                        width: 200,
                }],
                    ..Default::default()
        });
        log.log(Message::new("Conquered!".to_string(), Some(MessageSource::Combat)));
        CombatOutcome { events, result: CombatResultKind::Conquest }
    } else {
        events.push(AttackEvent {
                sound_cue: Some(SoundCue::Combat),
                delay: Some(crate::conf::COMBAT_FINAL_DELAY_MS),
                floating_text: vec![FloatingText {
                        region_index: target,
                        text: "Defended!".to_string(),
                        color: FloatingTextColor::Defender,
                        width: 200,
                }],
                    ..Default::default()
        });
        log.log(Message::new("Defended!".to_string(), Some(MessageSource::Combat)));
        CombatOutcome { events, result: CombatResultKind::Defended }
    }
}

fn should_retreat(
    attacker_casualties_total: u32,
    original_count: u32,
    attacking: &[Soldier],
    defending: &[Soldier],
) -> bool {
    attacker_casualties_total > retreat_threshold(original_count)
    && !attacking.is_empty()
    && !defending.is_empty()
}

fn finish_retreat(
    attacking: &[Soldier],
    mut events: Vec<AttackEvent>,
    source: RegionIndex,
) -> CombatOutcome {
    let _ = attacking;
    events.push(AttackEvent {
            is_retreat: true,
            sound_cue: Some(SoundCue::Combat),
            delay: Some(crate::conf::COMBAT_ROUND_DELAY_MS),
            floating_text: vec![FloatingText {
                    region_index: source,
                    text: "Retreat!".to_string(),
                    color: FloatingTextColor::Attacker,
                    width: 160,
            }],
                ..Default::default()
    });
    events.push(AttackEvent {
            sound_cue: Some(SoundCue::Combat),
            delay: Some(crate::conf::COMBAT_FINAL_DELAY_MS),
            floating_text: vec![FloatingText {
                    region_index: source,
                    text: "Defended!".to_string(),
                    color: FloatingTextColor::Defender,
                    width: 200,
            }],
                ..Default::default()
    });
    CombatOutcome { events, result: CombatResultKind::Retreat }
}

fn kill_from_end(stack: &mut Vec<Soldier>, count: usize) {
    let new_len = stack.len().saturating_sub(count);
    stack.truncate(new_len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NullLog;
    use crate::rng::RngSeed;

    fn soldiers(n: usize, start_id: u64) -> Vec<Soldier> {
        (0..n as u64).map(|i| Soldier::new(start_id + i)).collect()
    }

    #[test]
    fn empty_attack_is_instant_conquest() {
        let mut attacking = soldiers(3, 0);
        let mut defending: Vec<Soldier> = vec![];
        let mut rng = SeededRng::from_seed(&RngSeed::from_u64(1));
        let outcome = resolve(
            &mut attacking,
            &mut defending,
            0,
            1,
            CombatModifiers::default(),
            &mut rng,
            &mut NullLog,
        );
        assert_eq!(outcome.result, CombatResultKind::Conquest);
        // Exactly one "Conquered!" event, no COMBAT rounds beforehand.
        assert_eq!(outcome.events.len(), 1);
        assert!(outcome.events[0].floating_text[0].text.starts_with("Conquered"));
    }

    #[test]
    fn retreat_boundary_is_strict_greater_than() {
        // original_count=10: floor(10/2)=5. Exactly 5 casualties must NOT
        // trigger retreat; 6 must.
        assert!(!should_retreat(5, 10, &soldiers(5, 0), &soldiers(1, 0)));
        assert!(should_retreat(6, 10, &soldiers(4, 0), &soldiers(1, 0)));
    }

    #[test]
    fn earth_preemptive_caps_at_incoming_count() {
        let mut attacking = soldiers(3, 0);
        let mut defending = soldiers(5, 100);
        let mut rng = SeededRng::from_seed(&RngSeed::from_u64(2));
        let modifiers = CombatModifiers { attacker_fire_level: 0, defender_earth_level: 99 };
        let outcome = resolve(&mut attacking, &mut defending, 0, 1, modifiers, &mut rng, &mut NullLog);
        // Earth can kill at most `count` (3) attackers before melee, even
        // though its level (99) vastly exceeds that.
        assert_eq!(outcome.events[0].attacker_casualties, Some(3));
    }

    #[test]
    fn fire_preemptive_caps_at_defender_count() {
        let mut attacking = soldiers(20, 0);
        let mut defending = soldiers(2, 100);
        let mut rng = SeededRng::from_seed(&RngSeed::from_u64(3));
        let modifiers = CombatModifiers { attacker_fire_level: 99, defender_earth_level: 0 };
        let outcome = resolve(&mut attacking, &mut defending, 0, 1, modifiers, &mut rng, &mut NullLog);
        assert_eq!(outcome.events[0].defender_casualties, Some(2));
        assert_eq!(outcome.result, CombatResultKind::Conquest);
    }

    #[test]
    fn earth_kills_trigger_retreat_before_any_melee() {
        // count=3, earth kills 2 -> 2 > floor(3/2)=1, both sides still
        // have forces -> retreat with no COMBAT rounds.
        let mut attacking = soldiers(3, 0);
        let mut defending = soldiers(5, 100);
        let mut rng = SeededRng::from_seed(&RngSeed::from_u64(4));
        let modifiers = CombatModifiers { attacker_fire_level: 0, defender_earth_level: 2 };
        let outcome = resolve(&mut attacking, &mut defending, 0, 1, modifiers, &mut rng, &mut NullLog);
        assert_eq!(outcome.result, CombatResultKind::Retreat);
        assert!(outcome.events.iter().any(|e| e.is_retreat));
        assert!(!outcome.events.iter().any(|e| e.sound_cue == Some(SoundCue::Combat)
                && e.attacker_casualties.is_some()
                && e.defender_casualties.is_some()));
    }

    #[test]
    fn soldier_conservation_minus_casualties() {
        let mut attacking = soldiers(20, 0);
        let mut defending = soldiers(1, 1000);
        let before = attacking.len() + defending.len();
        let mut rng = SeededRng::from_seed(&RngSeed::from("attacker-wins-seed"));
        let outcome = resolve(
            &mut attacking,
            &mut defending,
            0,
            1,
            CombatModifiers::default(),
            &mut rng,
            &mut NullLog,
        );
        let after = attacking.len() + defending.len();
        let casualties: u32 = outcome
            .events
            .iter()
            .map(|e| e.attacker_casualties.unwrap_or(0) + e.defender_casualties.unwrap_or(0))
            .sum();
        assert_eq!(before, after + casualties as usize);
    }

    #[test]
    fn deterministic_for_same_seed() {
        let modifiers = CombatModifiers { attacker_fire_level: 1, defender_earth_level: 1 };
        let run = || {
            let mut attacking = soldiers(10, 0);
            let mut defending = soldiers(10, 100);
            let mut rng = SeededRng::from_seed(&RngSeed::from_u64(123));
            resolve(&mut attacking, &mut defending, 0, 1, modifiers, &mut rng, &mut NullLog).events
        };
        assert_eq!(run(), run());
    }

    proptest::proptest! {
        /// *Soldier conservation minus casualties*: for any combat,
        /// `soldiers_after + casualties == soldiers_before`.
        #[test]
        fn soldier_conservation_holds_for_any_counts(
            attacker_count in 1usize..40,
            defender_count in 1usize..40,
            fire_level in 0u32..4,
            earth_level in 0u32..4,
            seed in proptest::prelude::any::<u64>(),
        ) {
            let mut attacking = soldiers(attacker_count, 0);
            let mut defending = soldiers(defender_count, 10_000);
            let before = attacking.len() + defending.len();
            let modifiers = CombatModifiers { attacker_fire_level: fire_level, defender_earth_level: earth_level };
            let mut rng = SeededRng::from_seed(&RngSeed::from_u64(seed));
            let outcome = resolve(&mut attacking, &mut defending, 0, 1, modifiers, &mut rng, &mut NullLog);
            let after = attacking.len() + defending.len();
            let casualties: u32 = outcome
                .events
                .iter()
                .map(|e| e.attacker_casualties.unwrap_or(0) + e.defender_casualties.unwrap_or(0))
                .sum();
            proptest::prop_assert_eq!(before, after + casualties as usize);
        }

        /// *Determinism*: the same `(attacking, defending, modifiers, seed)`
        /// always produces a byte-identical event stream.
        #[test]
        fn resolve_is_deterministic_for_any_seed(
            attacker_count in 1usize..20,
            defender_count in 1usize..20,
            fire_level in 0u32..4,
            earth_level in 0u32..4,
            seed in proptest::prelude::any::<u64>(),
        ) {
            let modifiers = CombatModifiers { attacker_fire_level: fire_level, defender_earth_level: earth_level };
            let run = || {
                let mut attacking = soldiers(attacker_count, 0);
                let mut defending = soldiers(defender_count, 10_000);
                let mut rng = SeededRng::from_seed(&RngSeed::from_u64(seed));
                resolve(&mut attacking, &mut defending, 0, 1, modifiers, &mut rng, &mut NullLog).events
            };
            proptest::prop_assert_eq!(run(), run());
        }
    }
}

