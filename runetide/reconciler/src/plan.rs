//! Builds an ordered `FeedbackEvent` plan from a server update, and applies
//! each settled step to a running [`Overlay`] so the next step's animation
//! starts from the right positions.

use serde::{Deserialize, Serialize};

use common::game::command::{MoveRecord, MoveRecordKind};
use common::game::AttackEvent;
use common::model::player::PlayerSlot;
use common::model::region::RegionIndex;
use common::model::state::GameState;

use crate::diff::{self, DetectedMove};
use crate::overlay::Overlay;

/// One step of client-side animation. Serializable so a headless
/// client (or a test) can inspect the plan without a renderer attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeedbackEvent {
    Movement { source: RegionIndex, target: RegionIndex, count: u32, delay_ms: u32 },
    Conquest { source: Option<RegionIndex>, target: RegionIndex, count: u32, attack_sequence: Vec<AttackEvent>, new_owner: PlayerSlot },
    FailedAttack { source: RegionIndex, target: RegionIndex, retreats: bool, delay_ms: u32 },
    Recruitment { region: RegionIndex, delay_ms: u32 },
    Upgrade { region: RegionIndex, delay_ms: u32 },
}

impl FeedbackEvent {
    /// The wall-clock delay this step's settle should wait before the next
    /// step may begin, summing a conquest's own event delays.
    pub fn total_delay_ms(&self) -> u64 {
        match self {
            FeedbackEvent::Movement { delay_ms, .. }
            | FeedbackEvent::FailedAttack { delay_ms, .. }
            | FeedbackEvent::Recruitment { delay_ms, .. }
            | FeedbackEvent::Upgrade { delay_ms, .. } => *delay_ms as u64,
            FeedbackEvent::Conquest { attack_sequence, .. } => {
                attack_sequence.iter().filter_map(|e| e.delay).map(|d| d as u64).sum::<u64>()
                + common::conf::BATTLE_END_WAIT_MS as u64
            }
        }
    }
}

/// Derives the move list per the priority order: a batched
/// `turnMoves[]`, else a single `lastMove`, else the state-diff fallback.
pub fn build_plan(
    previous: &GameState,
    new: &GameState,
    turn_moves: Option<&[MoveRecord]>,
    last_move: Option<&MoveRecord>,
) -> Vec<FeedbackEvent> {
    if let Some(moves) = turn_moves {
        if !moves.is_empty() {
            return moves.iter().map(event_from_move_record).collect();
        }
    }
    if let Some(record) = last_move {
        return vec![event_from_move_record(record)];
    }
    diff::detect_moves(previous, new).iter().map(event_from_detected).collect()
}

fn event_from_move_record(record: &MoveRecord) -> FeedbackEvent {
    build_event(record.source, record.target, record.count, record.kind, Some(record.attack_sequence.clone()), record.new_owner)
}

fn event_from_detected(mv: &DetectedMove) -> FeedbackEvent {
    build_event(mv.source, mv.target, mv.count, mv.kind, None, mv.new_owner)
}

fn build_event(
    source: Option<RegionIndex>,
    target: RegionIndex,
    count: u32,
    kind: MoveRecordKind,
    attack_sequence: Option<Vec<AttackEvent>>,
    new_owner: Option<PlayerSlot>,
) -> FeedbackEvent {
    match kind {
        MoveRecordKind::Peaceful => FeedbackEvent::Movement {
            source: source.expect("a peaceful move always names a source"),
            target,
            count,
            delay_ms: common::conf::SOLDIER_MOVE_MS,
        },
        MoveRecordKind::Conquest => FeedbackEvent::Conquest {
            source,
            target,
            count,
            attack_sequence: attack_sequence.unwrap_or_default(),
            new_owner: new_owner.expect("a conquest always assigns a new owner"),
        },
        MoveRecordKind::Defeated | MoveRecordKind::Retreat => FeedbackEvent::FailedAttack {
            source: source.expect("a failed attack always names a source"),
            target,
            retreats: kind == MoveRecordKind::Retreat,
            delay_ms: common::conf::COMBAT_FINAL_DELAY_MS,
        },
        MoveRecordKind::Recruitment => {
            FeedbackEvent::Recruitment { region: target, delay_ms: common::conf::FEEDBACK_HIGHLIGHT_MS }
        }
        MoveRecordKind::Upgrade => FeedbackEvent::Upgrade { region: target, delay_ms: common::conf::FEEDBACK_HIGHLIGHT_MS },
    }
}

/// Applies a settled step's effect to `overlay` so the next plan step
/// animates from the correct soldier positions and ownership.
pub fn settle(overlay: &mut Overlay, event: &FeedbackEvent) {
    overlay.clear_transient_flags();
    match event {
        FeedbackEvent::Movement { source, target, count, .. } => {
            overlay.transfer(*source, *target, *count);
        }
        FeedbackEvent::Conquest { source, target, count, new_owner, .. } => {
            if let Some(source) = source {
                overlay.transfer(*source, *target, *count);
            }
            overlay.set_owner(*target, *new_owner);
        }
        FeedbackEvent::FailedAttack {.. } => {
            // Casualties were already reflected in the state the overlay
            // was built from; no transfer needed for a repelled attack.
        }
        FeedbackEvent::Recruitment {.. } | FeedbackEvent::Upgrade {.. } => {}
    }
}
