//! Static configuration: timing constants, per-turn budgets, and other
//! values that tune the rules without changing their shape.
//!
//! These start as plain consts. If this ever grows config files or env
//! overrides, that belongs here.

/// The name of this application.
pub const APP_NAME: &str = "runetide";

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Army-move points granted to the active player at the start of their turn.
pub const DEFAULT_MOVES_PER_TURN: u32 = 3;

/// Maximum slots in a game, matching `Player::slotIndex ∈ [0, maxSlots)`.
pub const MAX_PLAYER_SLOTS: usize = 8;

/// Timing constants (milliseconds). Kept configurable by being plain
/// consts rather than literals scattered through the reconciler.
pub const SOLDIER_MOVE_MS: u32 = 700;
pub const BATTLE_END_WAIT_MS: u32 = 2500;
pub const FEEDBACK_HIGHLIGHT_MS: u32 = 1500;
pub const QUICK_ANIMATION_MS: u32 = 300;

/// Combat pacing.
pub const COMBAT_ROUND_DELAY_MS: u32 = 800;
pub const COMBAT_FINAL_DELAY_MS: u32 = 600;

/// AI search time budget.
pub const AI_THINK_TIME_MS_MIN: u64 = 200;
pub const AI_THINK_TIME_MS_MAX: u64 = 2000;

/// How many search-tree node expansions the AI performs between
/// cooperative time checks point 3.
pub const AI_SEARCH_YIELD_INTERVAL: usize = 100;

