//! Gate0: gated claim funnel engine
//!
//! Drives a single funnel attempt through the stage machine
//! idle → processing → locked ⇄ checking → verified, plus the ambient
//! activity simulation that runs around it regardless of user action.

pub mod core;
pub mod types;

// =============================================================================
// SCRIPT TIMING [C]
// =============================================================================

/// Number of entries in the processing script table
pub const SCRIPT_TICK_COUNT: u8 = 10;

/// Tick at which the script gates into LOCKED (never proceeds past it)
pub const GATE_TICK: u8 = 9;

/// Delay between script ticks (milliseconds)
pub const TICK_INTERVAL_MS: u64 = 800;

/// Pause on the gating tick before entering LOCKED (milliseconds)
pub const GATE_PAUSE_MS: u64 = 500;

/// Duration of the in-sequence prize count-up (milliseconds)
pub const PRIZE_COUNT_DURATION_MS: u64 = 2500;

/// Duration of the ambient bonus badge count animation (milliseconds)
pub const BADGE_COUNT_DURATION_MS: u64 = 2000;

/// Frame interval for counter animations (milliseconds)
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Probability of a COUNT cue per prize-count frame
pub const COUNT_CUE_PROBABILITY: f64 = 0.4;

// =============================================================================
// GATING DELAYS [C]
// =============================================================================

/// Manual verify: CHECKING → VERIFIED delay (milliseconds)
pub const MANUAL_VERIFY_DELAY_MS: u64 = 1500;

/// Focus recheck: CHECKING → LOCKED delay (milliseconds)
pub const RECHECK_DELAY_MS: u64 = 2500;

/// Grace delay before the hand-off fires after VERIFIED (milliseconds)
pub const HANDOFF_GRACE_MS: u64 = 1000;

/// Displayed progress while LOCKED, regardless of stored progress
pub const LOCKED_PROGRESS_PCT: u8 = 90;

// =============================================================================
// AMBIENT TICKER [C]
// =============================================================================

/// Scarcity/online timer period (milliseconds)
pub const SCARCITY_PERIOD_MS: u64 = 2000;

/// Ticker/bonus timer period (milliseconds)
pub const TICKER_PERIOD_MS: u64 = 3500;

/// Delay between hiding the ticker and revealing the next entry (milliseconds)
pub const TICKER_SWAP_MS: u64 = 500;

/// Probability of a slots-left decrement per scarcity tick
pub const SLOT_DECREMENT_PROBABILITY: f64 = 0.2;

/// Slots-left never falls below this
pub const SLOTS_FLOOR: u32 = 2;

/// Initial players-online count
pub const PLAYERS_ONLINE_INITIAL: i64 = 1429;

// =============================================================================
// BONUS WALK [C] - asymmetric tuning constants, preserved literally
// =============================================================================

/// Initial bonus pool target
pub const BONUS_INITIAL: i64 = 50_000;

/// Jitter per ticker tick is uniform in [BONUS_JITTER_MIN, BONUS_JITTER_MAX)
pub const BONUS_JITTER_MIN: i64 = -500;
pub const BONUS_JITTER_MAX: i64 = 1000;

/// Target above this resets to BONUS_CEILING_RESET
pub const BONUS_CEILING: i64 = 58_000;
pub const BONUS_CEILING_RESET: i64 = 50_000;

/// Target below this resets to BONUS_FLOOR_RESET
pub const BONUS_FLOOR: i64 = 42_000;
pub const BONUS_FLOOR_RESET: i64 = 45_000;

// =============================================================================
// INPUT LIMITS [C]
// =============================================================================

/// Identifier length ceiling (characters)
pub const IDENTIFIER_MAX_LEN: usize = 12;

/// Default server region (pass-through field)
pub const DEFAULT_REGION: &str = "NA_EAST";

// =============================================================================
// EXTERNAL COLLABORATORS
// =============================================================================

/// Fixed name the external locker trigger is registered under
pub const LOCKER_TRIGGER_NAME: &str = "_JF";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "2.4.1";
