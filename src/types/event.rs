//! Engine events: the live update stream
//!
//! Everything the engine does is announced as an `EngineEvent` on the
//! session's broadcast channel. The WebSocket surface serializes these
//! verbatim; the CLI renders them; the audio dispatcher consumes the
//! `Cue` variants.

use serde::{Deserialize, Serialize};

use super::{ActivityEvent, Stage, StepStatus};

/// Audio cue kinds. Each is a short synthesized tone; the only contract
/// is that distinct kinds are audibly distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    Tick,
    Start,
    Coin,
    Success,
    Alert,
    Count,
}

impl std::fmt::Display for CueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CueKind::Tick => "tick",
            CueKind::Start => "start",
            CueKind::Coin => "coin",
            CueKind::Success => "success",
            CueKind::Alert => "alert",
            CueKind::Count => "count",
        };
        write!(f, "{}", name)
    }
}

/// Live update message broadcast by a funnel session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    StageChanged { stage: Stage },
    StepChanged { id: u8, status: StepStatus },
    LogLine { line: String },
    Progress { pct: u8 },
    Cue { kind: CueKind },
    /// Ambient bonus badge display value (animator frame)
    BonusDisplay { value: i64 },
    /// In-sequence prize reveal display value (animator frame)
    PrizeDisplay { value: i64 },
    /// The prize-allocation panel became visible
    PrizeRevealed,
    /// In-overlay activity record refreshed (even script ticks)
    ActivityRefreshed { activity: ActivityEvent },
    /// Top-of-page ticker hidden ahead of a swap
    TickerHidden,
    /// Top-of-page ticker swapped in a fresh record
    TickerChanged { activity: ActivityEvent },
    ScarcityChanged { slots_left: u32, players_online: i64 },
    /// Terminal hand-off to the host with the entered identifier
    Handoff { identifier: String },
}
