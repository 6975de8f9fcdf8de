//! Funnel stage definitions

use serde::{Deserialize, Serialize};

/// The five possible stages of a funnel attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Waiting for an identifier
    Idle,
    /// Scripted processing sequence is running
    Processing,
    /// Gated behind external verification, pending self-report
    Locked,
    /// Transient check; origin decides where it resolves
    Checking { origin: CheckOrigin },
    /// Verification declared complete, hand-off pending or done
    Verified,
}

/// Why a CHECKING stage was entered.
///
/// Manual resolves to VERIFIED; Recheck always resolves back to LOCKED
/// (a recheck can never promote on its own).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckOrigin {
    /// User pressed "I have completed the offer"
    Manual,
    /// Application focus was regained while LOCKED
    Recheck,
}

impl Stage {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Stage::Idle => "\x1b[90m",          // Gray
            Stage::Processing => "\x1b[36m",    // Cyan
            Stage::Locked => "\x1b[31m",        // Red
            Stage::Checking { .. } => "\x1b[33m", // Yellow
            Stage::Verified => "\x1b[32m",      // Green
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for stage
    pub fn emoji(&self) -> &'static str {
        match self {
            Stage::Idle => "⏳",
            Stage::Processing => "⚙",
            Stage::Locked => "🔒",
            Stage::Checking { .. } => "🔎",
            Stage::Verified => "✅",
        }
    }

    /// True while the user is gated (LOCKED or either CHECKING origin)
    pub fn is_gated(&self) -> bool {
        matches!(self, Stage::Locked | Stage::Checking { .. })
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Both checking origins share one visible label
        let name = match self {
            Stage::Idle => "IDLE",
            Stage::Processing => "PROCESSING",
            Stage::Locked => "LOCKED",
            Stage::Checking { .. } => "CHECKING",
            Stage::Verified => "VERIFIED",
        };
        write!(f, "{}", name)
    }
}
