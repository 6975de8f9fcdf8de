//! Synthetic activity records and their fixed vocabularies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name prefixes for procedurally composed actor names
pub const NAME_PREFIXES: [&str; 21] = [
    "Dragon", "Lucky", "Fire", "Super", "Mega", "Gold", "Fish", "King",
    "Master", "Slot", "Vegas", "Royal", "Star", "Moon", "Sun", "Cyber",
    "Neon", "Rich", "Big", "Wild", "Hot",
];

/// Name suffixes
pub const NAME_SUFFIXES: [&str; 16] = [
    "Slayer", "Winner", "777", "88", "99", "King", "Boy", "Girl", "Pro",
    "X", "Hunter", "Master", "Boss", "Gamer", "Whale", "Pot",
];

/// Action verbs
pub const ACTIONS: [&str; 6] = ["Claimed", "Just Won", "Hit", "Withdrew", "Verified", "Unlocked"];

/// Fixed prize table: label + display-color tag
pub const PRIZES: [(&str, PrizeColor); 9] = [
    ("5,000 COINS", PrizeColor::Yellow),
    ("MINI JACKPOT", PrizeColor::Red),
    ("INSTANT ACCESS", PrizeColor::Green),
    ("$450.00 CASH", PrizeColor::Green),
    ("WELCOME BONUS", PrizeColor::Yellow),
    ("x500 MULTIPLIER", PrizeColor::Purple),
    ("12,500 COINS", PrizeColor::Yellow),
    ("HUGE WIN", PrizeColor::Orange),
    ("VIP STATUS", PrizeColor::Purple),
];

/// Display-color tag carried by a prize (opaque to the engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrizeColor {
    Yellow,
    Red,
    Green,
    Purple,
    Orange,
}

impl PrizeColor {
    /// ANSI code for terminal rendering
    pub fn color_code(&self) -> &'static str {
        match self {
            PrizeColor::Yellow => "\x1b[33m",
            PrizeColor::Red => "\x1b[31m",
            PrizeColor::Green => "\x1b[32m",
            PrizeColor::Purple => "\x1b[35m",
            PrizeColor::Orange => "\x1b[38;5;208m",
        }
    }
}

/// One synthetic activity record. Immutable once generated; a newer
/// record supersedes it, nothing mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Composed actor name (prefix + suffix + number)
    pub user: String,
    pub action: String,
    pub prize: String,
    pub color: PrizeColor,
    pub at: DateTime<Utc>,
}

impl std::fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.user, self.action, self.prize)
    }
}
