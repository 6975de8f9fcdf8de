//! Bonus pool counter
//!
//! The target is the "true" pool total; the displayed value chases it
//! through the counter animator. The target performs a bounded,
//! mean-reverting random walk: jitter then clamp-with-reset.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    BONUS_CEILING, BONUS_CEILING_RESET, BONUS_FLOOR, BONUS_FLOOR_RESET, BONUS_INITIAL,
    BONUS_JITTER_MAX, BONUS_JITTER_MIN,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BonusCounter {
    /// The "true" pool total the display trends toward
    pub target: i64,
    /// Currently displayed value
    pub displayed: i64,
}

impl Default for BonusCounter {
    fn default() -> Self {
        Self {
            target: BONUS_INITIAL,
            displayed: BONUS_INITIAL,
        }
    }
}

impl BonusCounter {
    /// Apply one ambient jitter step to the target and clamp.
    ///
    /// The clamp bounds and reset values are asymmetric tuning constants;
    /// they are preserved literally.
    pub fn apply_jitter<R: Rng>(&mut self, rng: &mut R) -> i64 {
        let volatility = rng.gen_range(BONUS_JITTER_MIN..BONUS_JITTER_MAX);
        let mut next = self.target + volatility;
        if next > BONUS_CEILING {
            next = BONUS_CEILING_RESET;
        }
        if next < BONUS_FLOOR {
            next = BONUS_FLOOR_RESET;
        }
        self.target = next;
        next
    }
}

/// Format a coin amount with thousands separators (1429 → "1,429")
pub fn format_coins(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}
