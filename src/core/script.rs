//! The processing script table
//!
//! The scripted sequence is an explicit table: tick index → step
//! transitions, log line, side effects. The driver executes entries in
//! order with a fixed cadence. Tick 9 gates into LOCKED and the driver
//! returns; tick 10 exists in the table but is unreachable by design —
//! gating is the terminal edge of the script, not a fallthrough.

use crate::{GATE_TICK, SCRIPT_TICK_COUNT};

// Process-log lines, verbatim
pub const LOG_INIT: &str = "> INITIALIZING SECURE CONNECTION...";
pub const LOG_HANDSHAKE: &str = "> HANDSHAKE PROTOCOL...";
pub const LOG_ALLOCATING: &str = "> ALLOCATING RESOURCES...";
pub const LOG_ENCRYPTING: &str = "> ENCRYPTING TUNNEL...";
pub const LOG_ELIGIBILITY: &str = "> CALCULATING ELIGIBILITY...";
pub const LOG_MAXIMIZING: &str = "> MAXIMIZING BONUS...";
pub const LOG_FINAL_CHECK: &str = "> FINAL SECURITY CHECK...";
pub const LOG_LOCKED: &str = "> HUMAN VERIFICATION REQUIRED";
pub const LOG_RECHECK_BEGIN: &str = "> DETECTED RETURN. CHECKING STATUS...";
pub const LOG_RECHECK_WAIT: &str = "> WAITING FOR COMPLETION...";
pub const LOG_VERIFY_BEGIN: &str = "> VERIFYING OFFER COMPLETION...";
pub const LOG_VERIFIED: &str = "> VERIFICATION SUCCESSFUL";
pub const LOG_UNLOCKING: &str = "> UNLOCKING ASSETS...";

/// One entry of the processing script
#[derive(Debug, Clone, Copy)]
pub struct TickSpec {
    /// 1-based tick index
    pub tick: u8,
    /// Step to mark completed before activation
    pub complete_step: Option<u8>,
    /// Step to mark active
    pub activate_step: Option<u8>,
    /// Log line appended this tick
    pub log: Option<&'static str>,
    /// Reveal the prize-allocation panel
    pub reveal_prize: bool,
    /// Begin the in-sequence prize count-up (driver side effect)
    pub start_prize_count: bool,
    /// Log the "reserving N coins" line with the live bonus target
    pub reserve_log: bool,
    /// Gate into LOCKED; the script never proceeds past this tick
    pub gate: bool,
}

impl TickSpec {
    /// Even ticks refresh the in-overlay activity record
    pub fn refreshes_activity(&self) -> bool {
        self.tick % 2 == 0 && !self.gate
    }
}

const fn tick(index: u8) -> TickSpec {
    TickSpec {
        tick: index,
        complete_step: None,
        activate_step: None,
        log: None,
        reveal_prize: false,
        start_prize_count: false,
        reserve_log: false,
        gate: false,
    }
}

/// The full script. Entries past GATE_TICK are unreachable.
pub const SCRIPT: [TickSpec; SCRIPT_TICK_COUNT as usize] = [
    TickSpec { activate_step: Some(1), log: Some(LOG_HANDSHAKE), ..tick(1) },
    TickSpec { complete_step: Some(1), activate_step: Some(2), log: Some(LOG_ALLOCATING), ..tick(2) },
    TickSpec { complete_step: Some(2), activate_step: Some(3), log: Some(LOG_ENCRYPTING), ..tick(3) },
    TickSpec {
        complete_step: Some(3),
        activate_step: Some(4),
        log: Some(LOG_ELIGIBILITY),
        reveal_prize: true,
        ..tick(4)
    },
    TickSpec { log: Some(LOG_MAXIMIZING), start_prize_count: true, ..tick(5) },
    tick(6),
    TickSpec { complete_step: Some(4), activate_step: Some(5), ..tick(7) },
    TickSpec { reserve_log: true, ..tick(8) },
    TickSpec { log: Some(LOG_FINAL_CHECK), gate: true, ..tick(GATE_TICK) },
    tick(10),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_indexed_in_order() {
        for (i, spec) in SCRIPT.iter().enumerate() {
            assert_eq!(spec.tick as usize, i + 1);
        }
    }

    #[test]
    fn test_gate_is_tick_nine_and_final_reachable_entry() {
        let gates: Vec<u8> = SCRIPT.iter().filter(|s| s.gate).map(|s| s.tick).collect();
        assert_eq!(gates, vec![GATE_TICK]);
        // Everything past the gate carries no effects
        for spec in SCRIPT.iter().filter(|s| s.tick > GATE_TICK) {
            assert!(spec.log.is_none());
            assert!(spec.complete_step.is_none());
            assert!(spec.activate_step.is_none());
        }
    }

    #[test]
    fn test_even_ticks_refresh_activity() {
        let refreshing: Vec<u8> = SCRIPT
            .iter()
            .filter(|s| s.refreshes_activity() && s.tick < GATE_TICK)
            .map(|s| s.tick)
            .collect();
        assert_eq!(refreshing, vec![2, 4, 6, 8]);
    }

    #[test]
    fn test_steps_activate_in_order() {
        let activations: Vec<u8> = SCRIPT.iter().filter_map(|s| s.activate_step).collect();
        assert_eq!(activations, vec![1, 2, 3, 4, 5]);
    }
}
