//! Funnel state machine
//!
//! State transitions:
//! - IDLE → PROCESSING: non-empty identifier submitted
//! - PROCESSING → LOCKED: script gates at tick 9 (tick 10 unreachable)
//! - LOCKED → CHECKING(manual) → VERIFIED: user self-reports completion
//! - LOCKED → CHECKING(recheck) → LOCKED: focus regained, re-announce only
//! - VERIFIED → hand-off (terminal)
//!
//! `FunnelState` is the synchronous core: every transition method mutates
//! the state and returns the events to broadcast. Timing, task spawning
//! and cue playback live in the session shell.

use rand::Rng;

use crate::core::generator::ActivityGenerator;
use crate::core::script::{
    TickSpec, LOG_INIT, LOG_LOCKED, LOG_RECHECK_BEGIN, LOG_RECHECK_WAIT, LOG_UNLOCKING,
    LOG_VERIFIED, LOG_VERIFY_BEGIN,
};
use crate::types::{
    format_coins, AuthMode, BonusCounter, CheckOrigin, CueKind, EngineEvent, FunnelStatus,
    ProcessLog, Stage, StepList, StepStatus,
};
use crate::{IDENTIFIER_MAX_LEN, LOCKED_PROGRESS_PCT, PLAYERS_ONLINE_INITIAL, SLOTS_FLOOR};

/// What a submission did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Attempt started, the scripted sequence should run
    Started,
    /// Already verified: hand off immediately, do not restart
    HandoffNow,
    /// Empty or over-length identifier; blocked silently
    Rejected,
    /// Submission while mid-funnel; no transition
    Ignored,
}

#[derive(Debug)]
pub struct FunnelState {
    stage: Stage,
    identifier: Option<String>,
    mode: AuthMode,
    region: String,
    steps: StepList,
    log: ProcessLog,
    progress: u8,
    bonus: BonusCounter,
    allocated_prize: i64,
    prize_visible: bool,
    slots_left: u32,
    players_online: i64,
    activity: crate::types::ActivityEvent,
    ticker: crate::types::ActivityEvent,
    ticker_visible: bool,
    handoff_fired: bool,
}

impl FunnelState {
    pub fn new(mode: AuthMode, region: impl Into<String>, gen: &mut ActivityGenerator) -> Self {
        let activity = gen.generate();
        let ticker = gen.generate();
        let slots_left = gen.rng().gen_range(3..=17);
        Self {
            stage: Stage::Idle,
            identifier: None,
            mode,
            region: region.into(),
            steps: StepList::new(),
            log: ProcessLog::new(),
            progress: 0,
            bonus: BonusCounter::default(),
            allocated_prize: 0,
            prize_visible: false,
            slots_left,
            players_online: PLAYERS_ONLINE_INITIAL,
            activity,
            ticker,
            ticker_visible: true,
            handoff_fired: false,
        }
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    /// Validate and classify a submission. An empty identifier blocks
    /// silently; an over-length one is treated the same way. A started
    /// submission leaves IDLE here, in the same call, so a second
    /// submission can never also start the attempt.
    pub fn submit(&mut self, identifier: &str) -> SubmitOutcome {
        let identifier = identifier.trim();
        if identifier.is_empty() || identifier.chars().count() > IDENTIFIER_MAX_LEN {
            return SubmitOutcome::Rejected;
        }
        match self.stage {
            Stage::Verified => SubmitOutcome::HandoffNow,
            Stage::Idle => {
                self.identifier = Some(identifier.to_string());
                self.stage = Stage::Processing;
                SubmitOutcome::Started
            }
            _ => SubmitOutcome::Ignored,
        }
    }

    /// Reset per-attempt state for the attempt `submit` just started
    pub fn begin_attempt(&mut self, gen: &mut ActivityGenerator) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.stage = Stage::Processing;
        self.progress = 0;
        self.prize_visible = false;
        self.allocated_prize = 0;
        self.handoff_fired = false;
        self.steps.reset();
        self.log.restart(LOG_INIT);
        self.activity = gen.generate();

        events.push(EngineEvent::Cue { kind: CueKind::Start });
        events.push(EngineEvent::StageChanged { stage: self.stage });
        events.push(EngineEvent::Progress { pct: 0 });
        events.push(EngineEvent::LogLine { line: LOG_INIT.to_string() });
        events.push(EngineEvent::ActivityRefreshed { activity: self.activity.clone() });
        events
    }

    // =========================================================================
    // SCRIPT TICKS
    // =========================================================================

    /// Apply one script tick. The driver handles the cadence, the gating
    /// pause and the prize-count side effect.
    pub fn apply_tick(&mut self, spec: &TickSpec, gen: &mut ActivityGenerator) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if let Some(id) = spec.complete_step {
            if self.steps.set_status(id, StepStatus::Completed) {
                events.push(EngineEvent::StepChanged { id, status: StepStatus::Completed });
            }
        }
        if let Some(id) = spec.activate_step {
            if self.steps.set_status(id, StepStatus::Active) {
                events.push(EngineEvent::StepChanged { id, status: StepStatus::Active });
            }
        }
        if let Some(line) = spec.log {
            self.log.push(line);
            events.push(EngineEvent::LogLine { line: line.to_string() });
        }
        if spec.reveal_prize {
            self.prize_visible = true;
            events.push(EngineEvent::PrizeRevealed);
        }
        if spec.reserve_log {
            let line = format!("> RESERVING {} COINS...", format_coins(self.bonus.target));
            self.log.push(line.clone());
            events.push(EngineEvent::LogLine { line });
        }

        // The gating tick neither advances progress nor ticks
        if spec.gate {
            return events;
        }

        if spec.refreshes_activity() {
            self.activity = gen.generate();
            events.push(EngineEvent::ActivityRefreshed { activity: self.activity.clone() });
        }
        self.progress = spec.tick * 10;
        events.push(EngineEvent::Progress { pct: self.progress });
        events.push(EngineEvent::Cue { kind: CueKind::Tick });
        events
    }

    /// Enter LOCKED at the gate. The caller fires the external trigger.
    pub fn enter_locked(&mut self) -> Vec<EngineEvent> {
        self.stage = Stage::Locked;
        self.log.push(LOG_LOCKED);
        vec![
            EngineEvent::StageChanged { stage: self.stage },
            EngineEvent::LogLine { line: LOG_LOCKED.to_string() },
            EngineEvent::Cue { kind: CueKind::Alert },
        ]
    }

    // =========================================================================
    // GATING
    // =========================================================================

    /// LOCKED → CHECKING with the given origin. None if not LOCKED.
    pub fn begin_check(&mut self, origin: CheckOrigin) -> Option<Vec<EngineEvent>> {
        if self.stage != Stage::Locked {
            return None;
        }
        self.stage = Stage::Checking { origin };
        let line = match origin {
            CheckOrigin::Manual => LOG_VERIFY_BEGIN,
            CheckOrigin::Recheck => LOG_RECHECK_BEGIN,
        };
        self.log.push(line);
        Some(vec![
            EngineEvent::StageChanged { stage: self.stage },
            EngineEvent::LogLine { line: line.to_string() },
            EngineEvent::Cue { kind: CueKind::Tick },
        ])
    }

    /// Resolve the pending check: manual promotes to VERIFIED, a recheck
    /// always falls back to LOCKED. None if not CHECKING.
    pub fn resolve_check(&mut self) -> Option<Vec<EngineEvent>> {
        let origin = match self.stage {
            Stage::Checking { origin } => origin,
            _ => return None,
        };
        let mut events = Vec::new();
        match origin {
            CheckOrigin::Manual => {
                self.stage = Stage::Verified;
                events.push(EngineEvent::StageChanged { stage: self.stage });
                if self.steps.set_status(5, StepStatus::Completed) {
                    events.push(EngineEvent::StepChanged { id: 5, status: StepStatus::Completed });
                }
                events.push(EngineEvent::Cue { kind: CueKind::Success });
                for line in [LOG_VERIFIED, LOG_UNLOCKING] {
                    self.log.push(line);
                    events.push(EngineEvent::LogLine { line: line.to_string() });
                }
                self.progress = 100;
                events.push(EngineEvent::Progress { pct: 100 });
            }
            CheckOrigin::Recheck => {
                self.stage = Stage::Locked;
                events.push(EngineEvent::StageChanged { stage: self.stage });
                self.log.push(LOG_RECHECK_WAIT);
                events.push(EngineEvent::LogLine { line: LOG_RECHECK_WAIT.to_string() });
                events.push(EngineEvent::Cue { kind: CueKind::Alert });
            }
        }
        Some(events)
    }

    /// Hand off to the host. At most once per attempt; None if already
    /// fired, not verified, or no identifier was captured.
    pub fn fire_handoff(&mut self) -> Option<EngineEvent> {
        if self.stage != Stage::Verified || self.handoff_fired {
            return None;
        }
        let identifier = self.identifier.clone()?;
        self.handoff_fired = true;
        Some(EngineEvent::Handoff { identifier })
    }

    // =========================================================================
    // AMBIENT MUTATION
    // =========================================================================

    /// One scarcity/online tick: decrement slots with p = 0.2 floored at
    /// 2, jitter players online.
    pub fn scarcity_tick<R: Rng>(&mut self, rng: &mut R) -> EngineEvent {
        if rng.gen_bool(crate::SLOT_DECREMENT_PROBABILITY) {
            self.slots_left = self.slots_left.saturating_sub(1).max(SLOTS_FLOOR);
        }
        let delta: i64 = if rng.gen_bool(0.5) {
            rng.gen_range(0..5)
        } else {
            -rng.gen_range(0..3)
        };
        self.players_online += delta;
        EngineEvent::ScarcityChanged {
            slots_left: self.slots_left,
            players_online: self.players_online,
        }
    }

    /// Hide the ticker ahead of a swap
    pub fn ticker_hide(&mut self) -> EngineEvent {
        self.ticker_visible = false;
        EngineEvent::TickerHidden
    }

    /// Swap in a fresh ticker record and jitter the bonus target.
    /// Returns the events plus the new target for the badge animator.
    pub fn ticker_swap(&mut self, gen: &mut ActivityGenerator) -> (Vec<EngineEvent>, i64) {
        self.ticker = gen.generate();
        self.ticker_visible = true;
        let target = self.bonus.apply_jitter(gen.rng());
        let events = vec![EngineEvent::TickerChanged { activity: self.ticker.clone() }];
        (events, target)
    }

    // =========================================================================
    // ANIMATOR WRITE-BACKS
    // =========================================================================

    pub fn set_bonus_display(&mut self, value: i64) {
        self.bonus.displayed = value;
    }

    pub fn set_prize_display(&mut self, value: i64) {
        self.allocated_prize = value;
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn bonus(&self) -> BonusCounter {
        self.bonus
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }

    pub fn log(&self) -> &ProcessLog {
        &self.log
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Progress as rendered: pinned to 90 while LOCKED
    pub fn display_progress(&self) -> u8 {
        if self.stage == Stage::Locked {
            LOCKED_PROGRESS_PCT
        } else {
            self.progress
        }
    }

    pub fn status(&self) -> FunnelStatus {
        FunnelStatus {
            stage: self.stage,
            progress: self.progress,
            display_progress: self.display_progress(),
            steps: self.steps.steps().to_vec(),
            last_log: self.log.last().map(str::to_string),
            bonus_target: self.bonus.target,
            bonus_displayed: self.bonus.displayed,
            allocated_prize: self.allocated_prize,
            prize_visible: self.prize_visible,
            slots_left: self.slots_left,
            players_online: self.players_online,
            ticker: self.ticker.clone(),
            ticker_visible: self.ticker_visible,
            activity: self.activity.clone(),
            identifier: self.identifier.clone(),
            mode: self.mode,
            region: self.region.clone(),
        }
    }
}
