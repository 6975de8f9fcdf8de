//! Funnel session: the async shell around the state machine
//!
//! Owns the shared state, the event broadcast, and every spawned task
//! (script driver, check resolutions, hand-off grace, animators, ambient
//! loops, focus watcher). All recurring work is aborted when the session
//! is dropped.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::core::animator::CounterAnimator;
use crate::core::engine::{FunnelState, SubmitOutcome};
use crate::core::generator::ActivityGenerator;
use crate::core::script::SCRIPT;
use crate::core::watcher::{FocusWatcher, HostSignal};
use crate::core::{ambient::AmbientTicker, audio, locker};
use crate::types::{AuthMode, CheckOrigin, CueKind, EngineEvent, FunnelStatus};
use crate::{
    BADGE_COUNT_DURATION_MS, COUNT_CUE_PROBABILITY, DEFAULT_REGION, GATE_PAUSE_MS,
    HANDOFF_GRACE_MS, MANUAL_VERIFY_DELAY_MS, PRIZE_COUNT_DURATION_MS, RECHECK_DELAY_MS,
    TICK_INTERVAL_MS,
};

/// Host callback fired with the identifier on funnel completion
pub type HandoffHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Session construction options
#[derive(Clone)]
pub struct SessionConfig {
    /// Pass-through entry-form tab (signup vs claim)
    pub mode: AuthMode,
    pub region: String,
    /// Deterministic RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Route cue events into the audio dispatcher
    pub audio: bool,
    /// Run the ambient ticker loops
    pub ambient: bool,
    pub handoff: Option<HandoffHook>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            region: DEFAULT_REGION.to_string(),
            seed: None,
            audio: false,
            ambient: true,
            handoff: None,
        }
    }
}

/// Poison-tolerant lock: the state is plain data, a panicked writer
/// leaves nothing half-transitioned worth dying over.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State shared between the session handle and its tasks
pub(crate) struct Shared {
    pub state: Mutex<FunnelState>,
    pub gen: Mutex<ActivityGenerator>,
    pub events: broadcast::Sender<EngineEvent>,
    pub audio: bool,
    pub handoff: Option<HandoffHook>,
    pub badge_anim: Mutex<CounterAnimator>,
    pub prize_anim: Mutex<CounterAnimator>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Shared {
    pub fn emit_one(&self, event: EngineEvent) {
        if self.audio {
            if let EngineEvent::Cue { kind } = &event {
                audio::play(*kind);
            }
        }
        // No receivers is fine; events are fire-and-forget
        let _ = self.events.send(event);
    }

    pub fn emit(&self, events: Vec<EngineEvent>) {
        for event in events {
            self.emit_one(event);
        }
    }

    pub fn track(&self, handle: JoinHandle<()>) {
        lock(&self.tasks).push(handle);
    }

    /// Fire the hand-off if the state machine allows it (at most once)
    pub fn fire_handoff(&self) {
        let event = lock(&self.state).fire_handoff();
        if let Some(event) = event {
            if let EngineEvent::Handoff { identifier } = &event {
                if let Some(hook) = &self.handoff {
                    hook(identifier);
                }
            }
            self.emit_one(event);
        }
    }

    fn abort_tasks(&self) {
        for task in lock(&self.tasks).drain(..) {
            task.abort();
        }
        lock(&self.badge_anim).cancel();
        lock(&self.prize_anim).cancel();
    }
}

/// One funnel attempt's engine plus its timers
pub struct FunnelSession {
    shared: Arc<Shared>,
    ambient: Option<AmbientTicker>,
    watcher: Option<FocusWatcher>,
}

impl FunnelSession {
    pub fn new(config: SessionConfig) -> Self {
        let mut gen = match config.seed {
            Some(seed) => ActivityGenerator::seeded(seed),
            None => ActivityGenerator::new(),
        };
        let state = FunnelState::new(config.mode, config.region, &mut gen);
        let (events, _) = broadcast::channel(256);

        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            gen: Mutex::new(gen),
            events,
            audio: config.audio,
            handoff: config.handoff,
            badge_anim: Mutex::new(CounterAnimator::new()),
            prize_anim: Mutex::new(CounterAnimator::new()),
            tasks: Mutex::new(Vec::new()),
        });

        let ambient = config.ambient.then(|| AmbientTicker::spawn(shared.clone()));

        Self {
            shared,
            ambient,
            watcher: None,
        }
    }

    /// Subscribe to the live event stream
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.shared.events.subscribe()
    }

    pub fn status(&self) -> FunnelStatus {
        lock(&self.shared.state).status()
    }

    /// Wire the host's focus-regained signal into the recheck watcher
    pub fn watch_focus(&mut self, signals: broadcast::Receiver<HostSignal>) {
        self.watcher = Some(FocusWatcher::spawn(self.shared.clone(), signals));
    }

    /// Submit an identifier. Starts the scripted sequence from IDLE,
    /// hands off immediately when already VERIFIED, otherwise no-op.
    pub fn submit(&self, identifier: &str) -> SubmitOutcome {
        if self.shared.audio {
            // First user gesture: the audio context may now start
            audio::init();
        }
        // Classify and begin under one guard so two racing submits can
        // never both start a script driver for the same attempt
        let (outcome, events) = {
            let mut state = lock(&self.shared.state);
            let outcome = state.submit(identifier);
            let events = match outcome {
                SubmitOutcome::Started => {
                    let mut gen = lock(&self.shared.gen);
                    state.begin_attempt(&mut gen)
                }
                _ => Vec::new(),
            };
            (outcome, events)
        };
        match outcome {
            SubmitOutcome::Started => {
                self.shared.emit(events);
                let shared = self.shared.clone();
                self.shared.track(tokio::spawn(run_script(shared)));
            }
            SubmitOutcome::HandoffNow => self.shared.fire_handoff(),
            SubmitOutcome::Rejected | SubmitOutcome::Ignored => {}
        }
        outcome
    }

    /// User self-reports offer completion. Accepted only while LOCKED.
    pub fn manual_verify(&self) -> bool {
        if self.shared.audio {
            audio::init();
        }
        let events = lock(&self.shared.state).begin_check(CheckOrigin::Manual);
        let Some(events) = events else {
            return false;
        };
        self.shared.emit(events);

        let shared = self.shared.clone();
        self.shared.track(tokio::spawn(async move {
            sleep(Duration::from_millis(MANUAL_VERIFY_DELAY_MS)).await;
            let events = lock(&shared.state).resolve_check();
            if let Some(events) = events {
                shared.emit(events);
            }
            sleep(Duration::from_millis(HANDOFF_GRACE_MS)).await;
            shared.fire_handoff();
        }));
        true
    }

    /// Host regained foreground focus. Re-announces while LOCKED, no-op
    /// in every other stage; never verifies on its own.
    pub fn focus_regained(&self) -> bool {
        trigger_recheck(&self.shared)
    }

    /// Abort every outstanding task
    pub fn shutdown(&self) {
        self.shared.abort_tasks();
    }
}

impl Drop for FunnelSession {
    fn drop(&mut self) {
        self.shutdown();
        // Ambient and watcher tasks abort in their own Drop impls
        self.ambient.take();
        self.watcher.take();
    }
}

/// Begin a recheck while LOCKED and schedule its fallback resolution.
/// Shared with the focus watcher.
pub(crate) fn trigger_recheck(shared: &Arc<Shared>) -> bool {
    let events = lock(&shared.state).begin_check(CheckOrigin::Recheck);
    let Some(events) = events else {
        return false;
    };
    shared.emit(events);

    let task_shared = shared.clone();
    shared.track(tokio::spawn(async move {
        sleep(Duration::from_millis(RECHECK_DELAY_MS)).await;
        let events = lock(&task_shared.state).resolve_check();
        if let Some(events) = events {
            task_shared.emit(events);
        }
    }));
    true
}

/// The processing script driver: executes the tick table in order,
/// gating into LOCKED at tick 9. Ticks past the gate never run. Each
/// tick's effects land first and the interval wait follows, so tick 1
/// fires as soon as the attempt starts.
async fn run_script(shared: Arc<Shared>) {
    for spec in SCRIPT.iter() {
        let events = {
            let mut state = lock(&shared.state);
            let mut gen = lock(&shared.gen);
            state.apply_tick(spec, &mut gen)
        };
        shared.emit(events);

        if spec.start_prize_count {
            start_prize_count(&shared);
        }

        if spec.gate {
            sleep(Duration::from_millis(GATE_PAUSE_MS)).await;
            let events = lock(&shared.state).enter_locked();
            shared.emit(events);
            locker::fire_locker_trigger();
            return;
        }

        sleep(Duration::from_millis(TICK_INTERVAL_MS)).await;
    }
}

/// Start the in-sequence prize count-up toward the live bonus target
fn start_prize_count(shared: &Arc<Shared>) {
    let end = lock(&shared.state).bonus().target;
    let frame_shared = shared.clone();
    let mut rng = SmallRng::from_entropy();
    lock(&shared.prize_anim).retarget(
        0,
        end,
        Duration::from_millis(PRIZE_COUNT_DURATION_MS),
        move |value, done| {
            lock(&frame_shared.state).set_prize_display(value);
            frame_shared.emit_one(EngineEvent::PrizeDisplay { value });
            if done {
                frame_shared.emit_one(EngineEvent::Cue { kind: CueKind::Coin });
            } else if rng.gen_bool(COUNT_CUE_PROBABILITY) {
                frame_shared.emit_one(EngineEvent::Cue { kind: CueKind::Count });
            }
        },
    );
}

/// Chase the bonus badge display toward a new target
pub(crate) fn retarget_badge(shared: &Arc<Shared>, target: i64) {
    let start = lock(&shared.state).bonus().displayed;
    let frame_shared = shared.clone();
    lock(&shared.badge_anim).retarget(
        start,
        target,
        Duration::from_millis(BADGE_COUNT_DURATION_MS),
        move |value, _done| {
            lock(&frame_shared.state).set_bonus_display(value);
            frame_shared.emit_one(EngineEvent::BonusDisplay { value });
        },
    );
}
