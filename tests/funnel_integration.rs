//! Integration tests for the scripted processing sequence
//!
//! Runs whole sessions under a paused tokio clock, so the 800ms tick
//! cadence and the 500ms gate pause elapse instantly and
//! deterministically.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use gate0::core::{FunnelSession, SessionConfig, SubmitOutcome};
use gate0::types::{CueKind, EngineEvent, Stage, StepStatus};
use gate0::{GATE_PAUSE_MS, GATE_TICK, TICK_INTERVAL_MS};

// Tick 1 fires at attempt start, so 8 inter-tick waits precede tick 9
const TIME_TO_LOCKED_MS: u64 = (GATE_TICK as u64 - 1) * TICK_INTERVAL_MS + GATE_PAUSE_MS;

fn quiet_config() -> SessionConfig {
    SessionConfig {
        seed: Some(7),
        audio: false,
        ambient: false,
        ..SessionConfig::default()
    }
}

/// Collect every broadcast event into a shared vec so the receiver
/// never lags behind the animators' frame streams.
fn collect_events(session: &FunnelSession) -> Arc<Mutex<Vec<EngineEvent>>> {
    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = collected.clone();
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            sink.lock().unwrap().push(event);
        }
    });
    collected
}

#[tokio::test(start_paused = true)]
async fn test_scripted_run_gates_into_locked() {
    let session = FunnelSession::new(quiet_config());
    assert_eq!(session.submit("Player1"), SubmitOutcome::Started);

    tokio::time::sleep(Duration::from_millis(TIME_TO_LOCKED_MS + 50)).await;

    let status = session.status();
    assert_eq!(status.stage, Stage::Locked);
    assert_eq!(status.identifier.as_deref(), Some("Player1"));
    assert_eq!(
        status.last_log.as_deref(),
        Some("> HUMAN VERIFICATION REQUIRED")
    );
    // Stored progress stops at tick 8; the rendered bar pins to 90
    assert_eq!(status.progress, 80);
    assert_eq!(status.display_progress, 90);

    for step in &status.steps[..4] {
        assert_eq!(step.status, StepStatus::Completed, "{}", step.label);
    }
    assert_eq!(status.steps[4].status, StepStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn test_first_tick_fires_at_attempt_start() {
    let session = FunnelSession::new(quiet_config());
    session.submit("Player1");

    // Before the first inter-tick wait has elapsed
    tokio::time::sleep(Duration::from_millis(1)).await;
    let status = session.status();
    assert_eq!(status.last_log.as_deref(), Some("> HANDSHAKE PROTOCOL..."));
    assert_eq!(status.steps[0].status, StepStatus::Active);
    assert_eq!(status.progress, 10);

    // Tick 2 waits out the full interval
    tokio::time::sleep(Duration::from_millis(TICK_INTERVAL_MS - 100)).await;
    assert_eq!(session.status().progress, 10);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(session.status().progress, 20);
}

#[tokio::test(start_paused = true)]
async fn test_event_stream_orders_stages() {
    let session = FunnelSession::new(quiet_config());
    let events = collect_events(&session);
    session.submit("Player1");

    tokio::time::sleep(Duration::from_millis(TIME_TO_LOCKED_MS + 50)).await;

    let events = events.lock().unwrap();
    assert!(matches!(
        events[0],
        EngineEvent::Cue { kind: CueKind::Start }
    ));
    assert!(matches!(
        events[1],
        EngineEvent::StageChanged { stage: Stage::Processing }
    ));

    let stages: Vec<Stage> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::StageChanged { stage } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(stages, vec![Stage::Processing, Stage::Locked]);

    // Progress never exceeds the tick-8 checkpoint during the script
    let max_pct = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::Progress { pct } => Some(*pct),
            _ => None,
        })
        .max();
    assert_eq!(max_pct, Some(80));
}

#[tokio::test(start_paused = true)]
async fn test_prize_reveal_and_count_up() {
    let session = FunnelSession::new(quiet_config());
    let events = collect_events(&session);
    session.submit("Player1");

    tokio::time::sleep(Duration::from_millis(TIME_TO_LOCKED_MS + 50)).await;

    let events = events.lock().unwrap();
    assert!(events.iter().any(|e| matches!(e, EngineEvent::PrizeRevealed)));

    // The count-up lands exactly on the live bonus target
    let last_prize = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::PrizeDisplay { value } => Some(*value),
            _ => None,
        })
        .last();
    assert_eq!(last_prize, Some(session.status().bonus_target));
    assert_eq!(session.status().allocated_prize, session.status().bonus_target);
    assert!(session.status().prize_visible);

    // The landing frame rings the coin cue
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::Cue { kind: CueKind::Coin })));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_past_the_gate_never_run() {
    let session = FunnelSession::new(quiet_config());
    session.submit("Player1");

    // Far past where tick 10 would have landed
    tokio::time::sleep(Duration::from_millis(TICK_INTERVAL_MS * 20)).await;

    let status = session.status();
    assert_eq!(status.stage, Stage::Locked);
    assert_eq!(status.progress, 80, "tick 10 must never apply");
}

#[tokio::test(start_paused = true)]
async fn test_rejected_identifiers_block_silently() {
    let session = FunnelSession::new(quiet_config());
    let events = collect_events(&session);

    assert_eq!(session.submit(""), SubmitOutcome::Rejected);
    assert_eq!(session.submit("   "), SubmitOutcome::Rejected);
    assert_eq!(session.submit("ThisNameIsWayTooLong"), SubmitOutcome::Rejected);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(session.status().stage, Stage::Idle);
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_double_submit_starts_exactly_one_script() {
    let session = FunnelSession::new(quiet_config());
    let events = collect_events(&session);

    // No await between the two submits: only one may start the attempt
    assert_eq!(session.submit("Player1"), SubmitOutcome::Started);
    assert_eq!(session.submit("Player2"), SubmitOutcome::Ignored);

    tokio::time::sleep(Duration::from_millis(TIME_TO_LOCKED_MS + 50)).await;
    assert_eq!(session.status().identifier.as_deref(), Some("Player1"));

    // One script driver: no duplicated stage changes or tick log lines
    let events = events.lock().unwrap();
    let processing_entries = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::StageChanged { stage: Stage::Processing }))
        .count();
    assert_eq!(processing_entries, 1);
    let handshake_lines = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::LogLine { line } if line == "> HANDSHAKE PROTOCOL..."))
        .count();
    assert_eq!(handshake_lines, 1);
}

#[tokio::test(start_paused = true)]
async fn test_resubmission_mid_script_is_ignored() {
    let session = FunnelSession::new(quiet_config());
    assert_eq!(session.submit("Player1"), SubmitOutcome::Started);

    tokio::time::sleep(Duration::from_millis(TICK_INTERVAL_MS * 3)).await;
    assert_eq!(session.submit("Player2"), SubmitOutcome::Ignored);

    tokio::time::sleep(Duration::from_millis(TIME_TO_LOCKED_MS)).await;
    // The original identifier rides the attempt to the end
    assert_eq!(session.status().identifier.as_deref(), Some("Player1"));
}
