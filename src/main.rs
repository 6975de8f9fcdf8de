//! gate0 CLI
//!
//! Usage:
//!   gate0                                   # Interactive session
//!   gate0 --run Player1                     # One-shot scripted run
//!   gate0 --serve                           # HTTP API server
//!   gate0 --run Player1 --json              # JSON event output
//!
//! Interactive commands: type an identifier to submit it, then
//! `verify`, `focus`, `status`, or `quit`.

use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use gate0::core::{
    register_trigger, run_server, FunnelSession, HostSignal, SessionConfig, SubmitOutcome,
};
use gate0::types::{AuthMode, EngineEvent, Stage};
use gate0::{DEFAULT_REGION, LOCKER_TRIGGER_NAME, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "gate0",
    version = VERSION,
    about = "gate0 - Scripted verification-funnel engine",
    long_about = "gate0 runs the scripted casino-funnel sequence: an identifier\n\
                  is submitted, a ten-tick processing script plays out, and the\n\
                  attempt gates into LOCKED pending external verification.\n\n\
                  Modes:\n  \
                  (default)  Interactive session on stdin\n  \
                  --run ID   One-shot scripted run for the given identifier\n  \
                  --serve    HTTP API server mode\n\n\
                  Stages:\n  \
                  IDLE        - Waiting for an identifier\n  \
                  PROCESSING  - Scripted sequence running\n  \
                  LOCKED      - Gated behind verification\n  \
                  CHECKING    - Verification claim being checked\n  \
                  VERIFIED    - Complete, hand-off fired"
)]
struct Args {
    /// One-shot run for this identifier (submit, verify at the gate, hand off)
    #[arg(short, long)]
    run: Option<String>,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output engine events as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Disable audio cues
    #[arg(long)]
    mute: bool,

    /// Deterministic RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Region label shown in status output
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Claim an existing identifier instead of creating one
    #[arg(long)]
    claim: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if args.serve {
        run_serve(&args).await;
    } else if let Some(ref identifier) = args.run {
        run_once(identifier, &args).await;
    } else {
        run_interactive(&args).await;
    }
}

fn session_config(args: &Args) -> SessionConfig {
    SessionConfig {
        mode: if args.claim {
            AuthMode::Claim
        } else {
            AuthMode::Signup
        },
        region: args.region.clone(),
        seed: args.seed,
        audio: !args.mute,
        ambient: true,
        handoff: Some(Arc::new(|identifier: &str| {
            println!(
                "\x1b[32m  ✓ HAND-OFF: {} forwarded to partner flow\x1b[0m",
                identifier
            );
        })),
    }
}

/// Print one engine event the way the session surface would render it
fn print_event(event: &EngineEvent, json: bool, no_color: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{}", line);
        }
        return;
    }
    let dim = if no_color { "" } else { "\x1b[90m" };
    let reset = if no_color { "" } else { Stage::color_reset() };
    match event {
        EngineEvent::StageChanged { stage } => {
            let color = if no_color { "" } else { stage.color_code() };
            println!("{}{} [{}]{}", color, stage.emoji(), stage, reset);
        }
        EngineEvent::LogLine { line } => println!("{}{}{}", dim, line, reset),
        EngineEvent::Progress { pct } => println!("{}  progress {}%{}", dim, pct, reset),
        EngineEvent::StepChanged { id, status } => {
            println!("{}  step {} -> {:?}{}", dim, id, status, reset)
        }
        EngineEvent::PrizeRevealed => println!("{}  prize allocation revealed{}", dim, reset),
        EngineEvent::Handoff { identifier } => {
            println!("  → hand-off for {}", identifier)
        }
        EngineEvent::ScarcityChanged {
            slots_left,
            players_online,
        } => println!(
            "{}  {} slots left | {} online{}",
            dim, slots_left, players_online, reset
        ),
        // High-frequency animation frames and ticker churn stay quiet
        EngineEvent::BonusDisplay { .. }
        | EngineEvent::PrizeDisplay { .. }
        | EngineEvent::Cue { .. }
        | EngineEvent::TickerHidden
        | EngineEvent::TickerChanged { .. }
        | EngineEvent::ActivityRefreshed { .. } => {}
    }
}

/// Run the interactive session loop
async fn run_interactive(args: &Args) {
    print_header(args.no_color);
    println!("Type an identifier to begin. Commands: verify, focus, status, quit.");
    println!();

    let (focus_tx, focus_rx) = broadcast::channel(8);
    let mut session = FunnelSession::new(session_config(args));
    session.watch_focus(focus_rx);

    register_trigger(
        LOCKER_TRIGGER_NAME,
        Arc::new(|| {
            println!("\x1b[33m  ⚠ external locker opened — complete an offer to unlock\x1b[0m");
        }),
    );

    let mut events = session.subscribe();
    let json = args.json;
    let no_color = args.no_color;
    // Keep the handle alive; the task ends with the process
    let _printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event, json, no_color),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        match line.to_ascii_lowercase().as_str() {
            "verify" => {
                if !session.manual_verify() {
                    println!("  (verify is only available while LOCKED)");
                }
            }
            "focus" => {
                let _ = focus_tx.send(HostSignal::FocusRegained);
            }
            "status" => {
                let status = session.status();
                if args.json {
                    if let Ok(line) = serde_json::to_string(&status) {
                        println!("{}", line);
                    }
                } else if args.no_color {
                    println!("{}", status.to_parseable_string());
                } else {
                    println!("{}", status.to_terminal_string());
                }
            }
            _ => match session.submit(line) {
                SubmitOutcome::Started => {}
                SubmitOutcome::HandoffNow => {}
                SubmitOutcome::Rejected => {
                    println!("  {}", "✗ identifier must be 1-12 characters".red())
                }
                SubmitOutcome::Ignored => {
                    println!("  {}", "(an attempt is already in progress)".dimmed())
                }
            },
        }
    }

    println!("\nSession ended. Final: {}", session.status().to_parseable_string());
}

/// One-shot scripted run: submit, ride the script to LOCKED, verify,
/// wait out the grace delay, exit after the hand-off.
async fn run_once(identifier: &str, args: &Args) {
    let session = FunnelSession::new(session_config(args));
    let mut events = session.subscribe();

    match session.submit(identifier) {
        SubmitOutcome::Started => {}
        SubmitOutcome::Rejected => {
            eprintln!("identifier must be 1-12 characters");
            std::process::exit(2);
        }
        SubmitOutcome::HandoffNow | SubmitOutcome::Ignored => unreachable!("fresh session"),
    }

    loop {
        match events.recv().await {
            Ok(event) => {
                print_event(&event, args.json, args.no_color);
                match event {
                    EngineEvent::StageChanged { stage: Stage::Locked } => {
                        // First LOCKED entry comes from the script gate
                        session.manual_verify();
                    }
                    EngineEvent::Handoff { .. } => break,
                    _ => {}
                }
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_header(no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  gate0 v{}", VERSION);
        println!("========================================");
    } else {
        println!("\x1b[1m╔══════════════════════════════════════╗\x1b[0m");
        println!("\x1b[1m║  🎰 gate0 v{}                      ║\x1b[0m", VERSION);
        println!("\x1b[1m╚══════════════════════════════════════╝\x1b[0m");
    }
    println!();
}

/// Run HTTP API server
async fn run_serve(args: &Args) {
    println!();
    println!("╔════════════════════════════════════════╗");
    println!("║  🎰 gate0 API Server                   ║");
    println!("║  Version: {}                        ║", VERSION);
    println!("╚════════════════════════════════════════╝");
    println!();

    if let Err(e) = run_server(&args.addr).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
