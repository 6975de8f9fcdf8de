//! Audio cue dispatcher
//!
//! A process-wide, lazily started audio thread owning the output stream,
//! fed cue kinds over a channel. `init` is the user-gesture analog: until
//! it has been called (and succeeded), `play` is a silent no-op. Failure
//! to open an output device is swallowed with a diagnostic and leaves the
//! dispatcher permanently silent; nothing here ever blocks the caller.

use std::sync::mpsc;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use rodio::{OutputStream, Sink, Source};

use crate::types::CueKind;

static DISPATCH: OnceLock<Option<mpsc::Sender<CueKind>>> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum AudioInitError {
    #[error("audio thread failed to start: {0}")]
    Thread(#[from] std::io::Error),
    #[error("no audio output available: {0}")]
    Output(String),
}

/// Idempotent initializer; call on first user interaction.
/// Returns whether the dispatcher ended up ready.
pub fn init() -> bool {
    DISPATCH
        .get_or_init(|| match spawn_output_thread() {
            Ok(tx) => Some(tx),
            Err(e) => {
                tracing::warn!("audio unavailable, cues disabled: {}", e);
                None
            }
        })
        .is_some()
}

/// True once `init` has succeeded
pub fn is_ready() -> bool {
    matches!(DISPATCH.get(), Some(Some(_)))
}

/// Dispatch a cue. No-op (never an error) if the dispatcher is not ready.
pub fn play(kind: CueKind) {
    if let Some(Some(tx)) = DISPATCH.get() {
        let _ = tx.send(kind);
    }
}

fn spawn_output_thread() -> Result<mpsc::Sender<CueKind>, AudioInitError> {
    let (tx, rx) = mpsc::channel::<CueKind>();
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioInitError>>();

    thread::Builder::new().name("gate0-audio".into()).spawn(move || {
        // The output stream is !Send, so it lives on this thread for the
        // life of the process.
        let (stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = ready_tx.send(Err(AudioInitError::Output(e.to_string())));
                return;
            }
        };
        let _ = ready_tx.send(Ok(()));
        let _keepalive = stream;

        while let Ok(kind) = rx.recv() {
            if let Ok(sink) = Sink::try_new(&handle) {
                sink.append(CueTone::new(kind));
                sink.detach();
            }
        }
    })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(tx),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(AudioInitError::Output("audio thread exited".into())),
    }
}

// =============================================================================
// TONE SYNTHESIS
// =============================================================================

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy)]
enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

#[derive(Debug, Clone, Copy)]
enum FreqEnvelope {
    Constant(f32),
    /// Linear sweep from → to over ramp_ms, holding `to` afterward
    Linear { from: f32, to: f32, ramp_ms: u64 },
    /// Exponential sweep from → to over ramp_ms
    Exponential { from: f32, to: f32, ramp_ms: u64 },
    /// Hard jump from → to at at_ms
    Step { from: f32, to: f32, at_ms: u64 },
}

impl FreqEnvelope {
    fn at(&self, t_ms: f32) -> f32 {
        match *self {
            FreqEnvelope::Constant(f) => f,
            FreqEnvelope::Linear { from, to, ramp_ms } => {
                let p = (t_ms / ramp_ms as f32).clamp(0.0, 1.0);
                from + (to - from) * p
            }
            FreqEnvelope::Exponential { from, to, ramp_ms } => {
                let p = (t_ms / ramp_ms as f32).clamp(0.0, 1.0);
                from * (to / from).powf(p)
            }
            FreqEnvelope::Step { from, to, at_ms } => {
                if t_ms < at_ms as f32 {
                    from
                } else {
                    to
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ToneSpec {
    waveform: Waveform,
    freq: FreqEnvelope,
    gain_start: f32,
    gain_end: f32,
    /// Exponential gain decay instead of linear
    gain_exponential: bool,
    duration_ms: u64,
}

impl ToneSpec {
    /// Envelope parameters per cue kind. Presentation detail; the contract
    /// is only that distinct kinds are audibly distinguishable.
    fn for_kind(kind: CueKind) -> Self {
        match kind {
            CueKind::Tick => ToneSpec {
                waveform: Waveform::Sine,
                freq: FreqEnvelope::Exponential { from: 800.0, to: 1200.0, ramp_ms: 50 },
                gain_start: 0.05,
                gain_end: 0.0,
                gain_exponential: false,
                duration_ms: 50,
            },
            CueKind::Start => ToneSpec {
                waveform: Waveform::Square,
                freq: FreqEnvelope::Linear { from: 220.0, to: 880.0, ramp_ms: 300 },
                gain_start: 0.05,
                gain_end: 0.0,
                gain_exponential: false,
                duration_ms: 300,
            },
            CueKind::Coin => ToneSpec {
                waveform: Waveform::Triangle,
                freq: FreqEnvelope::Step { from: 1200.0, to: 1600.0, at_ms: 100 },
                gain_start: 0.05,
                gain_end: 0.001,
                gain_exponential: true,
                duration_ms: 400,
            },
            CueKind::Success => ToneSpec {
                waveform: Waveform::Sine,
                freq: FreqEnvelope::Linear { from: 500.0, to: 1000.0, ramp_ms: 200 },
                gain_start: 0.1,
                gain_end: 0.0,
                gain_exponential: false,
                duration_ms: 500,
            },
            CueKind::Alert => ToneSpec {
                waveform: Waveform::Sawtooth,
                freq: FreqEnvelope::Linear { from: 200.0, to: 150.0, ramp_ms: 300 },
                gain_start: 0.1,
                gain_end: 0.0,
                gain_exponential: false,
                duration_ms: 300,
            },
            CueKind::Count => ToneSpec {
                waveform: Waveform::Sine,
                freq: FreqEnvelope::Constant(800.0),
                gain_start: 0.03,
                gain_end: 0.0,
                gain_exponential: false,
                duration_ms: 30,
            },
        }
    }
}

/// One synthesized cue as a mono sample stream
#[derive(Debug, Clone)]
pub struct CueTone {
    spec: ToneSpec,
    frame: u64,
    phase: f32,
}

impl CueTone {
    pub fn new(kind: CueKind) -> Self {
        Self {
            spec: ToneSpec::for_kind(kind),
            frame: 0,
            phase: 0.0,
        }
    }

    fn total_frames(&self) -> u64 {
        SAMPLE_RATE as u64 * self.spec.duration_ms / 1000
    }

    fn gain_at(&self, progress: f32) -> f32 {
        let spec = &self.spec;
        if spec.gain_exponential {
            let floor = spec.gain_end.max(1e-4);
            spec.gain_start * (floor / spec.gain_start).powf(progress)
        } else {
            spec.gain_start + (spec.gain_end - spec.gain_start) * progress
        }
    }
}

impl Iterator for CueTone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let total = self.total_frames();
        if self.frame >= total {
            return None;
        }
        let t_ms = self.frame as f32 * 1000.0 / SAMPLE_RATE as f32;
        let freq = self.spec.freq.at(t_ms);
        self.phase += 2.0 * std::f32::consts::PI * freq / SAMPLE_RATE as f32;
        if self.phase > 2.0 * std::f32::consts::PI {
            self.phase -= 2.0 * std::f32::consts::PI;
        }

        let raw = match self.spec.waveform {
            Waveform::Sine => self.phase.sin(),
            Waveform::Square => {
                if self.phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                let cycle = self.phase / (2.0 * std::f32::consts::PI);
                4.0 * (cycle - (cycle + 0.5).floor()).abs() - 1.0
            }
            Waveform::Sawtooth => {
                let cycle = self.phase / (2.0 * std::f32::consts::PI);
                2.0 * (cycle - (cycle + 0.5).floor())
            }
        };

        let progress = self.frame as f32 / total as f32;
        self.frame += 1;
        Some(raw * self.gain_at(progress))
    }
}

impl Source for CueTone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_frames().saturating_sub(self.frame) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(self.spec.duration_ms))
    }
}
