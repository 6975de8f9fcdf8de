//! Core modules for gate0

pub mod ambient;
pub mod animator;
pub mod api;
pub mod audio;
pub mod engine;
pub mod generator;
pub mod locker;
pub mod script;
pub mod session;
pub mod watcher;

pub use animator::CounterAnimator;
pub use api::{create_router, run_server};
pub use engine::{FunnelState, SubmitOutcome};
pub use generator::ActivityGenerator;
pub use locker::{fire_locker_trigger, register_trigger, unregister_trigger, TriggerFn};
pub use script::{TickSpec, SCRIPT};
pub use session::{FunnelSession, HandoffHook, SessionConfig};
pub use watcher::HostSignal;
