//! Core types for Gate0

mod activity;
mod auth;
mod counter;
mod event;
mod log;
mod output;
mod stage;
mod step;

pub use activity::{ActivityEvent, PrizeColor, ACTIONS, NAME_PREFIXES, NAME_SUFFIXES, PRIZES};
pub use auth::{is_known_region, AuthMode, REGIONS};
pub use counter::{format_coins, BonusCounter};
pub use event::{CueKind, EngineEvent};
pub use log::ProcessLog;
pub use output::FunnelStatus;
pub use stage::{CheckOrigin, Stage};
pub use step::{ProcessingStep, StepList, StepStatus, STEP_COUNT};
