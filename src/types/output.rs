//! Point-in-time status view of a funnel session

use serde::{Deserialize, Serialize};

use super::{ActivityEvent, AuthMode, ProcessingStep, Stage};
use crate::types::counter::format_coins;

/// Serializable snapshot of everything a surface needs to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelStatus {
    pub stage: Stage,
    /// Stored progress percentage (checkpoint-set)
    pub progress: u8,
    /// Progress as rendered: pinned to 90 while LOCKED
    pub display_progress: u8,
    pub steps: Vec<ProcessingStep>,
    /// Most recent process-log line
    pub last_log: Option<String>,
    pub bonus_target: i64,
    pub bonus_displayed: i64,
    pub allocated_prize: i64,
    pub prize_visible: bool,
    pub slots_left: u32,
    pub players_online: i64,
    pub ticker: ActivityEvent,
    pub ticker_visible: bool,
    pub activity: ActivityEvent,
    pub identifier: Option<String>,
    pub mode: AuthMode,
    pub region: String,
}

impl FunnelStatus {
    /// Compact single-line form for terminals
    pub fn to_terminal_string(&self) -> String {
        format!(
            "{}{} [{}]{} {}% | bonus {} | {} online | {} slots{}",
            self.stage.color_code(),
            self.stage.emoji(),
            self.stage,
            Stage::color_reset(),
            self.display_progress,
            format_coins(self.bonus_displayed),
            format_coins(self.players_online),
            self.slots_left,
            match &self.last_log {
                Some(line) => format!(" | {}", line),
                None => String::new(),
            }
        )
    }

    /// Machine-parseable form (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "stage={} progress={} bonus={} prize={} slots={} online={}",
            self.stage,
            self.display_progress,
            self.bonus_displayed,
            self.allocated_prize,
            self.slots_left,
            self.players_online,
        )
    }
}
