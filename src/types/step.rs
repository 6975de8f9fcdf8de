//! Processing step tracker
//!
//! Five fixed steps shown during the scripted sequence. Statuses only
//! progress forward (pending → active → completed) within an attempt;
//! the whole list resets when a new attempt starts.

use serde::{Deserialize, Serialize};

/// Number of steps in the fixed list
pub const STEP_COUNT: usize = 5;

/// Labels and icon tags for the fixed step list. Icon tags are opaque
/// presentation hints, not interpreted by the engine.
const STEP_DEFS: [(&str, &str); STEP_COUNT] = [
    ("Secure Handshake", "wifi"),
    ("Allocating Server Slot", "server"),
    ("Encrypting Connection", "lock"),
    ("Calculating Bonus", "coins"),
    ("Human Verification", "shield"),
];

/// Status of a single processing step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

/// One entry in the visual step tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStep {
    /// Step identity, 1-based
    pub id: u8,
    pub label: String,
    pub status: StepStatus,
    /// Opaque iconographic tag
    pub icon: String,
}

/// The fixed five-step list with forward-only progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepList {
    steps: Vec<ProcessingStep>,
}

impl Default for StepList {
    fn default() -> Self {
        Self::new()
    }
}

impl StepList {
    pub fn new() -> Self {
        let steps = STEP_DEFS
            .iter()
            .enumerate()
            .map(|(i, (label, icon))| ProcessingStep {
                id: (i + 1) as u8,
                label: (*label).to_string(),
                status: StepStatus::Pending,
                icon: (*icon).to_string(),
            })
            .collect();
        Self { steps }
    }

    /// Set a step's status. Regressions are ignored: a status can only
    /// move forward within an attempt. Activating a step completes any
    /// step that is still active so at most one is active at a time.
    pub fn set_status(&mut self, id: u8, status: StepStatus) -> bool {
        let idx = match self.steps.iter().position(|s| s.id == id) {
            Some(i) => i,
            None => return false,
        };
        if status <= self.steps[idx].status {
            return false;
        }
        if status == StepStatus::Active {
            for step in &mut self.steps {
                if step.status == StepStatus::Active {
                    step.status = StepStatus::Completed;
                }
            }
        }
        self.steps[idx].status = status;
        true
    }

    /// Reset every step to pending (start of a new attempt)
    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.status = StepStatus::Pending;
        }
    }

    pub fn get(&self, id: u8) -> Option<&ProcessingStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    /// Number of steps currently active (invariant: always ≤ 1)
    pub fn active_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Active)
            .count()
    }

    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_all_pending() {
        let list = StepList::new();
        assert_eq!(list.steps().len(), STEP_COUNT);
        assert!(list.steps().iter().all(|s| s.status == StepStatus::Pending));
        assert_eq!(list.active_count(), 0);
    }

    #[test]
    fn test_at_most_one_active() {
        let mut list = StepList::new();
        list.set_status(1, StepStatus::Active);
        list.set_status(2, StepStatus::Active);
        assert_eq!(list.active_count(), 1);
        assert_eq!(list.get(1).unwrap().status, StepStatus::Completed);
        assert_eq!(list.get(2).unwrap().status, StepStatus::Active);
    }

    #[test]
    fn test_no_regression() {
        let mut list = StepList::new();
        list.set_status(3, StepStatus::Completed);
        assert!(!list.set_status(3, StepStatus::Active));
        assert!(!list.set_status(3, StepStatus::Pending));
        assert_eq!(list.get(3).unwrap().status, StepStatus::Completed);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut list = StepList::new();
        list.set_status(1, StepStatus::Completed);
        list.set_status(2, StepStatus::Active);
        list.reset();
        assert!(list.steps().iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn test_unknown_id_ignored() {
        let mut list = StepList::new();
        assert!(!list.set_status(9, StepStatus::Active));
        assert_eq!(list.active_count(), 0);
    }
}
