//! Process log: append-only status lines for the current attempt

use serde::{Deserialize, Serialize};

/// Ordered status lines describing the current attempt. Only grows, or is
/// replaced wholesale when a new attempt starts; only the most recent
/// entry is surfaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessLog {
    lines: Vec<String>,
}

impl ProcessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Replace the whole log with a single opening line (new attempt)
    pub fn restart(&mut self, first: impl Into<String>) {
        self.lines.clear();
        self.lines.push(first.into());
    }

    /// The surfaced entry
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
