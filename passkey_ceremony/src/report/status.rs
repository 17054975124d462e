use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::ceremony::CeremonyError;
use crate::errors::CeremonyFlowError;

pub const PASS_MARKER: &str = "✅";
const FAILURE_MARKER: &str = "🛑";

/// Outcome of the most recent run of one ceremony kind
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Pending,
    Passed,
    Failed(String),
}

impl RunStatus {
    /// Status line shown to the user; empty while pending
    pub fn render(&self) -> String {
        match self {
            Self::Pending => String::new(),
            Self::Passed => PASS_MARKER.to_string(),
            Self::Failed(reason) => format!("{FAILURE_MARKER} (Reason: {reason})"),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A failure reason coerced to display text.
///
/// Built from whatever the failing stage produced: an error, a message,
/// a JSON value, or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason(String);

impl FailureReason {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FailureReason {
    fn from(reason: &str) -> Self {
        Self(reason.to_string())
    }
}

impl From<String> for FailureReason {
    fn from(reason: String) -> Self {
        Self(reason)
    }
}

impl From<Option<String>> for FailureReason {
    fn from(reason: Option<String>) -> Self {
        Self(reason.unwrap_or_else(|| "undefined".to_string()))
    }
}

impl From<Option<&str>> for FailureReason {
    fn from(reason: Option<&str>) -> Self {
        Self(reason.unwrap_or("undefined").to_string())
    }
}

impl From<&Value> for FailureReason {
    fn from(reason: &Value) -> Self {
        match reason {
            Value::Null => Self("undefined".to_string()),
            Value::String(text) => Self(text.clone()),
            other => Self(other.to_string()),
        }
    }
}

impl From<&CeremonyError> for FailureReason {
    fn from(err: &CeremonyError) -> Self {
        Self(err.to_string())
    }
}

impl From<&CeremonyFlowError> for FailureReason {
    fn from(err: &CeremonyFlowError) -> Self {
        match err {
            CeremonyFlowError::Ceremony(inner) => inner.into(),
            other => Self(other.to_string()),
        }
    }
}

/// Holds the single pass/fail status of one ceremony kind
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    status: RunStatus,
    writes: usize,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_passed(&mut self) {
        self.replace(RunStatus::Passed);
    }

    pub fn set_failed(&mut self, reason: impl Into<FailureReason>) {
        let reason: FailureReason = reason.into();
        self.replace(RunStatus::Failed(reason.0));
    }

    pub fn clear(&mut self) {
        self.status = RunStatus::Pending;
        self.writes = 0;
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn text(&self) -> String {
        self.status.render()
    }

    /// Number of pass/fail writes since the last clear
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn replace(&mut self, status: RunStatus) {
        if self.status != RunStatus::Pending {
            tracing::warn!(
                "Status overwritten without clear: {:?} -> {:?}",
                self.status,
                status
            );
        }
        self.status = status;
        self.writes += 1;
    }
}
