use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use super::config::{CEREMONY_TIMEOUT, CEREMONY_TRANSPORT_ERRORS, DEFAULT_CEREMONY_TIMEOUT_SECS};
use crate::report::{RunStatus, TraceEntry, render_entries};
use crate::types::{CeremonyKind, Identity};

/// Position of a run in the four-stage pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    OptionsRequested,
    CeremonyInvoked,
    ResponseSubmitted,
    Reported,
}

/// What a run does when an options fetch or a verification submit fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportErrorPolicy {
    /// Return the error to the caller; the status stays pending.
    #[default]
    Propagate,
    /// Render the error into the status like a ceremony failure and finish the run.
    Report,
}

/// Knobs shared by both orchestrators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowOptions {
    /// `None` waits on the authenticator indefinitely
    pub ceremony_timeout: Option<Duration>,
    pub transport_errors: TransportErrorPolicy,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            ceremony_timeout: Some(Duration::from_secs(DEFAULT_CEREMONY_TIMEOUT_SECS)),
            transport_errors: TransportErrorPolicy::Propagate,
        }
    }
}

impl FlowOptions {
    /// Read `CEREMONY_TIMEOUT` and `CEREMONY_TRANSPORT_ERRORS`
    pub fn from_env() -> Self {
        Self {
            ceremony_timeout: *CEREMONY_TIMEOUT,
            transport_errors: *CEREMONY_TRANSPORT_ERRORS,
        }
    }
}

/// Outcome of a run that reached `Reported`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub kind: CeremonyKind,
    pub identity: Identity,
    pub status: RunStatus,
    pub trace: Vec<TraceEntry>,
    /// Every state the run entered, starting with `Idle`
    pub states: Vec<RunState>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.status.is_passed()
    }

    pub fn status_text(&self) -> String {
        self.status.render()
    }

    pub fn trace_text(&self) -> String {
        render_entries(&self.trace)
    }
}
