//! Error types for the passkey_ceremony crate

use thiserror::Error;

use crate::ceremony::CeremonyError;
use crate::types::CeremonyKind;

/// Errors that can end or interrupt a ceremony run
#[derive(Error, Debug)]
pub enum CeremonyFlowError {
    /// The request to the relying party could not be sent or its body could not be received
    #[error("Network error: {0}")]
    Network(String),

    /// The relying party answered with a body that is not the expected JSON structure
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The authenticator declined or failed the ceremony (including user cancellation)
    #[error("Ceremony error: {0}")]
    Ceremony(CeremonyError),

    /// A run of the same kind has not reached its report yet
    #[error("A {0} run is already in progress")]
    RunInProgress(CeremonyKind),

    /// Invalid configuration, such as an unusable relying-party origin
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CeremonyFlowError {
    /// Log the error and return self
    ///
    /// This method logs the error with appropriate context and returns self,
    /// allowing for method chaining and explicit logging when needed.
    pub fn log(self) -> Self {
        match &self {
            Self::Network(msg) => tracing::error!("Network error: {}", msg),
            Self::MalformedResponse(msg) => tracing::error!("Malformed response: {}", msg),
            Self::Ceremony(err) => tracing::warn!("Ceremony error: {}", err),
            Self::RunInProgress(kind) => tracing::warn!("A {} run is already in progress", kind),
            Self::Config(msg) => tracing::error!("Configuration error: {}", msg),
        }
        self
    }

    /// Whether the error came from one of the two relying-party round-trips
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::MalformedResponse(_))
    }
}

// Custom From implementations that automatically log errors

impl From<CeremonyError> for CeremonyFlowError {
    fn from(err: CeremonyError) -> Self {
        Self::Ceremony(err).log()
    }
}

impl From<reqwest::Error> for CeremonyFlowError {
    fn from(err: reqwest::Error) -> Self {
        let error = if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else {
            Self::Network(err.to_string())
        };
        error.log()
    }
}

impl From<serde_json::Error> for CeremonyFlowError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string()).log()
    }
}
