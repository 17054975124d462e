use std::time::Duration;
use thiserror::Error;

/// Failure reported by the ceremony capability.
///
/// Mirrors the shape of a WebAuthn `DOMException`: a short error name such as
/// `NotAllowedError` or `InvalidStateError`, plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct CeremonyError {
    name: String,
    message: String,
}

impl CeremonyError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The user cancelled, or the authenticator refused the request
    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new("NotAllowedError", message)
    }

    /// The ceremony did not finish within the configured limit
    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            "TimeoutError",
            format!("The ceremony did not complete within {} ms", limit.as_millis()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
