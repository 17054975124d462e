use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::CeremonyFlowError;

/// Trace label for the verification body, shared by both ceremony kinds.
pub(crate) const VERIFICATION_LABEL: &str = "Verification Response";

/// Which of the two ceremonies a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeremonyKind {
    /// Credential creation (`navigator.credentials.create` on the web)
    Registration,
    /// Credential assertion (`navigator.credentials.get` on the web)
    Authentication,
}

impl CeremonyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Authentication => "authentication",
        }
    }

    /// Path segment of the endpoint that issues ceremony options
    pub(crate) fn options_endpoint(&self) -> String {
        format!("generate-{}-options", self.as_str())
    }

    /// Path segment of the endpoint that verifies a ceremony response
    pub(crate) fn verify_endpoint(&self) -> String {
        format!("verify-{}-response", self.as_str())
    }

    /// Trace label for the options body.
    ///
    /// The authentication endpoint answers with an error payload for unknown
    /// users, and that payload is traced under the same label.
    pub(crate) fn options_label(&self) -> &'static str {
        match self {
            Self::Registration => "Registration Options",
            Self::Authentication => "Authentication Options/Error",
        }
    }

    pub(crate) fn response_label(&self) -> &'static str {
        match self {
            Self::Registration => "Registration Response",
            Self::Authentication => "Authentication Response",
        }
    }
}

impl fmt::Display for CeremonyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-supplied account identifier.
///
/// Passed through as-is; validation and normalization belong to the relying party.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for Identity {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-issued ceremony options (challenge plus parameters).
///
/// The content is opaque to the orchestrator; it is handed to the
/// authenticator once and never modified.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CeremonyOptions(Value);

impl CeremonyOptions {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub(crate) fn to_pretty_json(&self) -> String {
        pretty_json(&self.0)
    }
}

impl From<Value> for CeremonyOptions {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Signed output of a ceremony, submitted once to the relying party for verification
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CeremonyResponse(Value);

impl CeremonyResponse {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub(crate) fn to_pretty_json(&self) -> String {
        pretty_json(&self.0)
    }
}

impl From<Value> for CeremonyResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Verdict returned by the relying party's verification endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    verified: bool,
    message: Option<String>,
    body: Value,
}

impl VerificationResult {
    /// Interpret a parsed verification body.
    ///
    /// Only `verified` and `message` (or `msg`) are read. A missing or
    /// non-boolean `verified` counts as not verified.
    pub fn from_body(body: Value) -> Result<Self, CeremonyFlowError> {
        let Some(fields) = body.as_object() else {
            return Err(CeremonyFlowError::MalformedResponse(format!(
                "verification body is not a JSON object: {body}"
            )));
        };

        let verified = fields
            .get("verified")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let message = fields
            .get("message")
            .or_else(|| fields.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            verified,
            message,
            body,
        })
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The body exactly as parsed, including fields not interpreted here
    pub fn body(&self) -> &Value {
        &self.body
    }

    pub(crate) fn to_pretty_json(&self) -> String {
        pretty_json(&self.body)
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
