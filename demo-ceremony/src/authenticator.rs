use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::{io::AsyncWriteExt, process::Command};

use passkey_ceremony::{
    CeremonyAuthenticator, CeremonyError, CeremonyFlowError, CeremonyKind, CeremonyOptions,
    CeremonyResponse,
};

const AUTHENTICATOR_CMD_VAR: &str = "CEREMONY_AUTHENTICATOR_CMD";

/// Ceremony client backed by an external command.
///
/// The command gets the options JSON on stdin and `CEREMONY_KIND` in its
/// environment, and prints the response JSON on stdout. A non-zero exit is a
/// ceremony failure; the last stderr line is read as `Name: message`.
#[derive(Debug, Clone)]
pub(crate) struct CommandAuthenticator {
    program: String,
    args: Vec<String>,
}

impl CommandAuthenticator {
    pub(crate) fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub(crate) fn from_env() -> Result<Self, CeremonyFlowError> {
        let command = std::env::var(AUTHENTICATOR_CMD_VAR).map_err(|_| {
            CeremonyFlowError::Config(format!("{AUTHENTICATOR_CMD_VAR} must be set"))
        })?;

        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| {
            CeremonyFlowError::Config(format!("{AUTHENTICATOR_CMD_VAR} is empty"))
        })?;

        tracing::info!("Using authenticator command: {}", command);
        Ok(Self::new(program, words.collect()))
    }

    async fn invoke(
        &self,
        kind: CeremonyKind,
        options: CeremonyOptions,
    ) -> Result<CeremonyResponse, CeremonyError> {
        let payload = serde_json::to_vec(&options)
            .map_err(|e| CeremonyError::new("EncodingError", e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("CEREMONY_KIND", kind.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CeremonyError::new(
                    "NotSupportedError",
                    format!("Failed to start '{}': {e}", self.program),
                )
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&payload).await {
                Ok(()) => {}
                // The command may exit without reading its input
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("Authenticator command closed stdin early");
                }
                Err(e) => return Err(CeremonyError::new("UnknownError", e.to_string())),
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CeremonyError::new("UnknownError", e.to_string()))?;

        if !output.status.success() {
            let failure = parse_failure(&String::from_utf8_lossy(&output.stderr));
            tracing::debug!("Authenticator command exited with {}: {}", output.status, failure);
            return Err(failure);
        }

        serde_json::from_slice::<Value>(&output.stdout)
            .map(CeremonyResponse::from)
            .map_err(|e| {
                CeremonyError::new(
                    "EncodingError",
                    format!("Authenticator output is not JSON: {e}"),
                )
            })
    }
}

#[async_trait]
impl CeremonyAuthenticator for CommandAuthenticator {
    async fn perform_registration(
        &self,
        options: CeremonyOptions,
    ) -> Result<CeremonyResponse, CeremonyError> {
        self.invoke(CeremonyKind::Registration, options).await
    }

    async fn perform_authentication(
        &self,
        options: CeremonyOptions,
    ) -> Result<CeremonyResponse, CeremonyError> {
        self.invoke(CeremonyKind::Authentication, options).await
    }
}

/// Read the last non-empty stderr line as `Name: message`.
fn parse_failure(stderr: &str) -> CeremonyError {
    let line = stderr
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or_default();

    match line.split_once(": ") {
        Some((name, message)) if !name.is_empty() && !name.contains(char::is_whitespace) => {
            CeremonyError::new(name, message)
        }
        _ if line.is_empty() => CeremonyError::not_allowed("The authenticator command failed"),
        _ => CeremonyError::not_allowed(line),
    }
}
