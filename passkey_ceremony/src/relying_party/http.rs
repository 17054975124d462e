use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::config::RelyingPartyConfig;
use super::types::RelyingParty;
use crate::errors::CeremonyFlowError;
use crate::types::{CeremonyKind, CeremonyOptions, CeremonyResponse, Identity, VerificationResult};

/// Relying party reached over HTTP with JSON bodies
#[derive(Debug, Clone)]
pub struct HttpRelyingParty {
    client: reqwest::Client,
    config: RelyingPartyConfig,
}

impl HttpRelyingParty {
    pub fn new(config: RelyingPartyConfig) -> Result<Self, CeremonyFlowError> {
        let client = build_client(config.http_timeout())?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, CeremonyFlowError> {
        Self::new(RelyingPartyConfig::from_env()?)
    }

    pub fn config(&self) -> &RelyingPartyConfig {
        &self.config
    }

    /// Build `{origin}{prefix}/{endpoint}/{identity}`.
    ///
    /// The identity is pushed as a single path segment, so `/`, `?`, `#`, `%`
    /// and spaces are percent-encoded instead of reshaping the URL.
    /// `.` and `..` are rejected: URL parsing resolves them (and their
    /// `%2E` forms) as dot segments, so they cannot reach the relying party.
    pub fn endpoint_url(&self, endpoint: &str, identity: &Identity) -> Result<Url, CeremonyFlowError> {
        if matches!(identity.as_str(), "." | "..") {
            return Err(CeremonyFlowError::Config(format!(
                "Identity '{identity}' cannot be sent as a URL path segment"
            ))
            .log());
        }

        let mut url = self.config.origin().clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CeremonyFlowError::Config(format!(
                    "Origin '{}' cannot carry a path",
                    self.config.origin()
                ))
            })?;
            segments.pop_if_empty();
            segments.extend(
                self.config
                    .route_prefix()
                    .split('/')
                    .filter(|segment| !segment.is_empty()),
            );
            segments.push(endpoint);
            segments.push(identity.as_str());
        }
        Ok(url)
    }

    async fn read_json(response: reqwest::Response, what: &str) -> Result<Value, CeremonyFlowError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Relying party answered {} with status {}", what, status);
        }

        serde_json::from_str(&body).map_err(|e| {
            CeremonyFlowError::MalformedResponse(format!(
                "{what} body is not valid JSON (status {status}): {e}"
            ))
            .log()
        })
    }
}

#[async_trait]
impl RelyingParty for HttpRelyingParty {
    async fn fetch_options(
        &self,
        kind: CeremonyKind,
        identity: &Identity,
    ) -> Result<CeremonyOptions, CeremonyFlowError> {
        let url = self.endpoint_url(&kind.options_endpoint(), identity)?;
        tracing::debug!("Fetching {} options from {}", kind, url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let body = Self::read_json(response, "options request").await?;
        Ok(CeremonyOptions::from(body))
    }

    async fn submit_response(
        &self,
        kind: CeremonyKind,
        identity: &Identity,
        response: CeremonyResponse,
    ) -> Result<VerificationResult, CeremonyFlowError> {
        let url = self.endpoint_url(&kind.verify_endpoint(), identity)?;
        tracing::debug!("Submitting {} response to {}", kind, url);

        let http_response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&response)
            .send()
            .await?;

        let body = Self::read_json(http_response, "verification request").await?;
        let result = VerificationResult::from_body(body).map_err(CeremonyFlowError::log)?;
        tracing::debug!(
            "Verification of {} for {}: verified={}",
            kind,
            identity,
            result.verified()
        );
        Ok(result)
    }
}

/// Creates the HTTP client used for relying-party round-trips:
///
/// - `timeout`: bounds each request so a stalled relying party cannot hang a run.
/// - `pool_idle_timeout`: 90 seconds, how long an idle connection stays pooled.
/// - `pool_max_idle_per_host`: 32, enough for both ceremony kinds running at once.
fn build_client(timeout: Duration) -> Result<reqwest::Client, CeremonyFlowError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| CeremonyFlowError::Config(format!("Failed to create HTTP client: {e}")))
}
