use std::{env, sync::LazyLock, time::Duration};
use url::Url;

use crate::config::{CEREMONY_ROUTE_PREFIX, parse_seconds};
use crate::errors::CeremonyFlowError;

pub(super) static CEREMONY_RP_ORIGIN: LazyLock<String> = LazyLock::new(|| {
    env::var("CEREMONY_RP_ORIGIN").unwrap_or_else(|_| "http://localhost:5000".to_string())
});

pub(super) static CEREMONY_HTTP_TIMEOUT: LazyLock<u64> = LazyLock::new(|| {
    parse_seconds(
        "CEREMONY_HTTP_TIMEOUT",
        env::var("CEREMONY_HTTP_TIMEOUT").ok(),
        DEFAULT_HTTP_TIMEOUT_SECS,
    )
});

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Where the relying party lives and how to talk to it
#[derive(Debug, Clone)]
pub struct RelyingPartyConfig {
    origin: Url,
    route_prefix: String,
    http_timeout: Duration,
}

impl RelyingPartyConfig {
    pub fn new(origin: &str) -> Result<Self, CeremonyFlowError> {
        let origin = Url::parse(origin)
            .map_err(|e| CeremonyFlowError::Config(format!("Invalid origin '{origin}': {e}")))?;
        if origin.cannot_be_a_base() {
            return Err(CeremonyFlowError::Config(format!(
                "Origin '{origin}' cannot carry a path"
            )));
        }

        Ok(Self {
            origin,
            route_prefix: String::new(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }

    /// Build the configuration from `CEREMONY_RP_ORIGIN`, `CEREMONY_ROUTE_PREFIX`
    /// and `CEREMONY_HTTP_TIMEOUT`.
    pub fn from_env() -> Result<Self, CeremonyFlowError> {
        Ok(Self::new(CEREMONY_RP_ORIGIN.as_str())?
            .with_route_prefix(CEREMONY_ROUTE_PREFIX.as_str())
            .with_http_timeout(Duration::from_secs(*CEREMONY_HTTP_TIMEOUT)))
    }

    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = prefix.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}
