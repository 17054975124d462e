use std::{env, sync::LazyLock, time::Duration};

use super::types::TransportErrorPolicy;
use crate::config::parse_seconds;

pub(super) const DEFAULT_CEREMONY_TIMEOUT_SECS: u64 = 120;

/// Upper bound on a single ceremony invocation. `0` disables the limit.
pub(super) static CEREMONY_TIMEOUT: LazyLock<Option<Duration>> = LazyLock::new(|| {
    let secs = parse_seconds(
        "CEREMONY_TIMEOUT",
        env::var("CEREMONY_TIMEOUT").ok(),
        DEFAULT_CEREMONY_TIMEOUT_SECS,
    );
    (secs > 0).then(|| Duration::from_secs(secs))
});

pub(super) static CEREMONY_TRANSPORT_ERRORS: LazyLock<TransportErrorPolicy> =
    LazyLock::new(|| parse_transport_policy(env::var("CEREMONY_TRANSPORT_ERRORS").ok()));

fn parse_transport_policy(value: Option<String>) -> TransportErrorPolicy {
    match value {
        None => TransportErrorPolicy::Propagate,
        Some(v) => match v.to_lowercase().as_str() {
            "propagate" => TransportErrorPolicy::Propagate,
            "report" => TransportErrorPolicy::Report,
            invalid => {
                tracing::warn!(
                    "Invalid transport error policy: {}. Using default 'propagate'",
                    invalid
                );
                TransportErrorPolicy::Propagate
            }
        },
    }
}
