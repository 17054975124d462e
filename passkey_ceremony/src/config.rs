//! Central configuration for the passkey_ceremony crate

use std::sync::LazyLock;

/// Route prefix under which the relying party mounts its ceremony endpoints
///
/// Prepended to `/generate-{kind}-options/...` and `/verify-{kind}-response/...`.
/// Default: "" (endpoints at the origin root)
pub static CEREMONY_ROUTE_PREFIX: LazyLock<String> =
    LazyLock::new(|| std::env::var("CEREMONY_ROUTE_PREFIX").unwrap_or_default());

/// Parse a whole number of seconds from an environment variable value,
/// falling back to `default` with a warning when the value is unusable.
pub(crate) fn parse_seconds(name: &str, value: Option<String>, default: u64) -> u64 {
    match value {
        None => default,
        Some(v) => match v.trim().parse::<u64>() {
            Ok(secs) => secs,
            Err(_) => {
                tracing::warn!("Invalid {}: {}. Using default '{}'", name, v, default);
                default
            }
        },
    }
}
