use async_trait::async_trait;

use super::errors::CeremonyError;
use crate::types::{CeremonyKind, CeremonyOptions, CeremonyResponse};

/// The local ceremony capability: talks to an authenticator and signs the challenge.
///
/// Implementations wrap whatever actually holds the credential (a platform
/// authenticator bridge, a security key, a software authenticator in tests).
/// The orchestrator treats both inputs and outputs as opaque.
#[async_trait]
pub trait CeremonyAuthenticator: Send + Sync + 'static {
    /// Create a new credential from registration options.
    async fn perform_registration(
        &self,
        options: CeremonyOptions,
    ) -> Result<CeremonyResponse, CeremonyError>;

    /// Produce an assertion from authentication options.
    async fn perform_authentication(
        &self,
        options: CeremonyOptions,
    ) -> Result<CeremonyResponse, CeremonyError>;

    /// Dispatch to the ceremony matching `kind`.
    async fn perform(
        &self,
        kind: CeremonyKind,
        options: CeremonyOptions,
    ) -> Result<CeremonyResponse, CeremonyError> {
        match kind {
            CeremonyKind::Registration => self.perform_registration(options).await,
            CeremonyKind::Authentication => self.perform_authentication(options).await,
        }
    }
}
