use async_trait::async_trait;

use crate::errors::CeremonyFlowError;
use crate::types::{CeremonyKind, CeremonyOptions, CeremonyResponse, Identity, VerificationResult};

/// The two round-trips a ceremony run makes to the relying party
#[async_trait]
pub trait RelyingParty: Send + Sync + 'static {
    /// Retrieve the options bundle for `kind` and `identity`.
    ///
    /// Whatever JSON the server answers with is returned, including error
    /// payloads; only a transport failure or a non-JSON body is an error.
    async fn fetch_options(
        &self,
        kind: CeremonyKind,
        identity: &Identity,
    ) -> Result<CeremonyOptions, CeremonyFlowError>;

    /// Submit the ceremony response and read back the verdict.
    async fn submit_response(
        &self,
        kind: CeremonyKind,
        identity: &Identity,
        response: CeremonyResponse,
    ) -> Result<VerificationResult, CeremonyFlowError>;
}
