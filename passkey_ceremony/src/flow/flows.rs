use std::sync::Arc;

use super::orchestrator::CeremonyOrchestrator;
use super::types::{FlowOptions, RunReport};
use crate::ceremony::CeremonyAuthenticator;
use crate::errors::CeremonyFlowError;
use crate::relying_party::{HttpRelyingParty, RelyingParty};
use crate::types::{CeremonyKind, Identity};

/// The registration and authentication orchestrators of one client.
///
/// Both share the relying party and the authenticator but keep separate
/// status and trace, so a registration and an authentication can run at
/// the same time.
pub struct CeremonyFlows {
    registration: CeremonyOrchestrator,
    authentication: CeremonyOrchestrator,
}

impl CeremonyFlows {
    pub fn new(
        relying_party: Arc<dyn RelyingParty>,
        authenticator: Arc<dyn CeremonyAuthenticator>,
        options: FlowOptions,
    ) -> Self {
        Self {
            registration: CeremonyOrchestrator::new(
                CeremonyKind::Registration,
                relying_party.clone(),
                authenticator.clone(),
                options,
            ),
            authentication: CeremonyOrchestrator::new(
                CeremonyKind::Authentication,
                relying_party,
                authenticator,
                options,
            ),
        }
    }

    /// Talk to the relying party configured in the environment over HTTP
    pub fn from_env(
        authenticator: Arc<dyn CeremonyAuthenticator>,
    ) -> Result<Self, CeremonyFlowError> {
        let relying_party = HttpRelyingParty::from_env()?;
        tracing::info!(
            "Using relying party at {} (route prefix '{}')",
            relying_party.config().origin(),
            relying_party.config().route_prefix()
        );
        Ok(Self::new(
            Arc::new(relying_party),
            authenticator,
            FlowOptions::from_env(),
        ))
    }

    pub fn orchestrator(&self, kind: CeremonyKind) -> &CeremonyOrchestrator {
        match kind {
            CeremonyKind::Registration => &self.registration,
            CeremonyKind::Authentication => &self.authentication,
        }
    }

    pub fn registration(&self) -> &CeremonyOrchestrator {
        &self.registration
    }

    pub fn authentication(&self) -> &CeremonyOrchestrator {
        &self.authentication
    }

    pub async fn run(
        &self,
        kind: CeremonyKind,
        identity: impl Into<Identity>,
    ) -> Result<RunReport, CeremonyFlowError> {
        self.orchestrator(kind).run(identity).await
    }

    pub async fn register(
        &self,
        identity: impl Into<Identity>,
    ) -> Result<RunReport, CeremonyFlowError> {
        self.registration.run(identity).await
    }

    pub async fn authenticate(
        &self,
        identity: impl Into<Identity>,
    ) -> Result<RunReport, CeremonyFlowError> {
        self.authentication.run(identity).await
    }
}
