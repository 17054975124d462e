use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Instrument;
use uuid::Uuid;

use super::types::{FlowOptions, RunReport, RunState, TransportErrorPolicy};
use crate::ceremony::{CeremonyAuthenticator, CeremonyError};
use crate::errors::CeremonyFlowError;
use crate::relying_party::RelyingParty;
use crate::report::{DiagnosticSink, RunStatus, StatusReporter, TraceEntry};
use crate::types::{
    CeremonyKind, CeremonyOptions, CeremonyResponse, Identity, VERIFICATION_LABEL,
    VerificationResult,
};

/// Status, trace and position of the current (or last) run
#[derive(Debug, Default)]
struct RunSurface {
    status: StatusReporter,
    trace: DiagnosticSink,
    state: RunState,
    states: Vec<RunState>,
}

impl RunSurface {
    fn reset(&mut self) {
        self.status.clear();
        self.trace.clear();
        self.state = RunState::Idle;
        self.states = vec![RunState::Idle];
    }

    fn enter(&mut self, kind: CeremonyKind, state: RunState) {
        tracing::debug!("{} run: {:?} -> {:?}", kind, self.state, state);
        self.state = state;
        self.states.push(state);
    }
}

/// Drives one ceremony kind through options fetch, ceremony, verification and report.
///
/// Each orchestrator owns the status and trace of its kind. Runs of the same
/// orchestrator never overlap: starting a run while another is in flight
/// fails with [`CeremonyFlowError::RunInProgress`] and leaves the visible
/// status and trace untouched.
pub struct CeremonyOrchestrator {
    kind: CeremonyKind,
    relying_party: Arc<dyn RelyingParty>,
    authenticator: Arc<dyn CeremonyAuthenticator>,
    options: FlowOptions,
    surface: Mutex<RunSurface>,
    run_gate: tokio::sync::Mutex<()>,
}

impl CeremonyOrchestrator {
    pub fn new(
        kind: CeremonyKind,
        relying_party: Arc<dyn RelyingParty>,
        authenticator: Arc<dyn CeremonyAuthenticator>,
        options: FlowOptions,
    ) -> Self {
        Self {
            kind,
            relying_party,
            authenticator,
            options,
            surface: Mutex::new(RunSurface::default()),
            run_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn kind(&self) -> CeremonyKind {
        self.kind
    }

    pub fn status(&self) -> RunStatus {
        self.surface().status.status().clone()
    }

    pub fn status_text(&self) -> String {
        self.surface().status.text()
    }

    pub fn trace(&self) -> Vec<TraceEntry> {
        self.surface().trace.entries().to_vec()
    }

    pub fn trace_text(&self) -> String {
        self.surface().trace.render()
    }

    pub fn state(&self) -> RunState {
        self.surface().state
    }

    pub fn is_running(&self) -> bool {
        self.run_gate.try_lock().is_err()
    }

    /// Run the ceremony for `identity` from `Idle` to `Reported`.
    ///
    /// Ceremony failures end the run normally with a failed status. Options
    /// and verification round-trip failures are returned as errors unless
    /// the orchestrator was built with [`TransportErrorPolicy::Report`].
    pub async fn run(&self, identity: impl Into<Identity>) -> Result<RunReport, CeremonyFlowError> {
        let identity = identity.into();
        let Ok(_gate) = self.run_gate.try_lock() else {
            return Err(CeremonyFlowError::RunInProgress(self.kind).log());
        };

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("ceremony_run", kind = %self.kind, %run_id);
        self.execute(run_id, identity).instrument(span).await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        identity: Identity,
    ) -> Result<RunReport, CeremonyFlowError> {
        let started_at = Utc::now();
        self.surface().reset();
        tracing::info!("Starting {} run for {}", self.kind, identity);

        match self.advance(&identity).await {
            Ok(verification) => self.conclude(&verification),
            Err(err) => self.recover(err)?,
        }

        let surface = self.surface();
        tracing::info!(
            "Finished {} run for {}: {:?}",
            self.kind,
            identity,
            surface.status.status()
        );

        Ok(RunReport {
            run_id,
            kind: self.kind,
            identity,
            status: surface.status.status().clone(),
            trace: surface.trace.entries().to_vec(),
            states: surface.states.clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Stages 1 to 3; stops at the first error.
    async fn advance(&self, identity: &Identity) -> Result<VerificationResult, CeremonyFlowError> {
        self.enter(RunState::OptionsRequested);
        let options = self
            .relying_party
            .fetch_options(self.kind, identity)
            .await?;
        self.record(self.kind.options_label(), options.to_pretty_json());

        self.enter(RunState::CeremonyInvoked);
        let response = self.invoke_ceremony(options).await?;
        self.record(self.kind.response_label(), response.to_pretty_json());

        self.enter(RunState::ResponseSubmitted);
        self.relying_party
            .submit_response(self.kind, identity, response)
            .await
    }

    async fn invoke_ceremony(
        &self,
        options: CeremonyOptions,
    ) -> Result<CeremonyResponse, CeremonyFlowError> {
        let invocation = self.authenticator.perform(self.kind, options);
        let outcome = match self.options.ceremony_timeout {
            Some(limit) => tokio::time::timeout(limit, invocation)
                .await
                .unwrap_or_else(|_| Err(CeremonyError::timeout(limit))),
            None => invocation.await,
        };
        outcome.map_err(CeremonyFlowError::from)
    }

    /// Stage 4: render the verdict and trace the full verification body.
    fn conclude(&self, verification: &VerificationResult) {
        let mut surface = self.surface();
        if verification.verified() {
            surface.status.set_passed();
        } else {
            surface
                .status
                .set_failed(verification.message().unwrap_or("verification failed"));
        }
        surface
            .trace
            .append(VERIFICATION_LABEL, verification.to_pretty_json());
        surface.enter(self.kind, RunState::Reported);
    }

    /// Finish the run on a recoverable error, or hand the error back.
    fn recover(&self, err: CeremonyFlowError) -> Result<(), CeremonyFlowError> {
        let recoverable = match &err {
            CeremonyFlowError::Ceremony(_) => true,
            transport if transport.is_transport() => {
                self.options.transport_errors == TransportErrorPolicy::Report
            }
            _ => false,
        };

        let mut surface = self.surface();
        if !recoverable {
            tracing::error!("{} run stopped at {:?}: {}", self.kind, surface.state, err);
            return Err(err);
        }

        surface.status.set_failed(&err);
        surface.enter(self.kind, RunState::Reported);
        Ok(())
    }

    fn enter(&self, state: RunState) {
        self.surface().enter(self.kind, state);
    }

    fn record(&self, label: &str, payload: String) {
        self.surface().trace.append(label, payload);
    }

    fn surface(&self) -> MutexGuard<'_, RunSurface> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
