//! passkey_ceremony - Client-side orchestration of passkey ceremonies
//!
//! This crate drives registration and authentication ceremonies against a
//! relying party: fetch the options, hand them to an authenticator, submit
//! the signed response, and report the verdict with a labeled trace.
//!
//! The authenticator and the relying party are capabilities supplied by the
//! caller through [`CeremonyAuthenticator`] and [`RelyingParty`];
//! [`HttpRelyingParty`] talks to a relying party over HTTP.

mod ceremony;
mod config;
mod errors;
mod flow;
mod relying_party;
mod report;
mod types;


pub use ceremony::{CeremonyAuthenticator, CeremonyError};
pub use config::CEREMONY_ROUTE_PREFIX;
pub use errors::CeremonyFlowError;
pub use flow::{
    CeremonyFlows, CeremonyOrchestrator, FlowOptions, RunReport, RunState, TransportErrorPolicy,
};
pub use relying_party::{HttpRelyingParty, RelyingParty, RelyingPartyConfig};
pub use report::{
    DiagnosticSink, FailureReason, PASS_MARKER, RunStatus, StatusReporter, TraceEntry,
};
pub use types::{CeremonyKind, CeremonyOptions, CeremonyResponse, Identity, VerificationResult};
