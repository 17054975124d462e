mod config;
mod flows;
mod orchestrator;
mod types;

pub use flows::CeremonyFlows;
pub use orchestrator::CeremonyOrchestrator;
pub use types::{FlowOptions, RunReport, RunState, TransportErrorPolicy};
