mod sink;
mod status;

pub use sink::{DiagnosticSink, TraceEntry};
pub use status::{FailureReason, PASS_MARKER, RunStatus, StatusReporter};

pub(crate) use sink::render_entries;
