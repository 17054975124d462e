use serde::Serialize;

/// One labeled payload in a run trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub label: String,
    pub payload: String,
}

impl TraceEntry {
    fn render(&self) -> String {
        format!("// {}\n{}\n", self.label, self.payload)
    }
}

/// Append-only diagnostic trace of a single run.
///
/// Rendered for humans: each entry becomes a `// label` line followed by
/// the payload, with a blank line between entries.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    entries: Vec<TraceEntry>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, label: impl Into<String>, payload: impl Into<String>) {
        let entry = TraceEntry {
            label: label.into(),
            payload: payload.into(),
        };
        tracing::trace!("Trace entry appended: {}", entry.label);
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        render_entries(&self.entries)
    }
}

pub(crate) fn render_entries(entries: &[TraceEntry]) -> String {
    entries
        .iter()
        .map(TraceEntry::render)
        .collect::<Vec<_>>()
        .join("\n")
}
