//! Diagnostics side channel.
//!
//! The query engine never lets a lookup failure escape; it reports it here
//! and degrades to "no result". Which sink receives the report is chosen by
//! whoever builds the engine.

use parking_lot::Mutex;

/// One swallowed failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Engine operation that hit the failure, e.g. `"branch_entry"`.
    pub operation: &'static str,
    /// Identifiers involved, rendered for humans.
    pub subject: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.operation, self.subject, self.message)
    }
}

/// Receiver for diagnostics. Must not influence query results.
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::error!(
            operation = diagnostic.operation,
            subject = %diagnostic.subject,
            "{}",
            diagnostic.message
        );
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.records.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl DiagnosticsSink for RecordingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.records.lock().push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        let diagnostic = Diagnostic {
            operation: "node",
            subject: "node 4".into(),
            message: "node 4 not found".into(),
        };
        sink.report(&diagnostic);
        TracingSink.report(&diagnostic);

        assert_eq!(sink.diagnostics(), vec![diagnostic.clone()]);
        assert_eq!(diagnostic.to_string(), "node [node 4]: node 4 not found");

        sink.clear();
        assert!(sink.is_empty());
    }
}
