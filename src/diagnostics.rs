//! Diagnostic sinks.
//!
//! Searches report failures and malformed responses here instead of returning
//! them. Sinks are fire-and-forget and never influence search results.

use std::sync::{Mutex, PoisonError};

/// Receives diagnostic messages from directory searches.
pub trait DiagnosticSink: Send + Sync {
    /// Report an error.
    fn error(&self, message: &str);

    /// Return the sink name for logging.
    fn name(&self) -> &str;
}

/// Forwards diagnostics to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn error(&self, message: &str) {
        tracing::error!(target: "directory_search::diagnostics", "{}", message);
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

/// Discards diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn error(&self, message: &str) {
        tracing::trace!(diagnostic = %message, "Diagnostic discarded (null sink)");
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// Collects diagnostics in memory, for tests and callers that inspect them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl DiagnosticSink for RecordingSink {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn name(&self) -> &str {
        "recording"
    }
}
