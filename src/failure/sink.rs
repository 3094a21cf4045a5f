//! # Diagnostic sinks for the fallback reporter.
//!
//! When a custodian installs its fallback `"error"` handler, failures are
//! written to a [`DiagnosticSink`]. The default is [`StderrSink`].
//!
//! ## Example output
//! ```text
//! [custodian] unhandled listener failure: listener #1 for 'unhandledRejection' failed: listener failed: boom
//! ```

use std::io::Write;

use crate::failure::report::ListenerFailure;

/// Destination for failures that reached the fallback reporter.
pub trait DiagnosticSink: Send + Sync + 'static {
    /// Writes one failure.
    fn report(&self, failure: &ListenerFailure);
}

/// Writes failures to the process's standard error stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, failure: &ListenerFailure) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "[custodian] unhandled listener failure: {failure}");
    }
}

/// Writes failures as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, failure: &ListenerFailure) {
        tracing::error!(
            event = %failure.event,
            position = failure.position,
            seq = failure.seq,
            kind = failure.error.as_label(),
            error = %failure.error,
            "unhandled listener failure"
        );
    }
}
