//! Listener failures: the record, the broadcast stream and fallback sinks.
//!
//! ## Contents
//! - [`ListenerFailure`] payload of the custodian's `"error"` signal
//! - [`FailureBus`] thin wrapper over `tokio::sync::broadcast`
//! - [`DiagnosticSink`], [`StderrSink`], [`TracingSink`] fallback destinations

mod bus;
mod report;
mod sink;

pub use bus::FailureBus;
pub use report::ListenerFailure;
pub use sink::{DiagnosticSink, StderrSink, TracingSink};
