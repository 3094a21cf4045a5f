//! # Failure subscriber trait.
//!
//! Provides [`Subscribe`], an extension point for plugging async handlers
//! (metrics, alerting, audit) into a custodian's failure stream.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently of the emitting thread)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Architecture
//! ```text
//! dispatch ──► report(failure) ──► SubscriberSet ──► [bounded queue] ──► worker ──► on_failure()
//!                                                                            └─► panic caught → warn!
//! ```
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the failure **for this subscriber only**.
//! - Failures are processed sequentially (FIFO) per subscriber.
//! - Subscribers never block the emitting thread.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use listener_custodian::{ListenerFailure, Subscribe};
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_failure(&self, failure: &ListenerFailure) {
//!         if failure.is_panic() {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "alerts" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use async_trait::async_trait;

use crate::failure::ListenerFailure;

/// Async observer of listener failures.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single failure.
    ///
    /// Called from a dedicated worker task, never on the emitting thread.
    async fn on_failure(&self, failure: &ListenerFailure);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber (clamped to at least 1).
    ///
    /// Default: 256.
    fn queue_capacity(&self) -> usize {
        256
    }
}
