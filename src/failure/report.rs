//! # Failure record carried by the custodian's `"error"` signal.
//!
//! ## Example
//! ```rust
//! use listener_custodian::{ListenerError, ListenerFailure};
//!
//! let f = ListenerFailure::new("tick", 2, ListenerError::fail("boom"));
//! assert_eq!(f.event.as_ref(), "tick");
//! assert_eq!(f.position, 2);
//! assert_eq!(f.to_string(), "listener #2 for 'tick' failed: listener failed: boom");
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::ListenerError;

/// Global sequence counter for failure ordering.
static FAILURE_SEQ: AtomicU64 = AtomicU64::new(0);

/// One isolated listener failure.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `position`: index of the listener in the dispatch snapshot
#[derive(Clone, Debug)]
pub struct ListenerFailure {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Managed event whose listener failed.
    pub event: Arc<str>,
    /// Index of the failing listener within the emission's snapshot.
    pub position: usize,
    /// What went wrong.
    pub error: ListenerError,
}

impl ListenerFailure {
    /// Creates a failure record with the current timestamp and next sequence number.
    pub fn new(event: impl Into<Arc<str>>, position: usize, error: ListenerError) -> Self {
        Self {
            seq: FAILURE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            event: event.into(),
            position,
            error,
        }
    }

    /// True if the listener panicked rather than returning an error.
    #[inline]
    pub fn is_panic(&self) -> bool {
        self.error.is_panic()
    }
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listener #{} for '{}' failed: {}",
            self.position, self.event, self.error
        )
    }
}
