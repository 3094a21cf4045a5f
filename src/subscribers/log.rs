//! # LogWriter: simple failure printer
//!
//! A minimal subscriber that prints incoming [`ListenerFailure`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [failed] event="tick" listener=1 seq=0 err="listener failed: boom"
//! [panicked] event="tick" listener=2 seq=1 info="listener panicked: index out of bounds"
//! ```

use async_trait::async_trait;

use crate::failure::ListenerFailure;
use crate::subscribers::Subscribe;

/// Failure writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_failure(&self, f: &ListenerFailure) {
        if f.is_panic() {
            println!(
                "[panicked] event={:?} listener={} seq={} info={:?}",
                f.event,
                f.position,
                f.seq,
                f.error.to_string()
            );
        } else {
            println!(
                "[failed] event={:?} listener={} seq={} err={:?}",
                f.event,
                f.position,
                f.seq,
                f.error.to_string()
            );
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
