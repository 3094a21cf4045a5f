//! # SubscriberSet: non-blocking fan-out of failures
//!
//! [`SubscriberSet`] hands each [`ListenerFailure`] to multiple subscribers
//! **without awaiting** their processing, so the synchronous dispatch that
//! produced it is never held up.
//!
//! ## What it guarantees
//! - `emit(&ListenerFailure)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (the failure is dropped for
//!   that subscriber).
//!
//! ## Diagram
//! ```text
//!    emit(&ListenerFailure)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_failure()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_failure()
//!        └────────────────► [queue SN] ─► worker SN ─► on_failure()
//! ```
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state
//! inconsistent if a subscriber panics while holding a lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::error::ListenerError;
use crate::failure::ListenerFailure;

use super::Subscribe;

/// Per-subscriber channel with metadata
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<ListenerFailure>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// # Panics
    /// Spawning requires a Tokio runtime when `subs` is not empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<ListenerFailure>>(cap);
            let s = Arc::clone(&sub);

            let handle = tokio::spawn(async move {
                while let Some(failure) = rx.recv().await {
                    let fut = s.on_failure(failure.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = ListenerError::from_panic(panic_err.as_ref());
                        warn!(subscriber = s.name(), error = %info, "failure subscriber panicked");
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one failure to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full** or **closed**, the failure is dropped
    /// for it and a warning is logged with the subscriber's name.
    pub fn emit(&self, failure: &ListenerFailure) {
        let shared = Arc::new(failure.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&shared)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        subscriber = channel.name,
                        seq = failure.seq,
                        "failure dropped: queue full"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(
                        subscriber = channel.name,
                        seq = failure.seq,
                        "failure dropped: worker closed"
                    );
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.channels.iter().map(|c| c.name).collect();
        f.debug_struct("SubscriberSet")
            .field("subscribers", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_failure(&self, failure: &ListenerFailure) {
            self.seen.lock().push(failure.position);
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Explode;

    #[async_trait]
    impl Subscribe for Explode {
        async fn on_failure(&self, _failure: &ListenerFailure) {
            panic!("subscriber exploded");
        }

        fn name(&self) -> &'static str {
            "explode"
        }
    }

    fn failure(position: usize) -> ListenerFailure {
        ListenerFailure::new("tick", position, ListenerError::fail("x"))
    }

    #[tokio::test]
    async fn test_fan_out_preserves_per_subscriber_order() {
        let collect = Arc::new(Collect::default());
        let set = SubscriberSet::new(vec![
            collect.clone() as Arc<dyn Subscribe>,
            Arc::new(Explode) as Arc<dyn Subscribe>,
        ]);
        assert_eq!(set.len(), 2);

        set.emit(&failure(0));
        set.emit(&failure(1));
        set.emit(&failure(2));
        set.shutdown().await;

        assert_eq!(*collect.seen.lock(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_empty_set() {
        let set = SubscriberSet::new(Vec::new());
        assert!(set.is_empty());
        set.emit(&failure(0));
        set.shutdown().await;
    }
}
