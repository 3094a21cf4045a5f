//! # Broadcast stream of listener failures.
//!
//! [`FailureBus`] is a thin wrapper around [`tokio::sync::broadcast`] that
//! lets async consumers observe every failure a custodian reports, next to
//! (not instead of) the synchronous `"error"` signal.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never fails the dispatch.
//! - **Bounded capacity**: one ring buffer is shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: failures are lost if nobody is subscribed at publish time.

use tokio::sync::broadcast;

use super::report::ListenerFailure;

/// Broadcast channel for listener failures.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct FailureBus {
    tx: broadcast::Sender<ListenerFailure>,
}

impl FailureBus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<ListenerFailure>(capacity);
        Self { tx }
    }

    /// Publishes a failure to all active receivers.
    ///
    /// If there are no receivers, the failure is dropped.
    pub fn publish(&self, failure: ListenerFailure) {
        let _ = self.tx.send(failure);
    }

    /// Creates a receiver that observes failures published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ListenerFailure> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerError;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = FailureBus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(ListenerFailure::new("tick", 0, ListenerError::fail("x")));

        let got = rx.recv().await.unwrap();
        assert_eq!(got.event.as_ref(), "tick");
        assert_eq!(bus.receiver_count(), 1);
    }

    #[test]
    fn test_publish_without_receivers_is_dropped() {
        let bus = FailureBus::new(0);
        bus.publish(ListenerFailure::new("tick", 0, ListenerError::fail("x")));
        assert_eq!(bus.receiver_count(), 0);
    }
}
