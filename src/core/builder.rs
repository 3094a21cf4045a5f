use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    emitter::{EventEmitter, ListenerList},
    failure::{DiagnosticSink, FailureBus, StderrSink},
    subscribers::{Subscribe, SubscriberSet},
};

use super::{
    config::CustodianConfig,
    custodian::{Custodian, Inner},
};

/// Builder for constructing a [`Custodian`] with optional features.
pub struct CustodianBuilder<A: 'static> {
    emitter: Arc<EventEmitter<A>>,
    event: Arc<str>,
    cfg: CustodianConfig,
    sink: Arc<dyn DiagnosticSink>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<A: 'static> CustodianBuilder<A> {
    /// Creates a builder for `event` on `emitter` with default configuration.
    pub fn new(emitter: Arc<EventEmitter<A>>, event: impl Into<Arc<str>>) -> Self {
        Self {
            emitter,
            event: event.into(),
            cfg: CustodianConfig::default(),
            sink: Arc::new(StderrSink),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: CustodianConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets where the fallback reporter writes. Default: [`StderrSink`].
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets failure subscribers.
    ///
    /// Subscribers receive every reported failure through dedicated workers
    /// with bounded queues. A non-empty list requires a Tokio runtime at
    /// [`build`](Self::build).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds an inactive custodian.
    pub fn build(self) -> Custodian<A> {
        let fallback_eligible = self
            .cfg
            .fallback
            .is_fallback_eligible(&self.emitter, &self.event);
        let subscribers = if self.subscribers.is_empty() {
            None
        } else {
            Some(SubscriberSet::new(self.subscribers))
        };

        Custodian::from_inner(Inner {
            emitter: self.emitter,
            event: self.event,
            managed: ListenerList::new(),
            errors: EventEmitter::new(),
            interception: Mutex::new(None),
            fallback_eligible,
            fallback: Mutex::new(None),
            sink: self.sink,
            bus: FailureBus::new(self.cfg.bus_capacity_clamped()),
            subscribers: Mutex::new(subscribers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FallbackPolicy;
    use crate::emitter::{Listen, Listener};
    use crate::error::ListenerError;
    use crate::failure::ListenerFailure;
    use async_trait::async_trait;

    #[derive(Default)]
    struct Positions {
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Subscribe for Positions {
        async fn on_failure(&self, failure: &ListenerFailure) {
            self.seen.lock().push(failure.position);
        }

        fn name(&self) -> &'static str {
            "positions"
        }
    }

    #[test]
    fn test_default_build_is_inactive() {
        let emitter = Arc::new(EventEmitter::<u32>::new());
        let custodian = CustodianBuilder::new(Arc::clone(&emitter), "tick").build();
        assert!(!custodian.is_active());
        assert_eq!(custodian.event(), "tick");
        assert!(!custodian.is_fallback_eligible());
    }

    #[test]
    fn test_fallback_eligibility_follows_policy() {
        let emitter = Arc::new(EventEmitter::<u32>::process_wide());
        let eligible = CustodianBuilder::new(Arc::clone(&emitter), "unhandledRejection").build();
        assert!(eligible.is_fallback_eligible());

        let disabled = CustodianBuilder::new(Arc::clone(&emitter), "unhandledRejection")
            .with_config(CustodianConfig {
                fallback: FallbackPolicy::Disabled,
                ..CustodianConfig::default()
            })
            .build();
        assert!(!disabled.is_fallback_eligible());
    }

    #[tokio::test]
    async fn test_subscribers_receive_failures() {
        let positions = Arc::new(Positions::default());
        let emitter = Arc::new(EventEmitter::<u32>::new());
        emitter
            .add_listener("tick", Listener::infallible(|_| {}))
            .add_listener("tick", Listener::new(|_| Err(ListenerError::fail("late"))));

        let custodian = CustodianBuilder::new(Arc::clone(&emitter), "tick")
            .with_subscribers(vec![positions.clone() as Arc<dyn Subscribe>])
            .build();
        custodian.activate();

        emitter.emit("tick", &1).unwrap();
        emitter.emit("tick", &2).unwrap();
        custodian.shutdown_subscribers().await;

        assert_eq!(*positions.seen.lock(), vec![1, 1]);
    }
}
