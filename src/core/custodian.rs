//! # Custodian: takes custody of one event's listeners on one emitter.
//!
//! The [`Custodian`] intercepts every listener registered for its event and
//! runs them through a single dispatch handler that isolates each listener's
//! failure and reports it on the custodian's own `"error"` signal.
//!
//! ## Lifecycle
//! ```text
//! Custodian::new(emitter, "event")            inactive, emitter behaves natively
//!        │
//!        ▼ activate()
//!   under the emitter's interceptor lock:
//!   1. drain native listeners ──► managed list (order and one-shot kind kept)
//!   2. add dispatch handler as the only native listener
//!   3. push self onto the event's interceptor stack
//!        │
//!        │   emitter.emit("event", args)
//!        │       └─► dispatch handler ──► snapshot(managed) ──► for each: catch failure
//!        │                                                        └─► report ──► "error"
//!        ▼ deactivate()
//!   1. leave the interceptor stack
//!   2. top of the stack: dispatch handler replaced by the managed listeners natively
//!      below another custodian: that custodian drops our dispatch handler
//!      from its managed list and appends our managed listeners
//! ```
//!
//! ## Routing while active (calls for the managed event only)
//! | Call                                   | Lands in                              |
//! |----------------------------------------|---------------------------------------|
//! | `add_listener`                         | tail of the managed list              |
//! | `add_listener_with(.., ONCE)`          | native `once` (not isolated)          |
//! | `prepend_listener`                     | head of the managed list              |
//! | `prepend_listener_with(.., ONCE)`      | native, ahead of the dispatcher       |
//! | `prepend_once_listener`                | native, ahead of the dispatcher       |
//! | `once`                                 | one-shot at the tail of managed list  |
//! | `remove_listener`                      | managed list, by identity             |
//! | `remove_all_listeners`                 | clears the managed list               |
//!
//! Dropping the last handle of an active custodian deactivates it.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use listener_custodian::{Custodian, EventEmitter, Listen, Listener, ListenerError};
//!
//! let emitter = Arc::new(EventEmitter::<u32>::new());
//! emitter.add_listener("job", Listener::new(|_| Err(ListenerError::fail("boom"))));
//!
//! let custodian = Custodian::new(Arc::clone(&emitter), "job");
//! custodian
//!     .activate()
//!     .on("error", Listener::infallible(|e| eprintln!("caught: {}", e.args())));
//!
//! // The failure is reported on the custodian, not returned from emit().
//! assert!(emitter.emit("job", &1).is_ok());
//! assert_eq!(emitter.listener_count("job"), 1);
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::debug;

use crate::emitter::{
    ERROR_EVENT, Emission, EventEmitter, Intercept, Listen, ListenOptions, Listener, ListenerList,
    Position,
};
use crate::failure::{DiagnosticSink, FailureBus, ListenerFailure};
use crate::subscribers::SubscriberSet;

use super::builder::CustodianBuilder;

/// State held only while intercepting.
pub(super) struct Interception<A: 'static> {
    /// The native listener installed for the managed event.
    pub(super) dispatcher: Listener<A>,
    /// This custodian's entry in the emitter's interceptor stack.
    pub(super) interceptor: Weak<dyn Intercept<A>>,
}

/// Shared state behind every [`Custodian`] handle.
pub(super) struct Inner<A: 'static> {
    pub(super) emitter: Arc<EventEmitter<A>>,
    pub(super) event: Arc<str>,
    pub(super) managed: Arc<ListenerList<A>>,
    pub(super) errors: EventEmitter<ListenerFailure>,
    pub(super) interception: Mutex<Option<Interception<A>>>,
    pub(super) fallback_eligible: bool,
    pub(super) fallback: Mutex<Option<Listener<ListenerFailure>>>,
    pub(super) sink: Arc<dyn DiagnosticSink>,
    pub(super) bus: FailureBus,
    pub(super) subscribers: Mutex<Option<SubscriberSet>>,
}

impl<A: 'static> Inner<A> {
    /// Activation lock, held only while active.
    fn custody(&self) -> Option<MutexGuard<'_, Option<Interception<A>>>> {
        let guard = self.interception.lock();
        guard.is_some().then_some(guard)
    }

    /// Undoes activation. No-op when inactive.
    fn release(&self) {
        let mut interception = self.interception.lock();
        let Some(Interception {
            dispatcher,
            interceptor,
        }) = interception.take()
        else {
            return;
        };

        let entries = self.managed.drain();
        let restored = entries.len();
        let handback =
            self.emitter
                .release_custody(&self.event, &interceptor, &dispatcher, entries);

        if let Some((above, entries)) = handback {
            above.remove_one(&dispatcher);
            for registration in entries {
                let listener = registration.listener().clone();
                if registration.is_once() {
                    above.register_once_trailing(listener);
                } else {
                    above.register_trailing(listener, ListenOptions::default());
                }
            }
            debug!(event = %self.event, restored, "custodian left stacked custody");
        } else {
            debug!(event = %self.event, restored, "custodian deactivated");
        }
    }
}

impl<A: 'static> Drop for Inner<A> {
    fn drop(&mut self) {
        self.release();
    }
}

// A released custodian is no longer on the interceptor stack, so forwarding
// through the emitter reaches whoever holds custody now.
impl<A: 'static> Intercept<A> for Inner<A> {
    fn register_trailing(&self, listener: Listener<A>, options: ListenOptions) {
        let Some(_custody) = self.custody() else {
            self.emitter.add_listener_with(&self.event, listener, options);
            return;
        };
        if options.once {
            self.emitter.native().once(&self.event, listener);
        } else {
            self.managed.push(listener, Position::Back);
        }
    }

    fn register_leading(&self, listener: Listener<A>, options: ListenOptions) {
        let Some(_custody) = self.custody() else {
            self.emitter
                .prepend_listener_with(&self.event, listener, options);
            return;
        };
        if options.once {
            self.emitter
                .native()
                .prepend_once_listener(&self.event, listener);
        } else {
            self.managed.push(listener, Position::Front);
        }
    }

    fn register_once_trailing(&self, listener: Listener<A>) {
        let Some(_custody) = self.custody() else {
            self.emitter.once(&self.event, listener);
            return;
        };
        self.managed.push_once(listener, Position::Back);
    }

    fn register_once_leading(&self, listener: Listener<A>) {
        let Some(_custody) = self.custody() else {
            self.emitter.prepend_once_listener(&self.event, listener);
            return;
        };
        self.emitter
            .native()
            .prepend_once_listener(&self.event, listener);
    }

    fn remove_one(&self, listener: &Listener<A>) {
        let Some(_custody) = self.custody() else {
            self.emitter.remove_listener(&self.event, listener);
            return;
        };
        self.managed.remove(listener);
    }

    fn remove_all(&self) {
        let Some(_custody) = self.custody() else {
            self.emitter.remove_all_listeners(&self.event);
            return;
        };
        self.managed.drain();
    }
}

/// Takes custody of one event's listeners on one emitter.
///
/// Cheap to clone; clones share the same custody.
pub struct Custodian<A: 'static> {
    inner: Arc<Inner<A>>,
}

impl<A: 'static> Clone for Custodian<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: 'static> Custodian<A> {
    /// Creates an inactive custodian for `event` on `emitter` with default settings.
    pub fn new(emitter: Arc<EventEmitter<A>>, event: impl Into<Arc<str>>) -> Self {
        CustodianBuilder::new(emitter, event).build()
    }

    /// Starts a builder for custom configuration, sink or subscribers.
    pub fn builder(emitter: Arc<EventEmitter<A>>, event: impl Into<Arc<str>>) -> CustodianBuilder<A> {
        CustodianBuilder::new(emitter, event)
    }

    pub(super) fn from_inner(inner: Inner<A>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Managed event name.
    pub fn event(&self) -> &str {
        &self.inner.event
    }

    /// Managed emitter.
    pub fn emitter(&self) -> &Arc<EventEmitter<A>> {
        &self.inner.emitter
    }

    /// True while interception is installed.
    pub fn is_active(&self) -> bool {
        self.inner.interception.lock().is_some()
    }

    /// Whether the fallback reporter may be installed (decided at construction).
    pub fn is_fallback_eligible(&self) -> bool {
        self.inner.fallback_eligible
    }

    /// Listeners in the managed list, in execution order.
    ///
    /// Only meaningful while active; empty otherwise.
    pub fn managed(&self) -> Vec<Listener<A>> {
        self.inner.managed.listeners()
    }

    /// Starts intercepting. Idempotent.
    pub fn activate(&self) -> &Self {
        let inner = &self.inner;
        let mut interception = inner.interception.lock();
        if interception.is_some() {
            return self;
        }

        let weak = Arc::downgrade(inner);
        let dispatcher = Listener::new(move |emission: &Emission<'_, A>| {
            if let Some(inner) = weak.upgrade() {
                inner.dispatch(emission);
            }
            Ok(())
        });
        let as_interceptor: Arc<dyn Intercept<A>> = Arc::clone(inner) as Arc<dyn Intercept<A>>;
        let interceptor = Arc::downgrade(&as_interceptor);

        let captured =
            inner
                .emitter
                .take_custody(&inner.event, interceptor.clone(), dispatcher.clone());
        inner.managed.drain();
        for registration in &captured {
            inner.managed.adopt(registration);
        }

        *interception = Some(Interception {
            dispatcher,
            interceptor,
        });
        debug!(event = %inner.event, captured = captured.len(), "custodian activated");
        self
    }

    /// Stops intercepting and hands the managed listeners back to the emitter. Idempotent.
    pub fn deactivate(&self) -> &Self {
        self.inner.release();
        self
    }

    /// Registers `handler` for `signal` on the custodian's error channel.
    ///
    /// The only signal emitted is `"error"`, carrying a [`ListenerFailure`].
    /// Registering an `"error"` handler replaces the fallback reporter.
    pub fn on(&self, signal: &str, handler: Listener<ListenerFailure>) -> &Self {
        if signal == ERROR_EVENT {
            let replaced = self.inner.fallback.lock().take();
            if let Some(fallback) = replaced {
                self.inner.errors.remove_listener(ERROR_EVENT, &fallback);
                debug!(event = %self.inner.event, "fallback reporter replaced");
            }
        }
        self.inner.errors.add_listener(signal, handler);
        self
    }

    /// Removes `handler` from `signal`, or every handler of `signal` when `None`.
    pub fn off(&self, signal: &str, handler: Option<&Listener<ListenerFailure>>) -> &Self {
        match handler {
            Some(handler) => {
                self.inner.errors.remove_listener(signal, handler);
            }
            None => {
                self.inner.errors.remove_all_listeners(signal);
            }
        }

        if signal == ERROR_EVENT {
            let mut fallback = self.inner.fallback.lock();
            let gone = fallback
                .as_ref()
                .is_some_and(|f| !self.inner.errors.listeners(ERROR_EVENT).contains(f));
            if gone {
                *fallback = None;
            }
        }
        self
    }

    /// Receiver for every failure reported from now on.
    pub fn subscribe_failures(&self) -> broadcast::Receiver<ListenerFailure> {
        self.inner.bus.subscribe()
    }

    /// Closes the failure subscribers' queues and waits for their workers.
    pub async fn shutdown_subscribers(&self) {
        let set = self.inner.subscribers.lock().take();
        if let Some(set) = set {
            set.shutdown().await;
        }
    }
}

impl<A: 'static> Listen<A> for Custodian<A> {
    fn add_listener_with(&self, event: &str, listener: Listener<A>, options: ListenOptions) -> &Self {
        self.inner.emitter.add_listener_with(event, listener, options);
        self
    }

    fn prepend_listener_with(
        &self,
        event: &str,
        listener: Listener<A>,
        options: ListenOptions,
    ) -> &Self {
        self.inner
            .emitter
            .prepend_listener_with(event, listener, options);
        self
    }

    fn prepend_once_listener(&self, event: &str, listener: Listener<A>) -> &Self {
        self.inner.emitter.prepend_once_listener(event, listener);
        self
    }

    fn once(&self, event: &str, listener: Listener<A>) -> &Self {
        self.inner.emitter.once(event, listener);
        self
    }

    fn remove_listener(&self, event: &str, listener: &Listener<A>) -> &Self {
        self.inner.emitter.remove_listener(event, listener);
        self
    }

    fn remove_all_listeners(&self, event: &str) -> &Self {
        self.inner.emitter.remove_all_listeners(event);
        self
    }
}

impl<A: 'static> fmt::Debug for Custodian<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custodian")
            .field("event", &self.inner.event)
            .field("active", &self.is_active())
            .field("managed", &self.inner.managed.len())
            .field("fallback_eligible", &self.inner.fallback_eligible)
            .finish()
    }
}
