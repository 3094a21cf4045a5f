//! # Dispatch handler: runs the managed listeners with failure isolation.
//!
//! One call per emission of the managed event:
//! ```text
//! snapshot(managed) ──► for (position, listener):
//!                          catch_unwind(invoke) ──► Ok        → next
//!                                               ├─► Err(e)    → report
//!                                               └─► panic     → report
//! report(failure):
//!   verify_fallback() ──► bus.publish ──► subscribers.emit ──► errors.emit("error")
//! ```
//!
//! The snapshot is taken up front, so listeners added or removed during a
//! dispatch only affect the next emission.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::emitter::{ERROR_EVENT, Emission, Listen, Listener};
use crate::error::{EmitError, ListenerError};
use crate::failure::ListenerFailure;

use super::custodian::Inner;

impl<A: 'static> Inner<A> {
    /// Invokes every managed listener in order, reporting each failure.
    pub(super) fn dispatch(&self, emission: &Emission<'_, A>) {
        let snapshot = self.managed.snapshot();
        trace!(event = %self.event, listeners = snapshot.len(), "dispatching");

        for (position, registration) in snapshot.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| registration.invoke(emission)));
            let error = match outcome {
                Ok(None) | Ok(Some(Ok(()))) => continue,
                Ok(Some(Err(error))) => error,
                Err(payload) => ListenerError::from_panic(payload.as_ref()),
            };
            self.report(ListenerFailure::new(Arc::clone(&self.event), position, error));
        }
    }

    fn report(&self, failure: ListenerFailure) {
        self.verify_fallback();
        self.bus.publish(failure.clone());
        if let Some(set) = self.subscribers.lock().as_ref() {
            set.emit(&failure);
        }

        let delivered =
            panic::catch_unwind(AssertUnwindSafe(|| self.errors.emit(ERROR_EVENT, &failure)));
        match delivered {
            Ok(Ok(_)) => {}
            Ok(Err(EmitError::UnhandledError { .. })) => {
                warn!(
                    event = %failure.event,
                    position = failure.position,
                    error = %failure.error,
                    "listener failure dropped: no error handler"
                );
            }
            Ok(Err(err)) => {
                warn!(event = %failure.event, error = %err, "error handler failed");
            }
            Err(payload) => {
                let info = ListenerError::from_panic(payload.as_ref());
                warn!(event = %failure.event, error = %info, "error handler panicked");
            }
        }
    }

    /// Installs the fallback reporter when eligible and nobody else listens for `"error"`.
    fn verify_fallback(&self) {
        if !self.fallback_eligible {
            return;
        }
        let mut fallback = self.fallback.lock();
        if fallback.is_some() || self.errors.listener_count(ERROR_EVENT) > 0 {
            return;
        }

        let sink = Arc::clone(&self.sink);
        let reporter = Listener::infallible(move |e: &Emission<'_, ListenerFailure>| {
            sink.report(e.args());
        });
        self.errors.add_listener(ERROR_EVENT, reporter.clone());
        *fallback = Some(reporter);
        debug!(event = %self.event, "fallback reporter installed");
    }
}
