//! # Native event emitter.
//!
//! [`EventEmitter`] is a synchronous, named-event emitter: listeners are kept
//! per event name in registration order and invoked on the caller's thread.
//!
//! ## Rules
//! - `emit` iterates a snapshot: listeners added during an emission run from
//!   the next emission on; listeners removed during an emission still run in
//!   the current one.
//! - `emit` stops at the first listener that returns an error and hands it
//!   back as [`EmitError::Listener`]; panics unwind to the caller.
//! - Emitting [`ERROR_EVENT`] with no listener returns
//!   [`EmitError::UnhandledError`].
//! - No lock is held while a listener runs.
//!
//! ## Interception
//! Each event name has a stack of [`Intercept`]s. The [`Listen`] calls for
//! that event are routed to the top of the stack; with an empty stack they
//! apply natively. Interceptors reach the real lists through
//! [`EventEmitter::native`]. An interceptor can leave the stack from any
//! position; the one above it then inherits its listeners.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::emitter::list::{ListenerList, Position, Registration};
use crate::emitter::listen::{Intercept, Listen, ListenOptions};
use crate::emitter::listener::{Emission, Listener};
use crate::error::EmitError;

/// Name of the event that must not go unheard.
pub const ERROR_EVENT: &str = "error";

/// Synchronous named-event emitter.
pub struct EventEmitter<A> {
    events: Mutex<HashMap<String, Arc<ListenerList<A>>>>,
    interceptors: Mutex<HashMap<String, Vec<Weak<dyn Intercept<A>>>>>,
    process_wide: bool,
}

impl<A: 'static> EventEmitter<A> {
    /// Creates an empty emitter.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            interceptors: Mutex::new(HashMap::new()),
            process_wide: false,
        }
    }

    /// Creates an empty emitter marked as the process-wide default.
    ///
    /// A custodian over a process-wide emitter and an unhandled-rejection
    /// style event is eligible for the fallback reporter.
    pub fn process_wide() -> Self {
        Self {
            process_wide: true,
            ..Self::new()
        }
    }

    /// True if created with [`EventEmitter::process_wide`].
    pub fn is_process_wide(&self) -> bool {
        self.process_wide
    }

    /// Listeners currently registered natively for `event`, in execution order.
    pub fn listeners(&self, event: &str) -> Vec<Listener<A>> {
        self.existing(event)
            .map(|list| list.listeners())
            .unwrap_or_default()
    }

    /// Number of native listeners for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.existing(event).map(|list| list.len()).unwrap_or(0)
    }

    /// Names of events that currently have native listeners.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .events
            .lock()
            .iter()
            .filter(|(_, list)| list.len() > 0)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// Emits `event` to every native listener, in order.
    ///
    /// Returns `Ok(true)` if at least one listener was registered.
    pub fn emit(&self, event: &str, args: &A) -> Result<bool, EmitError> {
        let snapshot = self
            .existing(event)
            .map(|list| list.snapshot())
            .unwrap_or_default();

        if snapshot.is_empty() {
            if event == ERROR_EVENT {
                return Err(EmitError::UnhandledError {
                    event: event.into(),
                });
            }
            return Ok(false);
        }

        let emission = Emission::new(event, self, args);
        for registration in &snapshot {
            if let Some(Err(source)) = registration.invoke(&emission) {
                return Err(EmitError::Listener {
                    event: event.into(),
                    source,
                });
            }
        }
        Ok(true)
    }

    /// Registration surface that bypasses interception.
    pub(crate) fn native(&self) -> Native<'_, A> {
        Native { emitter: self }
    }

    /// Installs `interceptor` on top of `event`'s interceptor stack and takes
    /// the native listeners it now guards, leaving `dispatcher` as the only one.
    ///
    /// Runs under the interceptor lock, so a concurrent registration is
    /// either captured here or routed to `interceptor`.
    pub(crate) fn take_custody(
        &self,
        event: &str,
        interceptor: Weak<dyn Intercept<A>>,
        dispatcher: Listener<A>,
    ) -> Vec<Registration<A>> {
        let mut interceptors = self.interceptors.lock();
        let captured = self.slot(event).drain();
        self.native().add_listener(event, dispatcher);
        interceptors
            .entry(event.to_owned())
            .or_default()
            .push(interceptor);
        captured
    }

    /// Removes `interceptor` from `event`'s stack and hands `entries` back.
    ///
    /// When nothing live sits above it, `dispatcher` is replaced by `entries`
    /// on the native list and `None` is returned. Otherwise the interceptor
    /// directly above holds `dispatcher`; it is returned with `entries` so the
    /// caller can hand them over outside the lock.
    pub(crate) fn release_custody(
        &self,
        event: &str,
        interceptor: &Weak<dyn Intercept<A>>,
        dispatcher: &Listener<A>,
        entries: Vec<Registration<A>>,
    ) -> Option<(Arc<dyn Intercept<A>>, Vec<Registration<A>>)> {
        let mut interceptors = self.interceptors.lock();
        let above = match interceptors.get_mut(event) {
            Some(stack) => {
                let above = match stack.iter().position(|w| Weak::ptr_eq(w, interceptor)) {
                    Some(idx) => {
                        stack.remove(idx);
                        stack[idx..].iter().find_map(Weak::upgrade)
                    }
                    None => None,
                };
                if stack.is_empty() {
                    interceptors.remove(event);
                }
                above
            }
            None => None,
        };

        if let Some(above) = above {
            return Some((above, entries));
        }

        let native = self.native();
        native.remove_listener(event, dispatcher);
        for registration in entries {
            let options = ListenOptions {
                once: registration.is_once(),
            };
            native.add_listener_with(event, registration.listener().clone(), options);
        }
        None
    }

    /// Sends a registration call to the top interceptor of `event`, or applies
    /// it natively. Native registration happens under the interceptor lock.
    fn route(
        &self,
        event: &str,
        intercepted: impl FnOnce(&dyn Intercept<A>),
        native: impl FnOnce(Native<'_, A>),
    ) {
        let interceptors = self.interceptors.lock();
        let top = interceptors
            .get(event)
            .and_then(|stack| stack.last())
            .and_then(Weak::upgrade);
        match top {
            Some(interceptor) => {
                drop(interceptors);
                intercepted(interceptor.as_ref());
            }
            None => {
                native(self.native());
                drop(interceptors);
            }
        }
    }

    fn existing(&self, event: &str) -> Option<Arc<ListenerList<A>>> {
        self.events.lock().get(event).cloned()
    }

    fn slot(&self, event: &str) -> Arc<ListenerList<A>> {
        let mut events = self.events.lock();
        Arc::clone(
            events
                .entry(event.to_owned())
                .or_insert_with(ListenerList::new),
        )
    }
}

impl<A: 'static> Default for EventEmitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventEmitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = self.events.lock();
        let mut counts: Vec<(&str, usize)> = events
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        counts.sort_unstable();
        f.debug_struct("EventEmitter")
            .field("events", &counts)
            .field("process_wide", &self.process_wide)
            .finish()
    }
}

impl<A: 'static> Listen<A> for EventEmitter<A> {
    fn add_listener_with(&self, event: &str, listener: Listener<A>, options: ListenOptions) -> &Self {
        self.route(
            event,
            |i| i.register_trailing(listener.clone(), options),
            |n| {
                n.add_listener_with(event, listener.clone(), options);
            },
        );
        self
    }

    fn prepend_listener_with(
        &self,
        event: &str,
        listener: Listener<A>,
        options: ListenOptions,
    ) -> &Self {
        self.route(
            event,
            |i| i.register_leading(listener.clone(), options),
            |n| {
                n.prepend_listener_with(event, listener.clone(), options);
            },
        );
        self
    }

    fn prepend_once_listener(&self, event: &str, listener: Listener<A>) -> &Self {
        self.route(
            event,
            |i| i.register_once_leading(listener.clone()),
            |n| {
                n.prepend_once_listener(event, listener.clone());
            },
        );
        self
    }

    fn once(&self, event: &str, listener: Listener<A>) -> &Self {
        self.route(
            event,
            |i| i.register_once_trailing(listener.clone()),
            |n| {
                n.once(event, listener.clone());
            },
        );
        self
    }

    fn remove_listener(&self, event: &str, listener: &Listener<A>) -> &Self {
        self.route(
            event,
            |i| i.remove_one(listener),
            |n| {
                n.remove_listener(event, listener);
            },
        );
        self
    }

    fn remove_all_listeners(&self, event: &str) -> &Self {
        self.route(
            event,
            |i| i.remove_all(),
            |n| {
                n.remove_all_listeners(event);
            },
        );
        self
    }
}

/// Registration surface over the emitter's own lists, ignoring interceptors.
pub(crate) struct Native<'e, A> {
    emitter: &'e EventEmitter<A>,
}

impl<A: 'static> Native<'_, A> {
    fn push(&self, event: &str, listener: Listener<A>, at: Position, once: bool) {
        let slot = self.emitter.slot(event);
        if once {
            slot.push_once(listener, at);
        } else {
            slot.push(listener, at);
        }
    }
}

impl<A: 'static> Listen<A> for Native<'_, A> {
    fn add_listener_with(&self, event: &str, listener: Listener<A>, options: ListenOptions) -> &Self {
        self.push(event, listener, Position::Back, options.once);
        self
    }

    fn prepend_listener_with(
        &self,
        event: &str,
        listener: Listener<A>,
        options: ListenOptions,
    ) -> &Self {
        self.push(event, listener, Position::Front, options.once);
        self
    }

    fn prepend_once_listener(&self, event: &str, listener: Listener<A>) -> &Self {
        self.push(event, listener, Position::Front, true);
        self
    }

    fn once(&self, event: &str, listener: Listener<A>) -> &Self {
        self.push(event, listener, Position::Back, true);
        self
    }

    fn remove_listener(&self, event: &str, listener: &Listener<A>) -> &Self {
        if let Some(list) = self.emitter.existing(event) {
            list.remove(listener);
        }
        self
    }

    fn remove_all_listeners(&self, event: &str) -> &Self {
        self.emitter.events.lock().remove(event);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerError;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn record(log: &Log, tag: &'static str) -> Listener<u32> {
        let log = Arc::clone(log);
        Listener::infallible(move |_| log.lock().push(tag))
    }

    fn failing(log: &Log, tag: &'static str) -> Listener<u32> {
        let log = Arc::clone(log);
        Listener::new(move |_| {
            log.lock().push(tag);
            Err(ListenerError::fail(tag))
        })
    }

    #[test]
    fn test_emit_runs_listeners_in_registration_order() {
        let log: Log = Arc::default();
        let emitter = EventEmitter::new();
        emitter
            .add_listener("tick", record(&log, "a"))
            .add_listener("tick", record(&log, "b"))
            .prepend_listener("tick", record(&log, "first"));

        assert!(emitter.emit("tick", &1).unwrap());
        assert_eq!(*log.lock(), vec!["first", "a", "b"]);
    }

    #[test]
    fn test_emit_without_listeners() {
        let emitter = EventEmitter::<u32>::new();
        assert!(!emitter.emit("tick", &1).unwrap());
        assert!(matches!(
            emitter.emit(ERROR_EVENT, &1),
            Err(EmitError::UnhandledError { .. })
        ));
    }

    #[test]
    fn test_once_and_prepend_once_fire_once() {
        let log: Log = Arc::default();
        let emitter = EventEmitter::new();
        emitter
            .add_listener("tick", record(&log, "steady"))
            .once("tick", record(&log, "once"))
            .prepend_once_listener("tick", record(&log, "early"));
        assert_eq!(emitter.listener_count("tick"), 3);

        emitter.emit("tick", &1).unwrap();
        emitter.emit("tick", &2).unwrap();
        assert_eq!(*log.lock(), vec!["early", "steady", "once", "steady"]);
        assert_eq!(emitter.listener_count("tick"), 1);
    }

    #[test]
    fn test_add_listener_with_once_option() {
        let log: Log = Arc::default();
        let emitter = EventEmitter::new();
        emitter.prepend_listener_with("tick", record(&log, "p"), ListenOptions::ONCE);
        emitter.add_listener_with("tick", record(&log, "a"), ListenOptions::ONCE);
        emitter.emit("tick", &1).unwrap();
        emitter.emit("tick", &1).unwrap();
        assert_eq!(*log.lock(), vec!["p", "a"]);
    }

    #[test]
    fn test_remove_by_identity() {
        let log: Log = Arc::default();
        let emitter = EventEmitter::new();
        let b = record(&log, "b");
        emitter
            .add_listener("tick", record(&log, "a"))
            .add_listener("tick", b.clone())
            .add_listener("tick", record(&log, "c"));

        emitter.remove_listener("tick", &b);
        emitter.remove_listener("tick", &record(&log, "stranger"));
        emitter.remove_listener("other", &b);
        emitter.emit("tick", &1).unwrap();
        assert_eq!(*log.lock(), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_once_by_original_listener() {
        let log: Log = Arc::default();
        let emitter = EventEmitter::new();
        let once = record(&log, "once");
        emitter.once("tick", once.clone());
        emitter.remove_listener("tick", &once);
        assert_eq!(emitter.listener_count("tick"), 0);
    }

    #[test]
    fn test_remove_all_only_touches_one_event() {
        let log: Log = Arc::default();
        let emitter = EventEmitter::new();
        emitter
            .add_listener("tick", record(&log, "a"))
            .add_listener("tock", record(&log, "b"));
        emitter.remove_all_listeners("tick");
        assert_eq!(emitter.event_names(), vec!["tock".to_string()]);
    }

    #[test]
    fn test_first_failure_stops_native_emission() {
        let log: Log = Arc::default();
        let emitter = EventEmitter::new();
        emitter
            .add_listener("tick", record(&log, "a"))
            .add_listener("tick", failing(&log, "b"))
            .add_listener("tick", record(&log, "c"));

        let err = emitter.emit("tick", &1).unwrap_err();
        assert!(matches!(err, EmitError::Listener { .. }));
        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[test]
    fn test_mutation_during_emit_applies_next_time() {
        let log: Log = Arc::default();
        let emitter = Arc::new(EventEmitter::new());
        let late = record(&log, "late");
        let adder = {
            let late = late.clone();
            Listener::infallible(move |e: &Emission<'_, u32>| {
                e.emitter().add_listener("tick", late.clone());
            })
        };
        emitter.once("tick", adder);

        emitter.emit("tick", &1).unwrap();
        assert!(log.lock().is_empty());
        emitter.emit("tick", &2).unwrap();
        assert_eq!(*log.lock(), vec!["late"]);
    }

    #[test]
    fn test_process_wide_flag() {
        assert!(EventEmitter::<u32>::process_wide().is_process_wide());
        assert!(!EventEmitter::<u32>::new().is_process_wide());
    }
}
