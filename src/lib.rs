//! # listener-custodian
//!
//! **listener-custodian** takes custody of every listener registered for one
//! named event on an [`EventEmitter`]. Each listener runs in isolation: when
//! one fails (returns an error or panics) the remaining listeners still run,
//! and the failure is reported on the custodian's own `"error"` signal
//! instead of escaping from [`EventEmitter::emit`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Listener A  │   │  Listener B  │   │  Listener C  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ add/prepend/once/remove (routed)    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventEmitter                                                     │
//! │  - native listener lists per event name                           │
//! │  - one Intercept per event name (installed by a Custodian)        │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ emit("event") ──► dispatch handler (the only native listener)
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Custodian                                                        │
//! │  - managed list (order + one-shot kind preserved)                 │
//! │  - per-listener isolation (Err and panic)                         │
//! │  - fallback reporter (DiagnosticSink) for unhandled rejections    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   "error" signal     FailureBus        SubscriberSet
//!   (synchronous)     (broadcast)      (per-sub queues)
//!                                    ┌────────┼────────┐
//!                                    ▼        ▼        ▼
//!                                 worker1  worker2  workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Custodian::new(emitter, "event")
//!   ├─► activate()    native listeners ──► managed list, dispatcher installed
//!   ├─► emit(..)      dispatcher runs managed listeners, failures ──► "error"
//!   └─► deactivate()  managed list ──► native listeners, dispatcher removed
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------------|---------------------------------------------|
//! | **Custody**       | Intercept one event's listeners and isolate their failures.       | [`Custodian`], [`CustodianBuilder`]         |
//! | **Emitter**       | Synchronous named-event emitter with interception seams.          | [`EventEmitter`], [`Listen`], [`Intercept`] |
//! | **Listeners**     | Shared, identity-compared callbacks and one-shot wrappers.        | [`Listener`], [`OneShot`], [`Emission`]     |
//! | **Failures**      | Failure records, broadcast stream and fallback sinks.             | [`ListenerFailure`], [`DiagnosticSink`]     |
//! | **Subscriber API**| Async hooks for failures (logging, metrics, alerting).            | [`Subscribe`]                               |
//! | **Errors**        | Typed errors for listeners and native emission.                   | [`ListenerError`], [`EmitError`]            |
//! | **Configuration** | Fallback policy and failure stream capacity.                      | [`CustodianConfig`], [`FallbackPolicy`]     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use listener_custodian::{Custodian, EventEmitter, Listen, Listener, ListenerError};
//!
//! let emitter = Arc::new(EventEmitter::<String>::new());
//! emitter
//!     .add_listener("order", Listener::infallible(|e| println!("audit {}", e.args())))
//!     .add_listener("order", Listener::new(|_| Err(ListenerError::fail("inventory offline"))))
//!     .add_listener("order", Listener::infallible(|e| println!("email {}", e.args())));
//!
//! let custodian = Custodian::new(Arc::clone(&emitter), "order");
//! custodian
//!     .activate()
//!     .on("error", Listener::infallible(|e| eprintln!("{}", e.args())));
//!
//! // All three listeners run; the failure goes to the "error" handler.
//! assert!(emitter.emit("order", &"#42".to_string()).is_ok());
//!
//! custodian.deactivate();
//! assert_eq!(emitter.listener_count("order"), 3);
//! ```
mod core;
mod emitter;
mod error;
mod failure;
mod subscribers;

// ---- Public re-exports ----

pub use core::{
    Custodian, CustodianBuilder, CustodianConfig, FallbackPolicy, UNHANDLED_REJECTION_EVENTS,
    is_rejection_event,
};
pub use emitter::{
    ERROR_EVENT, Emission, EventEmitter, Intercept, Listen, ListenOptions, Listener,
    ListenerResult, OneShot, OneShotState,
};
pub use error::{EmitError, ListenerError};
pub use failure::{DiagnosticSink, FailureBus, ListenerFailure, StderrSink, TracingSink};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
