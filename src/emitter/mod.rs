//! Native emitter: listeners, ordered storage and the registration surfaces.
//!
//! ## Contents
//! - [`EventEmitter`] synchronous named-event emitter
//! - [`Listener`], [`Emission`] listener handle and per-emission context
//! - [`Listen`] registration API (emitter and custodian)
//! - [`Intercept`] capability set an interceptor provides for one event
//! - [`OneShot`] two-state one-shot registration

mod event_emitter;
mod list;
mod listen;
mod listener;
mod once;

pub(crate) use list::{ListenerList, Position};

pub use event_emitter::{ERROR_EVENT, EventEmitter};
pub use listen::{Intercept, Listen, ListenOptions};
pub use listener::{Emission, Listener, ListenerResult};
pub use once::{OneShot, OneShotState};
