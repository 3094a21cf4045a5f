//! # Registration surfaces.
//!
//! - [`Listen`] is the public registration API. It is implemented by
//!   [`EventEmitter`](crate::EventEmitter) and by
//!   [`Custodian`](crate::Custodian), so callers can be written against either.
//! - [`Intercept`] is the capability set an interceptor provides for one event.
//!   While an interceptor is installed for an event, the emitter's [`Listen`]
//!   calls for that event are routed to it instead of the native list.
//!
//! ```text
//! emitter.add_listener("tick", l)
//!     │
//!     ├─ interceptor for "tick"? ──► Intercept::register_trailing(l, opts)
//!     └─ none                    ──► native list for "tick"
//! ```

use crate::emitter::listener::Listener;

/// Modifiers for [`Listen::add_listener_with`] / [`Listen::prepend_listener_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenOptions {
    /// Remove the registration after its first invocation.
    pub once: bool,
}

impl ListenOptions {
    /// Options for a one-shot registration.
    pub const ONCE: ListenOptions = ListenOptions { once: true };
}

/// Registration API shared by the native emitter and the custodian proxy.
///
/// Every call returns `&Self` so calls can be chained.
pub trait Listen<A> {
    /// Appends `listener` to `event`, honoring `options`.
    fn add_listener_with(&self, event: &str, listener: Listener<A>, options: ListenOptions) -> &Self;

    /// Inserts `listener` ahead of the others for `event`, honoring `options`.
    fn prepend_listener_with(
        &self,
        event: &str,
        listener: Listener<A>,
        options: ListenOptions,
    ) -> &Self;

    /// Inserts a one-shot `listener` ahead of the others for `event`.
    fn prepend_once_listener(&self, event: &str, listener: Listener<A>) -> &Self;

    /// Appends a one-shot `listener` to `event`.
    fn once(&self, event: &str, listener: Listener<A>) -> &Self;

    /// Removes the first registration of `listener` (by identity). No-op if absent.
    fn remove_listener(&self, event: &str, listener: &Listener<A>) -> &Self;

    /// Removes every listener of `event`.
    fn remove_all_listeners(&self, event: &str) -> &Self;

    /// Appends `listener` to `event`.
    fn add_listener(&self, event: &str, listener: Listener<A>) -> &Self {
        self.add_listener_with(event, listener, ListenOptions::default())
    }

    /// Inserts `listener` ahead of the others for `event`.
    fn prepend_listener(&self, event: &str, listener: Listener<A>) -> &Self {
        self.prepend_listener_with(event, listener, ListenOptions::default())
    }
}

/// Capability set of an event interceptor.
///
/// Methods receive calls that targeted the intercepted event only; the event
/// name is implied by the installation.
pub trait Intercept<A>: Send + Sync {
    /// Append-style registration.
    fn register_trailing(&self, listener: Listener<A>, options: ListenOptions);

    /// Prepend-style registration.
    fn register_leading(&self, listener: Listener<A>, options: ListenOptions);

    /// `once` registration.
    fn register_once_trailing(&self, listener: Listener<A>);

    /// `prepend_once_listener` registration.
    fn register_once_leading(&self, listener: Listener<A>);

    /// Single removal by identity.
    fn remove_one(&self, listener: &Listener<A>);

    /// Removal of every listener.
    fn remove_all(&self);
}
