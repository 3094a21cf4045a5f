//! # Listener handles and the emission context.
//!
//! A [`Listener`] is a cheap, cloneable handle over a shared closure. Two
//! handles are the *same* listener when they point at the same closure, which
//! is what removal-by-identity compares.
//!
//! Every invocation receives an [`Emission`]: the event name, the emitter that
//! is dispatching, and the emission arguments.
//!
//! ## Example
//! ```rust
//! use listener_custodian::{EventEmitter, Listen, Listener};
//!
//! let emitter = EventEmitter::<u32>::new();
//! let double = Listener::infallible(|e| assert_eq!(*e.args() * 2, 84));
//!
//! emitter.add_listener("answer", double.clone());
//! emitter.emit("answer", &42).unwrap();
//!
//! emitter.remove_listener("answer", &double);
//! assert_eq!(emitter.listener_count("answer"), 0);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::emitter::EventEmitter;
use crate::error::ListenerError;

/// Result returned by every listener.
pub type ListenerResult = Result<(), ListenerError>;

type ListenerFn<A> = dyn Fn(&Emission<'_, A>) -> ListenerResult + Send + Sync;

/// Context handed to a listener for one emission.
pub struct Emission<'a, A> {
    event: &'a str,
    emitter: &'a EventEmitter<A>,
    args: &'a A,
}

impl<'a, A> Emission<'a, A> {
    pub(crate) fn new(event: &'a str, emitter: &'a EventEmitter<A>, args: &'a A) -> Self {
        Self {
            event,
            emitter,
            args,
        }
    }

    /// Name of the event being emitted.
    pub fn event(&self) -> &'a str {
        self.event
    }

    /// Emitter performing the emission.
    pub fn emitter(&self) -> &'a EventEmitter<A> {
        self.emitter
    }

    /// Emission arguments.
    pub fn args(&self) -> &'a A {
        self.args
    }
}

/// Shared handle to a listener closure.
///
/// Equality is identity: clones of one handle are equal, two handles built
/// from identical closures are not.
pub struct Listener<A> {
    f: Arc<ListenerFn<A>>,
}

impl<A> Listener<A> {
    /// Wraps a fallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Emission<'_, A>) -> ListenerResult + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Wraps a closure that cannot fail (it may still panic).
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&Emission<'_, A>) + Send + Sync + 'static,
    {
        Self::new(move |emission| {
            f(emission);
            Ok(())
        })
    }

    /// Invokes the closure directly.
    #[inline]
    pub fn call(&self, emission: &Emission<'_, A>) -> ListenerResult {
        (self.f)(emission)
    }

    /// True if both handles refer to the same closure.
    #[inline]
    pub fn same(&self, other: &Listener<A>) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<A> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<A> Eq for Listener<A> {}

impl<A> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.f).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = Listener::<u8>::infallible(|_| {});
        let b = Listener::<u8>::infallible(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_call_passes_context() {
        let emitter = EventEmitter::<String>::new();
        let args = String::from("payload");
        let l = Listener::new(|e: &Emission<'_, String>| {
            if e.event() == "ping" && e.args() == "payload" {
                Ok(())
            } else {
                Err(ListenerError::fail("unexpected context"))
            }
        });
        assert!(l.call(&Emission::new("ping", &emitter, &args)).is_ok());
        assert!(l.call(&Emission::new("pong", &emitter, &args)).is_err());
    }
}
