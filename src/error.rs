//! Error types used by listeners, the native emitter and the custodian.
//!
//! This module defines two enums:
//!
//! - [`ListenerError`]: what a single listener reports when it fails
//!   (returned error or caught panic).
//! - [`EmitError`]: what [`EventEmitter::emit`](crate::EventEmitter::emit)
//!   returns when native dispatch is interrupted.
//!
//! Both provide `as_label` for logs/metrics.

use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;

/// # Errors produced by listeners.
///
/// Listeners return `Result<(), ListenerError>`. Panics caught by a custodian
/// dispatch are converted into [`ListenerError::Panicked`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// Listener returned an error.
    #[error("listener failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Listener panicked while running.
    #[error("listener panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ListenerError {
    /// Builds a [`ListenerError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use listener_custodian::ListenerError;
    ///
    /// let err = ListenerError::fail("connection refused");
    /// assert_eq!(err.to_string(), "listener failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        ListenerError::Fail {
            error: error.to_string(),
        }
    }

    /// Converts a panic payload (as returned by `catch_unwind`) into an error.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        ListenerError::Panicked { info }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Fail { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }

    /// True if the failure came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, ListenerError::Panicked { .. })
    }
}

impl From<String> for ListenerError {
    fn from(error: String) -> Self {
        ListenerError::Fail { error }
    }
}

impl From<&str> for ListenerError {
    fn from(error: &str) -> Self {
        ListenerError::fail(error)
    }
}

/// # Errors produced by native emission.
///
/// A plain [`EventEmitter`](crate::EventEmitter) stops at the first failing
/// listener and hands the failure back to the `emit` caller. Events managed by
/// an active [`Custodian`](crate::Custodian) never produce
/// [`EmitError::Listener`] for their managed listeners.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EmitError {
    /// A listener failed; listeners after it did not run.
    #[error("listener for '{event}' failed: {source}")]
    Listener {
        /// Event being emitted.
        event: Arc<str>,
        /// The listener's error.
        source: ListenerError,
    },

    /// The `"error"` event was emitted with nobody listening.
    #[error("unhandled '{event}' event: no listener registered")]
    UnhandledError {
        /// Event being emitted.
        event: Arc<str>,
    },
}

impl EmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use listener_custodian::EmitError;
    ///
    /// let err = EmitError::UnhandledError { event: "error".into() };
    /// assert_eq!(err.as_label(), "emit_unhandled_error");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EmitError::Listener { .. } => "emit_listener_failed",
            EmitError::UnhandledError { .. } => "emit_unhandled_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_panic_str_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let err = ListenerError::from_panic(payload.as_ref());
        assert_eq!(
            err,
            ListenerError::Panicked {
                info: "boom".into()
            }
        );
        assert!(err.is_panic());
    }

    #[test]
    fn test_from_panic_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("formatted 42"));
        let err = ListenerError::from_panic(payload.as_ref());
        assert_eq!(err.to_string(), "listener panicked: formatted 42");
    }

    #[test]
    fn test_from_panic_unknown_payload() {
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        let err = ListenerError::from_panic(payload.as_ref());
        assert_eq!(err.to_string(), "listener panicked: unknown panic");
        assert_eq!(err.as_label(), "listener_panicked");
    }

    #[test]
    fn test_emit_error_keeps_source() {
        use std::error::Error as _;

        let err = EmitError::Listener {
            event: "tick".into(),
            source: ListenerError::fail("bad"),
        };
        assert_eq!(err.to_string(), "listener for 'tick' failed: listener failed: bad");
        assert!(err.source().is_some());
        assert_eq!(err.as_label(), "emit_listener_failed");
    }
}
