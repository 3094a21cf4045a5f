//! # One-shot registrations.
//!
//! A one-shot registration is a two-state machine:
//! ```text
//!   Armed ──fire()──► Fired
//!                       └─► detach own registration from the owning list
//! ```
//! Only the caller that performs the `Armed → Fired` transition gets to run
//! the listener; every later `fire()` is refused. Detaching happens before
//! the listener runs, so a listener that panics or re-emits is still gone.

use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::emitter::list::ListenerList;

/// Observable state of a [`OneShot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShotState {
    /// Waiting for the first emission.
    Armed,
    /// Already fired; the registration is gone.
    Fired,
}

/// Handle returned when a one-shot registration is created.
///
/// Holds the registration id and a weak link to the list that owns it.
pub struct OneShot<A> {
    id: u64,
    fired: AtomicBool,
    owner: Weak<ListenerList<A>>,
}

impl<A> OneShot<A> {
    pub(crate) fn new(id: u64, owner: Weak<ListenerList<A>>) -> Self {
        Self {
            id,
            fired: AtomicBool::new(false),
            owner,
        }
    }

    /// Current state.
    pub fn state(&self) -> OneShotState {
        if self.fired.load(Ordering::Acquire) {
            OneShotState::Fired
        } else {
            OneShotState::Armed
        }
    }

    /// Performs the terminal transition.
    ///
    /// Returns `true` exactly once; the registration is removed from its owner
    /// as part of the transition.
    pub(crate) fn fire(&self) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        if let Some(list) = self.owner.upgrade() {
            list.detach(self.id);
        }
        true
    }
}

impl<A> std::fmt::Debug for OneShot<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneShot")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Listener;
    use crate::emitter::list::Position;

    #[test]
    fn test_fires_exactly_once_and_detaches() {
        let list = ListenerList::<u8>::new();
        let shot = list.push_once(Listener::infallible(|_| {}), Position::Back);
        assert_eq!(list.len(), 1);
        assert_eq!(shot.state(), OneShotState::Armed);

        assert!(shot.fire());
        assert_eq!(shot.state(), OneShotState::Fired);
        assert_eq!(list.len(), 0);

        assert!(!shot.fire());
    }

    #[test]
    fn test_fire_after_owner_dropped() {
        let list = ListenerList::<u8>::new();
        let shot = list.push_once(Listener::infallible(|_| {}), Position::Back);
        drop(list);
        assert!(shot.fire());
    }
}
