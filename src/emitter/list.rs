//! # Ordered listener storage.
//!
//! [`ListenerList`] is the ordered sequence behind both a native event slot
//! and a custodian's managed list. Order is execution order.
//!
//! ## Rules
//! - `push(.., Front)` inserts at index 0, `push(.., Back)` appends.
//! - Removal is by listener identity, first match only.
//! - `snapshot()` clones the current registrations; the lock is never held
//!   while a listener runs, so listeners may mutate the list they belong to.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::emitter::listener::{Emission, Listener, ListenerResult};
use crate::emitter::once::OneShot;

/// Global registration id counter.
static REGISTRATION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Front,
    Back,
}

/// One entry of a [`ListenerList`].
pub(crate) struct Registration<A> {
    id: u64,
    listener: Listener<A>,
    once: Option<Arc<OneShot<A>>>,
}

impl<A> Clone for Registration<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: self.listener.clone(),
            once: self.once.clone(),
        }
    }
}

impl<A> Registration<A> {
    pub(crate) fn listener(&self) -> &Listener<A> {
        &self.listener
    }

    pub(crate) fn is_once(&self) -> bool {
        self.once.is_some()
    }

    /// Runs the listener, unless this is a one-shot that already fired.
    pub(crate) fn invoke(&self, emission: &Emission<'_, A>) -> Option<ListenerResult> {
        if let Some(shot) = &self.once {
            if !shot.fire() {
                return None;
            }
        }
        Some(self.listener.call(emission))
    }
}

/// Ordered, shareable list of registrations.
pub(crate) struct ListenerList<A> {
    entries: Mutex<Vec<Registration<A>>>,
}

impl<A> ListenerList<A> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
        })
    }

    fn insert(&self, registration: Registration<A>, at: Position) {
        let mut entries = self.entries.lock();
        match at {
            Position::Front => entries.insert(0, registration),
            Position::Back => entries.push(registration),
        }
    }

    pub(crate) fn push(&self, listener: Listener<A>, at: Position) {
        let id = REGISTRATION_SEQ.fetch_add(1, Ordering::Relaxed);
        self.insert(
            Registration {
                id,
                listener,
                once: None,
            },
            at,
        );
    }

    /// Adds a one-shot registration owned by this list and returns its handle.
    pub(crate) fn push_once(self: &Arc<Self>, listener: Listener<A>, at: Position) -> Arc<OneShot<A>> {
        let id = REGISTRATION_SEQ.fetch_add(1, Ordering::Relaxed);
        let shot = Arc::new(OneShot::new(id, Arc::downgrade(self)));
        self.insert(
            Registration {
                id,
                listener,
                once: Some(Arc::clone(&shot)),
            },
            at,
        );
        shot
    }

    /// Re-creates `registration` at the tail of this list, keeping its kind.
    ///
    /// One-shots get a fresh handle owned by this list.
    pub(crate) fn adopt(self: &Arc<Self>, registration: &Registration<A>) {
        if registration.is_once() {
            self.push_once(registration.listener.clone(), Position::Back);
        } else {
            self.push(registration.listener.clone(), Position::Back);
        }
    }

    /// Removes the first registration of `listener`. Returns whether one was found.
    pub(crate) fn remove(&self, listener: &Listener<A>) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|r| r.listener.same(listener)) {
            Some(idx) => {
                entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn detach(&self, id: u64) {
        self.entries.lock().retain(|r| r.id != id);
    }

    /// Removes and returns every registration, in order.
    pub(crate) fn drain(&self) -> Vec<Registration<A>> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub(crate) fn snapshot(&self) -> Vec<Registration<A>> {
        self.entries.lock().clone()
    }

    pub(crate) fn listeners(&self) -> Vec<Listener<A>> {
        self.entries
            .lock()
            .iter()
            .map(|r| r.listener.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l() -> Listener<u8> {
        Listener::infallible(|_| {})
    }

    #[test]
    fn test_front_and_back_insertion() {
        let list = ListenerList::new();
        let (a, b, c) = (l(), l(), l());
        list.push(a.clone(), Position::Back);
        list.push(b.clone(), Position::Back);
        list.push(c.clone(), Position::Front);
        assert_eq!(list.listeners(), vec![c, a, b]);
    }

    #[test]
    fn test_remove_first_match_only() {
        let list = ListenerList::new();
        let (a, b) = (l(), l());
        list.push(a.clone(), Position::Back);
        list.push(b.clone(), Position::Back);
        list.push(a.clone(), Position::Back);

        assert!(list.remove(&a));
        assert_eq!(list.listeners(), vec![b.clone(), a.clone()]);
        assert!(!list.remove(&l()));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_mutation() {
        let list = ListenerList::new();
        list.push(l(), Position::Back);
        let snap = list.snapshot();
        list.push(l(), Position::Back);
        assert_eq!(snap.len(), 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_adopt_keeps_kind() {
        let from = ListenerList::new();
        from.push(l(), Position::Back);
        from.push_once(l(), Position::Back);

        let to = ListenerList::new();
        for reg in from.drain() {
            to.adopt(&reg);
        }
        let kinds: Vec<bool> = to.snapshot().iter().map(Registration::is_once).collect();
        assert_eq!(kinds, vec![false, true]);
        assert_eq!(from.len(), 0);
    }
}
