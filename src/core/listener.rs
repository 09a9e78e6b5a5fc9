//! Listener Fan-out
//!
//! Observer lists shared by documents and the registry. Registration and
//! removal take `&self`, so a listener may add or remove listeners while an
//! event is being dispatched. Every fire iterates a snapshot taken when the
//! fire started: a listener removed mid-dispatch still sees the current
//! event, one added mid-dispatch sees only later events.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle returned on registration, used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Slots<L: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<L>)>,
}

/// Ordered set of listeners of one capability type
pub struct Listeners<L: ?Sized> {
    slots: Arc<Mutex<Slots<L>>>,
}

impl<L: ?Sized> Clone for Listeners<L> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for Listeners<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}

impl<L: ?Sized> Listeners<L> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener
    pub fn add(&self, listener: Arc<L>) -> ListenerId {
        let mut slots = self.lock();
        let id = ListenerId(slots.next_id);
        slots.next_id += 1;
        slots.entries.push((id, listener));
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut slots = self.lock();
        let before = slots.entries.len();
        slots.entries.retain(|(entry_id, _)| *entry_id != id);
        slots.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current listener set
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    /// Call `notify` once per listener in the snapshot. The lock is released
    /// before any listener runs.
    pub fn fire(&self, mut notify: impl FnMut(&L)) {
        for listener in self.snapshot() {
            notify(listener.as_ref());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots<L>> {
        // A panicking listener never holds the lock, so the data is intact
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
