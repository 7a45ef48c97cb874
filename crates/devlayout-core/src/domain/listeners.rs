//! Ordered listener registry shared by views and layouts.
//!
//! Delivery runs newest-first: the most recently registered listener sees an
//! event before everything registered earlier.  The registry is snapshotted
//! before delivery so a callback may add or remove listeners (or mutate the
//! model) without deadlocking; such changes take effect from the next event.

use std::sync::{Arc, Mutex, PoisonError};

/// Registry of shared listener handles.
///
/// `T` is normally a trait object such as `dyn ViewListener`.
pub(crate) struct ListenerRegistry<T: ?Sized> {
    listeners: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> ListenerRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Appends a listener.  Registering the same handle twice delivers twice.
    pub(crate) fn add(&self, listener: Arc<T>) {
        self.lock().push(listener);
    }

    /// Removes the most recent registration of `listener`.
    ///
    /// Returns `false` if the handle was not registered.
    pub(crate) fn remove(&self, listener: &Arc<T>) -> bool {
        let mut listeners = self.lock();
        match listeners.iter().rposition(|l| same_listener(l, listener)) {
            Some(idx) => {
                listeners.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Calls `deliver` for every listener, last-registered first.
    pub(crate) fn notify(&self, mut deliver: impl FnMut(&T)) {
        let snapshot: Vec<Arc<T>> = self.lock().clone();
        for listener in snapshot.iter().rev() {
            deliver(listener);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<T>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Compares two handles by the address of the shared allocation.
///
/// Trait-object pointers are compared without their vtable half, which is not
/// guaranteed to be unique per type.
pub(crate) fn same_listener<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
