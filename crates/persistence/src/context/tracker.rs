//! Pending change list kept per entity set.

use std::sync::{Mutex, MutexGuard, PoisonError};

use domain::Record;

use super::Change;

/// Ordered staged changes for one record kind.
pub(crate) struct ChangeTracker<E> {
    pending: Mutex<Vec<Change<E>>>,
}

impl<E: Record> ChangeTracker<E> {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Change<E>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn stage(&self, change: Change<E>) {
        self.lock().push(change);
    }

    /// Latest staged state of `id`.
    ///
    /// `None` when the id is untracked, `Some(None)` when its last change
    /// is a removal.
    pub(crate) fn lookup(&self, id: i32) -> Option<Option<E>> {
        self.lock()
            .iter()
            .rev()
            .find(|change| change.entity().id() == id)
            .map(|change| match change {
                Change::Removed(_) => None,
                Change::Added(e) | Change::Modified(e) => Some(e.clone()),
            })
    }

    /// Copy of the staged changes in staging order
    pub(crate) fn pending(&self) -> Vec<Change<E>> {
        self.lock().clone()
    }

    /// Drop the first `count` changes once they are committed
    pub(crate) fn discard(&self, count: usize) {
        let mut pending = self.lock();
        let count = count.min(pending.len());
        pending.drain(..count);
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
