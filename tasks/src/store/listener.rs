//! Store change observers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::entities::Task;

/// Handle returned by [`TaskStore::subscribe`](super::TaskStore::subscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Receives membership and ordering changes from a [`TaskStore`](super::TaskStore).
///
/// Callbacks run synchronously on the thread performing the mutation, after
/// the store's lock has been released. Keep them short; anything slow should
/// be handed off to another task.
pub trait TaskListener: Send + Sync {
    fn on_task_added(&self, _task: &Task) {}

    fn on_task_removed(&self, _task: &Task) {}

    fn on_task_updated(&self, _task: &Task) {}
}

/// Running change counts, used to refresh summaries and decide whether a
/// store needs saving.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    dirty: AtomicBool,
    added: AtomicUsize,
    removed: AtomicUsize,
    updated: AtomicUsize,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any change was observed since the last [`Self::reset`]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn added(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn updated(&self) -> usize {
        self.updated.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.dirty.store(false, Ordering::SeqCst);
        self.added.store(0, Ordering::SeqCst);
        self.removed.store(0, Ordering::SeqCst);
        self.updated.store(0, Ordering::SeqCst);
    }

    fn mark(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.dirty.store(true, Ordering::SeqCst);
    }
}

impl TaskListener for ChangeTracker {
    fn on_task_added(&self, _task: &Task) {
        self.mark(&self.added);
    }

    fn on_task_removed(&self, _task: &Task) {
        self.mark(&self.removed);
    }

    fn on_task_updated(&self, _task: &Task) {
        self.mark(&self.updated);
    }
}
