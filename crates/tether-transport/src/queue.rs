//! The FIFO buffer shared between the I/O side and the tick thread.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// A thread-safe FIFO queue with non-blocking push and pop.
///
/// This is the only data structure shared across the I/O boundary: the
/// background task pushes received frames, the tick thread drains them
/// (and the outbound direction mirrors it). Both sides take the lock
/// just long enough to touch the deque — neither ever waits for the
/// other to make progress.
///
/// [`SharedQueue::drain`] removes the *current* backlog in one pass and
/// stops; items arriving during processing wait for the next tick.
/// That keeps per-tick behavior deterministic.
///
/// Cloning a queue clones the handle, not the contents.
pub struct SharedQueue<T> {
    inner: Arc<Mutex<VecDeque<T>>>,
}

impl<T> Clone for SharedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Appends an item to the back. Never blocks on a consumer.
    pub fn push(&self, item: T) {
        self.lock().push_back(item);
    }

    /// Removes and returns the front item, or `None` when empty.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Removes everything currently queued, in FIFO order.
    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        // A poisoned lock means the other side panicked mid-push/pop;
        // the deque itself is still a valid FIFO, so keep going.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
