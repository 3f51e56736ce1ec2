use crate::event_log::{EventLog, LogEntry};
use crate::timebase::{Clock, TimeBase};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle that serializes producers on one [`EventLog`].
///
/// Each `append` holds the lock across the clock read and the buffer write,
/// so deltas are computed in lock-acquisition order.
pub struct SharedEventLog<C: Clock = TimeBase> {
    inner: Arc<Mutex<EventLog<C>>>,
}

impl<C: Clock> Clone for SharedEventLog<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedEventLog<C> {
    pub fn new(log: EventLog<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(log)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EventLog<C>> {
        // A producer that panicked mid-append leaves the log usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, message: impl Into<String>) {
        self.lock().append(message);
    }

    /// Run `f` with the log locked. Do not call back into this handle from
    /// inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&EventLog<C>) -> R) -> R {
        f(&self.lock())
    }

    pub fn set_notifier(&self, notifier: impl FnMut() + Send + 'static) {
        self.lock().set_notifier(notifier);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> String {
        self.lock().buffer().to_string()
    }

    /// Entries from index `from` onward.
    pub fn entries_from(&self, from: usize) -> Vec<LogEntry> {
        self.lock()
            .entries()
            .get(from..)
            .map(<[LogEntry]>::to_vec)
            .unwrap_or_default()
    }
}
