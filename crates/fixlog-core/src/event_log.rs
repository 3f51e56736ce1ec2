//! Append-only text log where every line carries the milliseconds elapsed
//! since the previous line.

use crate::timebase::{Clock, TimeBase};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host callback run after every append. Carries no payload; the host reads
/// whatever it needs back out of the log.
pub type Notifier = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub delta_ms: u64,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{:04}: {}", self.delta_ms, self.message)
    }
}

pub struct EventLog<C: Clock = TimeBase> {
    clock: C,
    last_event_time_ms: u64,
    buffer: String,
    entries: Vec<LogEntry>,
    notifier: Option<Notifier>,
}

impl EventLog<TimeBase> {
    pub fn system() -> Self {
        Self::new(TimeBase::new())
    }
}

impl<C: Clock> EventLog<C> {
    /// The creation time becomes the reference for the first delta.
    pub fn new(clock: C) -> Self {
        let last_event_time_ms = clock.now_ms();
        Self {
            clock,
            last_event_time_ms,
            buffer: String::new(),
            entries: Vec::new(),
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: impl FnMut() + Send + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn set_notifier(&mut self, notifier: impl FnMut() + Send + 'static) {
        self.notifier = Some(Box::new(notifier));
    }

    pub fn append(&mut self, message: impl Into<String>) {
        let now = self.clock.now_ms();
        let entry = LogEntry {
            delta_ms: now.saturating_sub(self.last_event_time_ms),
            message: message.into(),
        };
        self.last_event_time_ms = now;

        use std::fmt::Write as _;
        // Writing into a String cannot fail.
        let _ = writeln!(self.buffer, "{entry}");
        log::trace!("event log append: {entry}");
        self.entries.push(entry);

        if let Some(notify) = self.notifier.as_mut() {
            notify();
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Text appended after byte `offset`. Offsets past the end yield "".
    pub fn text_since(&self, offset: usize) -> &str {
        self.buffer.get(offset..).unwrap_or("")
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last_entry(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_event_time_ms(&self) -> u64 {
        self.last_event_time_ms
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> fmt::Debug for EventLog<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("last_event_time_ms", &self.last_event_time_ms)
            .field("entries", &self.entries.len())
            .field("notifier", &self.notifier.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timebase::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn connected_then_header() {
        let clock = ManualClock::new(0);
        let mut log = EventLog::new(clock.clone());

        clock.set(120);
        log.append("Connected");
        assert_eq!(log.buffer(), "+0120: Connected\n");

        clock.set(125);
        log.append("Locations (starting with last known):");
        assert_eq!(
            log.buffer(),
            "+0120: Connected\n+0005: Locations (starting with last known):\n"
        );
        assert_eq!(log.last_event_time_ms(), 125);
    }

    #[test]
    fn delta_field_pads_and_widens() {
        let clock = ManualClock::new(1_000);
        let mut log = EventLog::new(clock.clone());

        clock.advance(7);
        log.append("short");
        clock.advance(12_345);
        log.append("long");

        assert_eq!(log.buffer(), "+0007: short\n+12345: long\n");
    }

    #[test]
    fn identical_messages_are_kept_separately() {
        let clock = ManualClock::new(0);
        let mut log = EventLog::new(clock);
        log.append("tick");
        log.append("tick");

        assert_eq!(log.len(), 2);
        assert_eq!(log.buffer(), "+0000: tick\n+0000: tick\n");
    }

    #[test]
    fn notifier_runs_once_per_append() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut log = EventLog::new(ManualClock::new(0))
            .with_notifier(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            });

        log.append("a");
        log.append("b");
        log.append("c");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn text_since_returns_the_tail() {
        let mut log = EventLog::new(ManualClock::new(0));
        log.append("first");
        let cursor = log.buffer().len();
        log.append("second");

        assert_eq!(log.text_since(cursor), "+0000: second\n");
        assert_eq!(log.text_since(usize::MAX), "");
    }

    #[test]
    fn clock_going_backwards_clamps_to_zero() {
        let clock = ManualClock::new(500);
        let mut log = EventLog::new(clock.clone());
        clock.set(100);
        log.append("late");
        assert_eq!(log.last_entry().map(|e| e.delta_ms), Some(0));
    }
}
