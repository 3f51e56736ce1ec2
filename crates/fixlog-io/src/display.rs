//! Console rendition of the scrolling log view.

use fixlog_core::{Clock, EventLog, SharedEventLog};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display write failed: {0}")]
    Io(#[from] io::Error),
}

/// Writes whatever the log gained since the last refresh, so every line
/// reaches the sink exactly once and the newest line is always last.
pub struct ScrollView<W: Write> {
    out: W,
    cursor: usize,
}

impl<W: Write> ScrollView<W> {
    pub fn new(out: W) -> Self {
        Self { out, cursor: 0 }
    }

    pub fn refresh<C: Clock>(&mut self, log: &EventLog<C>) -> Result<usize, DisplayError> {
        let fresh = log.text_since(self.cursor);
        if fresh.is_empty() {
            return Ok(0);
        }
        self.out.write_all(fresh.as_bytes())?;
        self.out.flush()?;
        self.cursor += fresh.len();
        Ok(fresh.len())
    }

    pub fn refresh_shared<C: Clock>(
        &mut self,
        log: &SharedEventLog<C>,
    ) -> Result<usize, DisplayError> {
        log.with(|log| self.refresh(log))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlog_core::ManualClock;

    #[test]
    fn writes_each_line_once() {
        let clock = ManualClock::new(0);
        let mut log = EventLog::new(clock.clone());
        let mut view = ScrollView::new(Vec::new());

        clock.set(120);
        log.append("Connected");
        view.refresh(&log).unwrap();
        assert_eq!(view.refresh(&log).unwrap(), 0);

        clock.set(125);
        log.append("Locations (starting with last known):");
        view.refresh(&log).unwrap();

        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(
            out,
            "+0120: Connected\n+0005: Locations (starting with last known):\n"
        );
    }

    #[test]
    fn refreshes_through_shared_handle() {
        let shared = SharedEventLog::new(EventLog::new(ManualClock::new(0)));
        let mut view = ScrollView::new(Vec::new());
        shared.append("one");
        shared.append("two");
        assert_eq!(view.refresh_shared(&shared).unwrap(), 22);
        assert_eq!(view.cursor(), shared.snapshot().len());
    }
}
