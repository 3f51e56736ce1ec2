//! JSONL transcript of the event log.
//!
//! Every log line is mirrored as one JSON object so a run can be inspected
//! or replayed after the process exits.

use fixlog_core::LogEntry;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("transcript I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcript encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A single transcript record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// 1-based position in the log
    pub sequence: u64,
    /// Wall-clock Unix timestamp of the entry in milliseconds
    pub unix_ms: u64,
    pub delta_ms: u64,
    pub message: String,
}

/// Thread-safe transcript writer over a JSONL file
pub struct TranscriptWriter {
    writer: Mutex<BufWriter<File>>,
}

impl TranscriptWriter {
    /// Open `path` in append mode, creating parent directories as needed.
    pub fn new(path: &Path) -> Result<Self, TranscriptError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::with_capacity(8192, file)),
        })
    }

    pub fn write(&self, record: &TranscriptRecord) -> Result<(), TranscriptError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn record(
        &self,
        sequence: u64,
        unix_ms: u64,
        entry: &LogEntry,
    ) -> Result<(), TranscriptError> {
        self.write(&TranscriptRecord {
            sequence,
            unix_ms,
            delta_ms: entry.delta_ms,
            message: entry.message.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_transcript_writes_jsonl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("run.jsonl");

        let writer = TranscriptWriter::new(&path).unwrap();
        writer
            .record(
                1,
                1_704_067_200_120,
                &LogEntry {
                    delta_ms: 120,
                    message: "Connected".into(),
                },
            )
            .unwrap();
        writer
            .record(
                2,
                1_704_067_200_125,
                &LogEntry {
                    delta_ms: 5,
                    message: "Locations (starting with last known):".into(),
                },
            )
            .unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let lines: Vec<&str> = content.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);

        let first: TranscriptRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.message, "Connected");

        let second: TranscriptRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.delta_ms, 5);
        assert_eq!(second.unix_ms, 1_704_067_200_125);
    }

    #[test]
    fn test_transcript_appends_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let entry = LogEntry {
            delta_ms: 0,
            message: "x".into(),
        };

        TranscriptWriter::new(&path).unwrap().record(1, 0, &entry).unwrap();
        TranscriptWriter::new(&path).unwrap().record(1, 0, &entry).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
