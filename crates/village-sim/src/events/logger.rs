//! Event Logger
//!
//! Append-only JSONL event logging.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::types::Event;
use crate::error::Result;

/// Writes one JSON object per line, in the order events are produced
pub struct EventLogger {
    writer: BufWriter<File>,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path.
    /// Missing parent directories are created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            event_count: 0,
        })
    }

    /// Events written so far
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &Event) -> Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.writer, "{}", json)?;
        self.event_count += 1;
        Ok(())
    }

    /// Log multiple events
    pub fn log_batch(&mut self, events: &[Event]) -> Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush event logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::inventory::ItemKind;
    use crate::events::types::*;
    use std::io::BufRead;

    fn thrown_event(id: &str) -> Event {
        Event::new(
            id,
            3,
            "villager_001",
            Some("villager_002".to_string()),
            EventDetails::ItemThrown {
                rule: TransferRule::Food,
                item: ItemKind::Wheat,
                amount: 20,
                slot: 0,
            },
        )
    }

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");

        let mut logger = EventLogger::new(&path).unwrap();
        logger.log(&thrown_event("evt_00000001")).unwrap();
        logger
            .log_batch(&[thrown_event("evt_00000002"), thrown_event("evt_00000003")])
            .unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let reader = std::io::BufReader::new(file);
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 3);

        let parsed: Event = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed, thrown_event("evt_00000001"));
        assert_eq!(logger.event_count(), 3);
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let result = EventLogger::new(blocker.join("events.jsonl"));
        assert!(matches!(result, Err(crate::error::SimError::EventLog(_))));
    }
}
