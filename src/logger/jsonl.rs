//! Append-only JSONL sink: one serialized [`LogRecord`] per line.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::{LogRecord, LogSink};

/// Sink appending to a JSONL file. Every record is flushed on write so a
/// crash loses at most the line being written.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl LogSink for JsonlSink {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::JsonlSink;
    use crate::logger::{LogLevel, LogRecord, LogSink};
    use chrono::Utc;

    #[test]
    fn appends_one_json_object_per_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs/hotplugd.jsonl");

        let mut sink = JsonlSink::open(&path).expect("open");
        for message in ["hotplugd has started", "waiting for uevents"] {
            sink.write(&LogRecord {
                timestamp: Utc::now(),
                level: LogLevel::Info,
                identity: "hotplugd".to_string(),
                pid: 7,
                message: message.to_string(),
            })
            .expect("write");
        }
        drop(sink);

        let raw = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<serde_json::Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[1]["message"], "waiting for uevents");
        assert_eq!(lines[1]["pid"], 7);
    }
}
