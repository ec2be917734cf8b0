//! Dual-write logging: syslog datagrams + JSONL append-only with graceful degradation.

#![allow(missing_docs)]

pub mod dual;
pub mod jsonl;
pub mod syslog;

use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use dual::DualLogger;

/// Record severity, mapped onto syslog severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

impl LogLevel {
    /// syslog(3) severity value.
    #[must_use]
    pub const fn severity(self) -> i32 {
        match self {
            Self::Error => libc::LOG_ERR,
            Self::Info => libc::LOG_INFO,
            Self::Debug => libc::LOG_DEBUG,
        }
    }
}

/// One log line as handed to every sink.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub identity: String,
    pub pid: u32,
    pub message: String,
}

/// A destination for log records. A sink that returns an error is dropped
/// by the [`DualLogger`].
pub trait LogSink {
    /// Short name used when the sink is dropped.
    fn name(&self) -> &'static str;

    fn write(&mut self, record: &LogRecord) -> io::Result<()>;
}

/// In-memory sink shared with the test that created it.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySink {
    records: std::rc::Rc<std::cell::RefCell<Vec<LogRecord>>>,
}

#[cfg(test)]
impl MemorySink {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .map(|record| record.message.clone())
            .collect()
    }

    pub(crate) fn levels(&self) -> Vec<LogLevel> {
        self.records.borrow().iter().map(|record| record.level).collect()
    }
}

#[cfg(test)]
impl LogSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }
}
