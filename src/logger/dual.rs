//! Fan-out logger owning every configured sink.
//!
//! A sink that fails is dropped and the remaining sinks keep receiving
//! records; logging never stops the daemon.

use chrono::Utc;

use super::jsonl::JsonlSink;
use super::syslog::SyslogSink;
use super::{LogLevel, LogRecord, LogSink};
use crate::core::config::LoggingConfig;

/// Logger handed around by the daemon context.
pub struct DualLogger {
    identity: String,
    pid: u32,
    debug: bool,
    sinks: Vec<Box<dyn LogSink>>,
}

impl DualLogger {
    /// Logger writing to explicit sinks.
    #[must_use]
    pub fn with_sinks(identity: &str, debug: bool, sinks: Vec<Box<dyn LogSink>>) -> Self {
        Self {
            identity: identity.to_string(),
            pid: std::process::id(),
            debug,
            sinks,
        }
    }

    /// Open the sinks named by the config. Must be called after
    /// daemonizing so the recorded pid is the daemon's own.
    #[must_use]
    pub fn open(config: &LoggingConfig) -> Self {
        let mut sinks: Vec<Box<dyn LogSink>> = Vec::new();
        if config.syslog {
            sinks.push(Box::new(SyslogSink::open(&config.syslog_socket)));
        }
        if let Some(path) = &config.jsonl_path {
            // An unwritable JSONL path just leaves syslog on its own.
            if let Ok(sink) = JsonlSink::open(path) {
                sinks.push(Box::new(sink));
            }
        }
        Self::with_sinks(&config.identity, config.debug, sinks)
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        if level == LogLevel::Debug && !self.debug {
            return;
        }
        if self.sinks.is_empty() {
            return;
        }
        let record = LogRecord {
            timestamp: Utc::now(),
            level,
            identity: self.identity.clone(),
            pid: self.pid,
            message: message.into(),
        };
        self.sinks.retain_mut(|sink| sink.write(&record).is_ok());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Names of the sinks still active.
    #[must_use]
    pub fn active_sinks(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    /// Drop every sink, closing the logger socket and files.
    pub fn close(&mut self) {
        self.sinks.clear();
    }
}
