//! Structured event log
//!
//! Each request outcome is recorded as one JSON object per line:
//! `{"timestamp": ..., "level": ..., "message": ..., <context fields>}`.
//! Writes go through a non-blocking appender; a failed write is reported
//! on the console and otherwise ignored.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One line of the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601, UTC, millisecond precision
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(flatten)]
    pub context: Map<String, Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.into(),
            context: Map::new(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// Attach a context field
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}

/// Sink for request outcome events
pub trait EventLog: Send + Sync {
    /// Record an entry. Never fails from the caller's point of view.
    fn record(&self, entry: LogEntry);
}

/// Appends entries to a file and echoes them to the console
pub struct FileEventLog {
    writer: NonBlocking,
    path: PathBuf,
    // flushes pending lines when dropped
    _guard: WorkerGuard,
}

impl FileEventLog {
    /// Open (or create) `<log_dir>/<file_name>` in append mode
    pub fn open(config: &LoggingConfig) -> io::Result<Self> {
        Self::open_in(&config.log_dir, &config.file_name)
    }

    pub fn open_in(dir: &Path, file_name: &str) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        Ok(Self {
            writer,
            path: dir.join(file_name),
            _guard: guard,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventLog for FileEventLog {
    fn record(&self, entry: LogEntry) {
        let mut line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("failed to serialize log entry: {}", e);
                return;
            }
        };

        echo(entry.level, &line);

        line.push('\n');
        if let Err(e) = self.writer.clone().write_all(line.as_bytes()) {
            tracing::warn!(path = %self.path.display(), "failed to append log entry: {}", e);
        }
    }
}

fn echo(level: LogLevel, line: &str) {
    match level {
        LogLevel::Info => tracing::info!(target: "event_log", "{}", line),
        LogLevel::Warn => tracing::warn!(target: "event_log", "{}", line),
        LogLevel::Error => tracing::error!(target: "event_log", "{}", line),
    }
}

/// Keeps entries in memory so callers can inspect what was logged
#[derive(Default)]
pub struct MemoryEventLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl EventLog for MemoryEventLog {
    fn record(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }
}
