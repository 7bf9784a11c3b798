//! Progress events for reshape runs.
//!
//! Every event is written to stderr unless echo is off, and sent on a
//! broadcast channel. Tests subscribe to [`PROGRESS`] instead of scraping
//! terminal output.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events buffered per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn marker(self) -> &'static str {
        match self {
            LogLevel::Info => " ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        }
    }
}

/// One progress event, optionally tied to the file being reshaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            file: None,
        }
    }

    pub fn for_file(mut self, path: &Path) -> Self {
        self.file = Some(path.to_path_buf());
        self
    }

    /// Terminal line. Per-file details sit one step under batch events.
    pub fn render(&self) -> String {
        let depth = if self.file.is_some() { "      " } else { "   " };
        format!("{}{} {}", depth, self.level.marker(), self.message)
    }
}

/// Process-wide progress channel used by the pipeline.
pub static PROGRESS: Lazy<ProgressLog> = Lazy::new(ProgressLog::new);

pub struct ProgressLog {
    sender: broadcast::Sender<LogEntry>,
    echo: AtomicBool,
}

impl ProgressLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            echo: AtomicBool::new(true),
        }
    }

    pub fn emit(&self, entry: LogEntry) {
        if self.echo.load(Ordering::Relaxed) {
            eprintln!("{}", entry.render());
        }
        // send only fails when nobody subscribed
        let _ = self.sender.send(entry);
    }

    /// Silence stderr. Subscribers still receive every event.
    pub fn set_echo(&self, echo: bool) {
        self.echo.store(echo, Ordering::Relaxed);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for ProgressLog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    PROGRESS.emit(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    PROGRESS.emit(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    PROGRESS.emit(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    PROGRESS.emit(LogEntry::new(LogLevel::Error, msg));
}

/// Detail line about a single file in the batch.
pub fn log_file(level: LogLevel, path: &Path, msg: impl Into<String>) {
    PROGRESS.emit(LogEntry::new(level, msg).for_file(path));
}
