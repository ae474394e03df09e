use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use fetch_engine::{NoProgress, ProgressSink};
use serde::Serialize;

use crate::progress::ConsoleProgress;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
            self.level,
            self.message
        )
    }
}

enum Sink {
    /// Stream lines to stderr, and to the log file if there is one
    Console { file: Option<File> },
    /// Keep entries for the structured report
    Buffer(Vec<LogEntry>),
}

/// Event log of a single run.
pub struct RunLog {
    sink: Sink,
}

impl RunLog {
    /// Human readable mode. Lines are appended to `log_file` as well as printed.
    pub fn console(log_file: Option<&Path>) -> std::io::Result<Self> {
        let file = log_file
            .map(|path| OpenOptions::new().create(true).append(true).open(path))
            .transpose()?;
        Ok(Self {
            sink: Sink::Console { file },
        })
    }

    /// Structured mode. Nothing is printed, entries end up in the report.
    pub fn structured() -> Self {
        Self {
            sink: Sink::Buffer(vec![]),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.sink, Sink::Buffer(_))
    }

    pub fn info(&mut self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&mut self, message: impl Display) {
        self.log(Level::Warning, message);
    }

    pub fn error(&mut self, message: impl Display) {
        self.log(Level::Error, message);
    }

    pub fn log(&mut self, level: Level, message: impl Display) {
        let entry = LogEntry {
            timestamp: Local::now(),
            level,
            message: message.to_string(),
        };

        match &mut self.sink {
            Sink::Buffer(entries) => entries.push(entry),
            Sink::Console { file } => {
                let line = entry.to_string();
                if let Err(e) = writeln!(std::io::stderr(), "{}", line) {
                    tracing::debug!("unable to write log line to stderr: {}", e);
                }
                if let Some(file) = file {
                    if let Err(e) = writeln!(file, "{}", line) {
                        tracing::warn!("unable to write log file: {}", e);
                    }
                }
            }
        }
    }

    /// A fresh progress display for one fetch.
    pub fn progress_sink(&self) -> Box<dyn ProgressSink> {
        match self.sink {
            Sink::Buffer(_) => Box::new(NoProgress),
            Sink::Console { .. } => Box::new(ConsoleProgress::new()),
        }
    }

    /// Buffered entries, always empty in human readable mode.
    pub fn into_entries(self) -> Vec<LogEntry> {
        match self.sink {
            Sink::Buffer(entries) => entries,
            Sink::Console { .. } => vec![],
        }
    }
}
