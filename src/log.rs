//! Run log sink for mdxgen.
//!
//! Every pipeline stage reports through a [`RunLog`] handle passed by reference;
//! there is no process-global logger. Each entry is rendered as one line:
//!
//! ```text
//! 2026-10-15T09:14:03Z [INFO] resolving prompt from https://example.com/prompt.mdx
//! ```
//!
//! Lines go to stderr (when echo is enabled) and are appended to the log file
//! (created on first write, synced after each line). A capturing sink keeps
//! entries in memory instead, which is what the tests use.

use crate::error::{GenError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
    Success,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
            Level::Success => write!(f, "SUCCESS"),
        }
    }
}

/// A single log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub ts: DateTime<Utc>,
    pub level: Level,
    pub message: String,
}

impl LogEntry {
    /// Render the entry as a log line (no trailing newline).
    pub fn to_line(&self) -> String {
        // Continuation lines (command output) are indented under their entry.
        let message = self.message.replace('\n', "\n    ");
        format!(
            "{} [{}] {}",
            self.ts.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.level,
            message
        )
    }
}

/// Log sink handed to every pipeline component.
#[derive(Debug)]
pub struct RunLog {
    file: Option<PathBuf>,
    echo: bool,
    captured: Option<Mutex<Vec<LogEntry>>>,
}

impl RunLog {
    /// Log to stderr and append to `file`.
    ///
    /// The parent directory of `file` is created if needed.
    pub fn to_file<P: AsRef<Path>>(file: P, echo: bool) -> Result<Self> {
        let file = file.as_ref().to_path_buf();
        if let Some(parent) = file.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                GenError::Io(format!(
                    "failed to create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(Self {
            file: Some(file),
            echo,
            captured: None,
        })
    }

    /// Log to stderr only.
    pub fn stderr() -> Self {
        Self {
            file: None,
            echo: true,
            captured: None,
        }
    }

    /// Keep entries in memory; nothing is printed or written.
    pub fn capture() -> Self {
        Self {
            file: None,
            echo: false,
            captured: Some(Mutex::new(Vec::new())),
        }
    }

    /// Path of the append-only log file, if any.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(Level::Success, message);
    }

    /// Record an entry.
    ///
    /// A failing log file write is reported on stderr and otherwise ignored:
    /// losing a log line must not change the outcome of a run.
    pub fn log(&self, level: Level, message: impl Into<String>) {
        let entry = LogEntry {
            ts: Utc::now(),
            level,
            message: message.into(),
        };

        if let Some(captured) = &self.captured {
            let mut entries = captured.lock().unwrap_or_else(|p| p.into_inner());
            entries.push(entry);
            return;
        }

        let line = entry.to_line();
        if self.echo {
            eprintln!("{}", line);
        }
        if let Some(file) = &self.file
            && let Err(e) = append_line(file, &line)
        {
            eprintln!("warning: failed to write log file '{}': {}", file.display(), e);
        }
    }

    /// Entries recorded by a capturing sink (empty for other sinks).
    pub fn entries(&self) -> Vec<LogEntry> {
        match &self.captured {
            Some(captured) => captured.lock().unwrap_or_else(|p| p.into_inner()).clone(),
            None => Vec::new(),
        }
    }

    /// Captured entries at the given level.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn level_display_matches_log_stream_names() {
        assert_eq!(Level::Info.to_string(), "INFO");
        assert_eq!(Level::Warning.to_string(), "WARNING");
        assert_eq!(Level::Error.to_string(), "ERROR");
        assert_eq!(Level::Success.to_string(), "SUCCESS");
    }

    #[test]
    fn entry_line_has_timestamp_and_level() {
        let entry = LogEntry {
            ts: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
            level: Level::Warning,
            message: "degraded".to_string(),
        };
        assert_eq!(entry.to_line(), "2026-01-02T03:04:05Z [WARNING] degraded");
    }

    #[test]
    fn multiline_message_is_indented() {
        let entry = LogEntry {
            ts: Utc::now(),
            level: Level::Error,
            message: "first\nsecond".to_string(),
        };
        let line = entry.to_line();
        assert!(line.ends_with("first\n    second"));
    }

    #[test]
    fn capture_records_entries_in_order() {
        let log = RunLog::capture();
        log.info("one");
        log.warn("two");
        log.success("three");

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, Level::Info);
        assert_eq!(entries[1].message, "two");
        assert_eq!(log.messages_at(Level::Success), vec!["three".to_string()]);
    }

    #[test]
    fn file_sink_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("mdxgen.log");

        let log = RunLog::to_file(&path, false).unwrap();
        log.info("first run");
        drop(log);

        let log = RunLog::to_file(&path, false).unwrap();
        log.error("second run");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[INFO] first run"));
        assert!(lines[1].contains("[ERROR] second run"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn non_capturing_sink_reports_no_entries() {
        let log = RunLog::stderr();
        assert!(log.entries().is_empty());
        assert!(log.file().is_none());
    }
}
