//! Append-only notification log.
//!
//! One line per event: `[YYYY-MM-DD HH:MM:SS] NOTIFICATION: <message>`.
//! The file is never rotated or truncated.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RelayError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MARKER: &str = "NOTIFICATION: ";

/// A parsed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl LogEntry {
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (stamp, rest) = rest.split_once("] ")?;
        let message = rest.strip_prefix(MARKER)?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            timestamp,
            message: unescape(message),
        })
    }
}

/// Backslash, CR and LF are escaped so that an event never spans more than
/// one line and `unescape` restores the original message.
fn escape(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for ch in message.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(logged: &str) -> String {
    let mut out = String::with_capacity(logged.len());
    let mut chars = logged.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            // Unknown escape: keep as written
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Render one log line, without the trailing newline.
pub fn format_line(timestamp: NaiveDateTime, message: &str) -> String {
    let message = escape(message);
    format!("[{}] {MARKER}{message}", timestamp.format(TIMESTAMP_FORMAT))
}

pub struct NotificationLog {
    path: PathBuf,
}

impl NotificationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, message: &str) -> Result<()> {
        self.append_at(Local::now().naive_local(), message)
    }

    /// Append one line stamped with `timestamp`, creating parent dirs.
    pub fn append_at(&self, timestamp: NaiveDateTime, message: &str) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.resource_error(e))?;
        }

        let mut line = format_line(timestamp, message);
        line.push('\n');

        // Single write on an O_APPEND handle keeps concurrent hooks' lines whole.
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.resource_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.resource_error(e))?;

        debug!("Logged notification to {}", self.path.display());
        Ok(())
    }

    /// Load every well-formed entry. A missing log is empty, not an error.
    pub fn load_entries(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.resource_error(e))?;
        let entries = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let entry = LogEntry::parse(line);
                if entry.is_none() {
                    debug!("Skipping malformed log line: {line}");
                }
                entry
            })
            .collect();

        Ok(entries)
    }

    /// The last `limit` entries (oldest first), optionally restricted to one day.
    pub fn recent(&self, limit: usize, date: Option<NaiveDate>) -> Result<Vec<LogEntry>> {
        let mut entries = self.load_entries()?;
        if let Some(date) = date {
            entries.retain(|e| e.timestamp.date() == date);
        }
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }

    fn resource_error(&self, source: std::io::Error) -> RelayError {
        RelayError::Resource {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn line_format() {
        assert_eq!(
            format_line(at("2024-01-01 10:00:00"), "Build finished"),
            "[2024-01-01 10:00:00] NOTIFICATION: Build finished"
        );
    }

    #[test]
    fn newlines_are_escaped() {
        assert_eq!(
            format_line(at("2024-01-01 10:00:00"), "line one\r\nline two"),
            "[2024-01-01 10:00:00] NOTIFICATION: line one\\r\\nline two"
        );
    }

    #[test]
    fn backslashes_are_escaped_and_restored() {
        let real_newline = format_line(at("2024-01-01 10:00:00"), "a\nb");
        let literal = format_line(at("2024-01-01 10:00:00"), "a\\nb");
        assert_ne!(real_newline, literal);
        assert_eq!(literal, "[2024-01-01 10:00:00] NOTIFICATION: a\\\\nb");

        assert_eq!(LogEntry::parse(&real_newline).unwrap().message, "a\nb");
        assert_eq!(LogEntry::parse(&literal).unwrap().message, "a\\nb");
    }

    #[test]
    fn messages_survive_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = NotificationLog::new(dir.path().join("n.log"));
        let message = "path C:\\temp\\new\r\nsecond line";

        log.append(message).unwrap();

        let entries = log.load_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, message);
    }

    #[test]
    fn append_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/logs/notifications.log");
        let log = NotificationLog::new(&path);

        log.append_at(at("2024-01-01 10:00:00"), "Build finished").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "[2024-01-01 10:00:00] NOTIFICATION: Build finished\n");
    }

    #[test]
    fn appends_are_not_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let log = NotificationLog::new(dir.path().join("n.log"));

        log.append("same").unwrap();
        log.append("same").unwrap();

        let entries = log.load_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.message == "same"));
    }

    #[test]
    fn append_uses_current_time() {
        let dir = tempfile::tempdir().unwrap();
        let log = NotificationLog::new(dir.path().join("n.log"));

        // Second precision: truncate the window bounds the same way.
        let before = Local::now().naive_local().with_nanosecond(0).unwrap();
        log.append("now").unwrap();
        let after = Local::now().naive_local();

        let entry = &log.load_entries().unwrap()[0];
        assert!(entry.timestamp >= before && entry.timestamp <= after);
    }

    #[test]
    fn existing_content_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("n.log");
        fs::write(&path, "[2023-12-31 23:59:59] NOTIFICATION: old\n").unwrap();

        NotificationLog::new(&path)
            .append_at(at("2024-01-01 00:00:00"), "new")
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("[2023-12-31 23:59:59] NOTIFICATION: old\n"));
    }

    #[test]
    fn unwritable_path_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        // Parent "directory" is a regular file.
        let log = NotificationLog::new(blocker.join("n.log"));
        let err = log.append("x").unwrap_err();
        assert!(matches!(err, RelayError::Resource { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!(LogEntry::parse("garbage").is_none());
        assert!(LogEntry::parse("[2024-13-01 10:00:00] NOTIFICATION: x").is_none());
        assert!(LogEntry::parse("[2024-01-01 10:00:00] OTHER: x").is_none());

        let entry = LogEntry::parse("[2024-01-01 10:00:00] NOTIFICATION: a ] b").unwrap();
        assert_eq!(entry.message, "a ] b");
    }

    #[test]
    fn recent_limits_and_filters_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("n.log");
        fs::write(
            &path,
            "[2024-01-01 09:00:00] NOTIFICATION: a\n\
             not a log line\n\
             [2024-01-02 09:00:00] NOTIFICATION: b\n\
             [2024-01-02 10:00:00] NOTIFICATION: c\n\
             [2024-01-03 09:00:00] NOTIFICATION: d\n",
        )
        .unwrap();
        let log = NotificationLog::new(&path);

        let last_two: Vec<_> = log
            .recent(2, None)
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(last_two, ["c", "d"]);

        let day = NaiveDate::from_ymd_opt(2024, 1, 2);
        let on_day: Vec<_> = log
            .recent(10, day)
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(on_day, ["b", "c"]);
    }

    #[test]
    fn missing_log_has_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = NotificationLog::new(dir.path().join("absent.log"));
        assert!(log.recent(5, None).unwrap().is_empty());
    }
}
