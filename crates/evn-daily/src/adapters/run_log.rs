//! Run Log
//!
//! Append-only `[YYYY-MM-DD HH:MM:SS] message` file kept by cron mode.
//! One event per line; every line is mirrored to tracing.

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::PipelineError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LINE_JOINER: &str = " | ";

pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, message: &str) -> Result<(), PipelineError> {
        self.append_at(Local::now(), message)
    }

    pub fn append_at(&self, at: DateTime<Local>, message: &str) -> Result<(), PipelineError> {
        let message = single_line(message);
        tracing::info!(target: "evn_daily::cron", "{}", message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::persistence(&self.path, e))?;
        writeln!(file, "[{}] {}", at.format(TIMESTAMP_FORMAT), message)
            .map_err(|e| PipelineError::persistence(&self.path, e))
    }

    /// Last `n` lines, oldest first. A missing log has no lines.
    pub fn tail(&self, n: usize) -> Result<Vec<String>, PipelineError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PipelineError::persistence(&self.path, e)),
        };

        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let start = lines.len().saturating_sub(n);
        Ok(lines[start..].to_vec())
    }
}

/// Flatten captured process output into one log event: ANSI escapes
/// dropped, blank lines skipped, remaining lines joined.
pub fn single_line(message: &str) -> String {
    strip_ansi(message)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_JOINER)
}

fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            out.push(c);
            continue;
        }
        // CSI sequence: ESC [ params final-byte
        if chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_lines_are_timestamped_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("evn_daily.log"));
        let at = Local.with_ymd_and_hms(2025, 7, 7, 6, 0, 0).unwrap();

        log.append_at(at, "first").unwrap();
        log.append_at(at, "second").unwrap();

        let lines = log.tail(10).unwrap();
        assert_eq!(
            lines,
            vec!["[2025-07-07 06:00:00] first", "[2025-07-07 06:00:00] second"]
        );
    }

    #[test]
    fn test_tail_keeps_most_recent_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("evn_daily.log"));
        for i in 0..5 {
            log.append(&format!("line {i}")).unwrap();
        }

        let tail = log.tail(2).unwrap();
        assert_eq!(tail.len(), 2);
        assert!(tail[0].ends_with("line 3"));
        assert!(tail[1].ends_with("line 4"));
    }

    #[test]
    fn test_multi_line_message_becomes_one_event() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("evn_daily.log"));
        let at = Local.with_ymd_and_hms(2025, 7, 7, 6, 0, 0).unwrap();

        let stderr = "\u{1b}[2m2025-07-07T06:00:01Z\u{1b}[0m \u{1b}[33m WARN\u{1b}[0m probe failed\n\n\
                      \u{1b}[31mERROR\u{1b}[0m write failed\n";
        log.append_at(at, &format!("❌ run failed: {stderr}")).unwrap();

        let lines = log.tail(10).unwrap();
        assert_eq!(
            lines,
            vec![
                "[2025-07-07 06:00:00] ❌ run failed: 2025-07-07T06:00:01Z  WARN probe failed | ERROR write failed"
            ]
        );
    }

    #[test]
    fn test_single_line_keeps_plain_text() {
        assert_eq!(single_line("already one line"), "already one line");
        assert_eq!(single_line("  a \r\n b  "), "a | b");
        assert_eq!(single_line(""), "");
    }

    #[test]
    fn test_missing_log_has_no_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("absent.log"));
        assert!(log.tail(50).unwrap().is_empty());
    }
}
