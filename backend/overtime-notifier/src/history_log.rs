// src/history_log.rs
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::policy::SkipReason;

pub const HISTORY_LOG_FILE_NAME: &str = "notify_history.log";

/// Replaces the first line starting with `date_key`, or appends `new_line` if none does.
pub fn upsert_lines(mut lines: Vec<String>, date_key: &str, new_line: String) -> Vec<String> {
    match lines.iter().position(|line| line.starts_with(date_key)) {
        Some(index) => lines[index] = new_line,
        None => lines.push(new_line),
    }
    lines
}

pub fn skipped_line(now: NaiveDateTime, reason: &SkipReason) -> String {
    format!("{} | not notified: {}", now.format("%Y-%m-%d %H:%M"), reason)
}

// --- File-backed Log ---

/// One line per calendar date; the latest run of the day wins.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn in_dir(log_dir: impl AsRef<Path>) -> Self {
        Self {
            path: log_dir.as_ref().join(HISTORY_LOG_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines split on `\n` only; a `\r` before it stays part of the line.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.split_terminator('\n').map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => {
                Err(e).with_context(|| format!("reading history log {}", self.path.display()))
            }
        }
    }

    pub fn upsert(&self, date: NaiveDate, line: String) -> Result<()> {
        let date_key = date.format("%Y-%m-%d").to_string();
        let lines = upsert_lines(self.read_lines()?, &date_key, line);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }

        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(&self.path, contents)
            .with_context(|| format!("writing history log {}", self.path.display()))?;
        debug!("History log {} updated for {}", self.path.display(), date_key);
        Ok(())
    }
}
