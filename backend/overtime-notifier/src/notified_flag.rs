// src/notified_flag.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

const FLAG_DATE_FORMAT: &str = "%Y-%m-%d";

/// File holding the date of the last caution-level notification.
#[derive(Debug, Clone)]
pub struct NotifiedFlag {
    path: PathBuf,
}

impl NotifiedFlag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the flag has never been written.
    pub fn read(&self) -> Result<Option<NaiveDate>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading flag file {}", self.path.display()))
            }
        };
        let stored = contents.trim();
        let date = NaiveDate::parse_from_str(stored, FLAG_DATE_FORMAT).with_context(|| {
            format!(
                "flag file {} holds an invalid date: {:?}",
                self.path.display(),
                stored
            )
        })?;
        Ok(Some(date))
    }

    // Overwrites any previous date
    pub fn set(&self, date: NaiveDate) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        fs::write(&self.path, date.format(FLAG_DATE_FORMAT).to_string())
            .with_context(|| format!("writing flag file {}", self.path.display()))?;
        info!("Weekly notification flag set to {} ({})", date, self.path.display());
        Ok(())
    }
}
