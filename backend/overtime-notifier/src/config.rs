// src/config.rs
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::overtime_client::OvertimeApiConfig;
use crate::policy::WeeklyReportSlot;

pub const DEFAULT_OVERTIME_TARGET: u32 = 600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Failed to read env file {path}: {message}")]
    EnvFile { path: String, message: String },
    #[error("OVERTIME_TARGET must be greater than zero")]
    ZeroTarget,
    #[error("Invalid WEEKLY_REPORT_TIME {0:?}, expected HH:MM")]
    InvalidReportTime(String),
    #[error("Invalid date {0:?} in EXTRA_HOLIDAYS, expected YYYY-MM-DD")]
    InvalidHoliday(String),
}

fn default_overtime_target() -> u32 {
    DEFAULT_OVERTIME_TARGET
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("log")
}

fn default_flag_path() -> PathBuf {
    PathBuf::from(".notified_flag")
}

fn default_weekly_report_time() -> String {
    "21:30".to_string()
}

// Raw settings as read from the environment
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Usage API
    pub api_base_url: String,
    pub api_endpoint: String,
    pub api_token: String,
    pub target_key: String,
    pub division_id: String,
    #[serde(default = "default_overtime_target")]
    pub overtime_target: u32,

    // Slack
    pub slack_bot_token: String,
    #[serde(default)]
    pub slack_dm_emails: String,

    // Local state
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_flag_path")]
    pub notified_flag_path: PathBuf,

    // Schedule
    #[serde(default = "default_weekly_report_time")]
    pub weekly_report_time: String,
    #[serde(default)]
    pub extra_holidays: String,
}

/// Immutable per-run view of who is tracked and who hears about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub target_minutes: u32,
    pub employee_key: String,
    pub division_id: String,
    pub recipients: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        Self::from_process_env()
    }

    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        dotenv::from_path(path).map_err(|e| ConfigError::EnvFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_process_env()
    }

    fn from_process_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.overtime_target == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        self.weekly_report_slot()?;
        self.extra_holiday_dates()?;
        Ok(())
    }

    pub fn recipients(&self) -> Vec<String> {
        split_list(&self.slack_dm_emails)
    }

    pub fn target(&self) -> TargetConfig {
        TargetConfig {
            target_minutes: self.overtime_target,
            employee_key: self.target_key.clone(),
            division_id: self.division_id.clone(),
            recipients: self.recipients(),
        }
    }

    pub fn api_config(&self) -> OvertimeApiConfig {
        OvertimeApiConfig {
            base_url: self.api_base_url.clone(),
            endpoint: self.api_endpoint.clone(),
            token: self.api_token.clone(),
            employee_key: self.target_key.clone(),
            division_id: self.division_id.clone(),
        }
    }

    pub fn weekly_report_slot(&self) -> Result<WeeklyReportSlot, ConfigError> {
        let raw = self.weekly_report_time.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .map(WeeklyReportSlot::friday_at)
            .map_err(|_| ConfigError::InvalidReportTime(raw.to_string()))
    }

    pub fn extra_holiday_dates(&self) -> Result<Vec<NaiveDate>, ConfigError> {
        split_list(&self.extra_holidays)
            .into_iter()
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| ConfigError::InvalidHoliday(raw))
            })
            .collect()
    }
}

// Comma-separated, trimmed, empties dropped
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
