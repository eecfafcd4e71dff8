// src/main.rs
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod clock;
mod config;
mod history_log;
mod holidays;
mod metrics;
mod model;
mod notified_flag;
mod overtime_client;
mod policy;
mod report;
mod runner;
mod slack_notifier;

mod runner_tests;

use clock::SystemClock;
use config::{Config, ConfigError};
use history_log::HistoryLog;
use holidays::JapaneseHolidayCalendar;
use notified_flag::NotifiedFlag;
use overtime_client::OvertimeApiClient;
use policy::NotificationPolicy;
use runner::{RunOutcome, Runner};
use slack_notifier::{NotificationError, SlackNotifier};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Notifier setup failed: {0}")]
    Notifier(#[from] NotificationError),
}

/// Compare this month's overtime with the target and last month, and DM a report when due.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Print the report and decision without sending or writing anything
    #[arg(long)]
    dry_run: bool,

    /// Directory for notify_history.log (overrides LOG_DIR)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Weekly notification flag file (overrides NOTIFIED_FLAG_PATH)
    #[arg(long)]
    flag_file: Option<PathBuf>,

    /// Load settings from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Load Configuration ---
    let config = match &cli.env_file {
        Some(path) => Config::from_env_file(path)?,
        None => Config::from_env()?,
    };
    let target = config.target();
    let log_dir = cli.log_dir.clone().unwrap_or_else(|| config.log_dir.clone());
    let flag_path = cli
        .flag_file
        .clone()
        .unwrap_or_else(|| config.notified_flag_path.clone());
    info!(
        "Configuration loaded. Target: {} min, {} recipient(s), log dir: {}, flag: {}",
        target.target_minutes,
        target.recipients.len(),
        log_dir.display(),
        flag_path.display()
    );

    // --- Collaborators ---
    let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    let source = OvertimeApiClient::new(config.api_config(), http_client);
    let dispatcher = SlackNotifier::new(&config.slack_bot_token)?;
    let calendar = JapaneseHolidayCalendar::new(config.extra_holiday_dates()?);
    let policy = NotificationPolicy::new(Arc::new(calendar), config.weekly_report_slot()?);

    let runner = Runner::new(
        target,
        Arc::new(SystemClock),
        Arc::new(source),
        Arc::new(dispatcher),
        policy,
        NotifiedFlag::new(flag_path),
        HistoryLog::in_dir(log_dir),
    )
    .dry_run(cli.dry_run);

    // Every outcome exits 0
    match runner.run().await {
        RunOutcome::DataUnavailable => info!("Run finished: overtime data unavailable"),
        RunOutcome::Notified { reason, dispatch } => info!(
            "Run finished: notified ({:?}), {} delivered, {} failed",
            reason,
            dispatch.delivered.len(),
            dispatch.failed.len()
        ),
        RunOutcome::Skipped(reason) => info!("Run finished: skipped ({})", reason),
        RunOutcome::DryRun(decision) => info!("Run finished: dry run ({:?})", decision),
    }

    Ok(())
}
