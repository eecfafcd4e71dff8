// src/runner.rs
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::config::TargetConfig;
use crate::history_log::{skipped_line, HistoryLog};
use crate::model::{OvertimeSample, YearMonth};
use crate::notified_flag::NotifiedFlag;
use crate::overtime_client::OvertimeSource;
use crate::policy::{sets_weekly_flag, Decision, NotificationPolicy, NotifyReason, SkipReason};
use crate::report::Report;
use crate::slack_notifier::{dispatch_report, DispatchSummary, Dispatcher};

/// Where the user-facing report and status lines go.
pub trait Console: Send + Sync {
    fn print(&self, text: &str);
}

pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&self, text: &str) {
        println!("{}", text);
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    /// One of the two months had no figure; nothing was sent or written.
    DataUnavailable,
    Notified {
        reason: NotifyReason,
        dispatch: DispatchSummary,
    },
    Skipped(SkipReason),
    DryRun(Decision),
}

pub struct Runner {
    target: TargetConfig,
    clock: Arc<dyn Clock>,
    source: Arc<dyn OvertimeSource>,
    dispatcher: Arc<dyn Dispatcher>,
    policy: NotificationPolicy,
    flag: NotifiedFlag,
    history: HistoryLog,
    console: Arc<dyn Console>,
    dry_run: bool,
}

impl Runner {
    pub fn new(
        target: TargetConfig,
        clock: Arc<dyn Clock>,
        source: Arc<dyn OvertimeSource>,
        dispatcher: Arc<dyn Dispatcher>,
        policy: NotificationPolicy,
        flag: NotifiedFlag,
        history: HistoryLog,
    ) -> Self {
        Self {
            target,
            clock,
            source,
            dispatcher,
            policy,
            flag,
            history,
            console: Arc::new(StdoutConsole),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    pub async fn run(&self) -> RunOutcome {
        let now = self.clock.now();
        let today = now.date();
        let this_month = YearMonth::of(today);
        let last_month = this_month.previous();
        info!(
            "Checking overtime for employee {} (division {}), {} vs {}",
            self.target.employee_key, self.target.division_id, this_month, last_month
        );

        let samples = (
            self.fetch(this_month).await,
            self.fetch(last_month).await,
        );
        let (this_sample, last_sample) = match samples {
            (Some(this_sample), Some(last_sample)) => (this_sample, last_sample),
            _ => {
                self.console.print("⚠ Could not retrieve overtime figures.");
                warn!("Overtime data unavailable; skipping notification and history log");
                return RunOutcome::DataUnavailable;
            }
        };

        let report = Report::build(this_sample, last_sample, self.target.target_minutes);
        self.console.print(&report.text());

        let last_notified = self.read_flag();
        let decision = self.policy.decide(now, report.percent_target, last_notified);
        info!(
            "Decision at {} for {}% of target: {:?}",
            now.format("%Y-%m-%d %H:%M"),
            report.percent_target,
            decision
        );

        if self.dry_run {
            self.console
                .print(&format!("Dry run, nothing sent or written: {:?}", decision));
            return RunOutcome::DryRun(decision);
        }

        match decision {
            Decision::Notify(reason) => {
                let dispatch =
                    dispatch_report(self.dispatcher.as_ref(), &self.target.recipients, &report.text())
                        .await;
                if !dispatch.failed.is_empty() {
                    warn!(
                        "{} of {} recipients could not be notified",
                        dispatch.failed.len(),
                        self.target.recipients.len()
                    );
                }

                self.write_history(today, report.summary_line(now));
                if sets_weekly_flag(report.percent_target) {
                    if let Err(e) = self.flag.set(today) {
                        error!("Failed to set weekly notification flag: {:#}", e);
                    }
                }
                RunOutcome::Notified { reason, dispatch }
            }
            Decision::Skip(reason) => {
                self.console
                    .print(&format!("⏳ Notification skipped: {}", reason));
                self.write_history(today, skipped_line(now, &reason));
                RunOutcome::Skipped(reason)
            }
        }
    }

    // Errors become "no data" for this month
    async fn fetch(&self, year_month: YearMonth) -> Option<OvertimeSample> {
        match self.source.fetch_overtime(year_month).await {
            Ok(Some(minutes)) => Some(OvertimeSample::new(year_month, minutes)),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to fetch overtime for {}: {}", year_month, e);
                None
            }
        }
    }

    fn read_flag(&self) -> Option<NaiveDate> {
        self.flag.read().unwrap_or_else(|e| {
            warn!(
                "Ignoring unreadable notification flag {}: {:#}",
                self.flag.path().display(),
                e
            );
            None
        })
    }

    fn write_history(&self, date: NaiveDate, line: String) {
        if let Err(e) = self.history.upsert(date, line) {
            error!(
                "Failed to update history log {}: {:#}",
                self.history.path().display(),
                e
            );
        }
    }
}
