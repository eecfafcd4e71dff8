// src/runner_tests.rs

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::clock::TestClock;
    use crate::config::TargetConfig;
    use crate::history_log::HistoryLog;
    use crate::holidays::JapaneseHolidayCalendar;
    use crate::model::YearMonth;
    use crate::notified_flag::NotifiedFlag;
    use crate::overtime_client::{OvertimeError, OvertimeSource};
    use crate::policy::{
        Decision, NotificationPolicy, NotifyReason, SkipReason, WeeklyReportSlot,
    };
    use crate::runner::test_support::RecordingConsole;
    use crate::runner::{RunOutcome, Runner};
    use crate::slack_notifier::test_support::MockDispatcher;

    const TARGET_MINUTES: u32 = 600;

    // Usage source answering from a fixed table; `failing` months return an API error
    #[derive(Default)]
    struct FakeSource {
        minutes: HashMap<YearMonth, u32>,
        failing: Vec<YearMonth>,
    }

    impl FakeSource {
        fn with(mut self, year: i32, month: u32, minutes: u32) -> Self {
            self.minutes.insert(YearMonth::new(year, month), minutes);
            self
        }

        fn failing(mut self, year: i32, month: u32) -> Self {
            self.failing.push(YearMonth::new(year, month));
            self
        }
    }

    #[async_trait]
    impl OvertimeSource for FakeSource {
        async fn fetch_overtime(
            &self,
            year_month: YearMonth,
        ) -> Result<Option<u32>, OvertimeError> {
            if self.failing.contains(&year_month) {
                return Err(OvertimeError::ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "boom".to_string(),
                });
            }
            Ok(self.minutes.get(&year_month).copied())
        }
    }

    struct Harness {
        runner: Runner,
        clock: TestClock,
        dispatcher: MockDispatcher,
        console: RecordingConsole,
        flag: NotifiedFlag,
        history: HistoryLog,
    }

    fn state_dir(test_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("overtime_notifier_run_{}", test_name))
    }

    fn teardown(test_name: &str) {
        let _ = fs::remove_dir_all(state_dir(test_name));
    }

    fn setup(test_name: &str, now: &str, source: FakeSource, dispatcher: MockDispatcher) -> Harness {
        teardown(test_name);
        let dir = state_dir(test_name);
        let clock = TestClock::new(now);
        let console = RecordingConsole::new();
        let flag = NotifiedFlag::new(dir.join(".notified_flag"));
        let history = HistoryLog::in_dir(dir.join("log"));
        let target = TargetConfig {
            target_minutes: TARGET_MINUTES,
            employee_key: "E042".to_string(),
            division_id: "D7".to_string(),
            recipients: vec!["a@example.com".to_string(), "b@example.com".to_string()],
        };
        let policy = NotificationPolicy::new(
            Arc::new(JapaneseHolidayCalendar::default()),
            WeeklyReportSlot::default(),
        );
        let runner = Runner::new(
            target,
            Arc::new(clock.clone()),
            Arc::new(source),
            Arc::new(dispatcher.clone()),
            policy,
            flag.clone(),
            history.clone(),
        )
        .console(Arc::new(console.clone()));
        Harness {
            runner,
            clock,
            dispatcher,
            console,
            flag,
            history,
        }
    }

    fn june(minutes: u32) -> FakeSource {
        FakeSource::default()
            .with(2024, 6, minutes)
            .with(2024, 5, 500)
    }

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_missing_last_month_aborts_quietly() {
        let test_name = "missing_last_month";
        let source = FakeSource::default().with(2024, 6, 570);
        let h = setup(test_name, "2024-06-04 10:00:00", source, MockDispatcher::new());

        let outcome = h.runner.run().await;

        assert!(matches!(outcome, RunOutcome::DataUnavailable));
        assert_eq!(
            h.console.printed(),
            vec!["⚠ Could not retrieve overtime figures.".to_string()]
        );
        assert!(h.dispatcher.sent().is_empty());
        assert!(!h.history.path().exists());
        assert_eq!(h.flag.read().unwrap(), None);
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_fetch_error_counts_as_unavailable() {
        let test_name = "fetch_error";
        let source = FakeSource::default().with(2024, 5, 500).failing(2024, 6);
        let h = setup(test_name, "2024-06-04 10:00:00", source, MockDispatcher::new());

        let outcome = h.runner.run().await;

        assert!(matches!(outcome, RunOutcome::DataUnavailable));
        assert_eq!(h.console.printed().len(), 1);
        assert!(h.dispatcher.sent().is_empty());
        assert!(!h.history.path().exists());
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_last_month_of_previous_year_is_fetched_in_january() {
        let test_name = "january";
        let source = FakeSource::default()
            .with(2025, 1, 300)
            .with(2024, 12, 600);
        let h = setup(test_name, "2025-01-07 10:00:00", source, MockDispatcher::new());

        let outcome = h.runner.run().await;

        assert!(matches!(
            outcome,
            RunOutcome::Skipped(SkipReason::BelowThreshold(50))
        ));
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_warning_level_notifies_everyone_without_flag() {
        let test_name = "warning_level";
        let h = setup(test_name, "2024-06-04 10:00:00", june(570), MockDispatcher::new());

        let outcome = h.runner.run().await;

        match outcome {
            RunOutcome::Notified { reason, dispatch } => {
                assert_eq!(reason, NotifyReason::Warning);
                assert_eq!(dispatch.delivered.len(), 2);
            }
            other => panic!("Expected notification but got: {:?}", other),
        }
        let sent = h.dispatcher.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].1.contains("⚠️ warning: over 90%"), "{}", sent[0].1);

        let lines = h.history.read_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("2024-06-04 10:00 | overtime: 9:30 (570 min)"));
        assert_eq!(h.flag.read().unwrap(), None);
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_caution_level_sets_flag_then_dedupes() {
        let test_name = "caution_dedupe";
        let h = setup(test_name, "2024-06-04 10:00:00", june(510), MockDispatcher::new());

        let first = h.runner.run().await;
        assert!(matches!(
            first,
            RunOutcome::Notified {
                reason: NotifyReason::Caution,
                ..
            }
        ));
        assert_eq!(h.flag.read().unwrap(), Some(d("2024-06-04")));
        assert_eq!(h.dispatcher.sent().len(), 2);

        // Later the same day: deduped, and the skip replaces the day's log line
        h.clock.set_time("2024-06-04 15:00:00");
        let second = h.runner.run().await;
        assert!(matches!(
            second,
            RunOutcome::Skipped(SkipReason::AlreadyNotifiedThisWeek)
        ));
        assert_eq!(h.dispatcher.sent().len(), 2);
        let lines = h.history.read_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("2024-06-04 15:00 | not notified:"), "{}", lines[0]);

        // Next ISO week: notifies again
        h.clock.set_time("2024-06-10 10:00:00");
        let third = h.runner.run().await;
        assert!(matches!(
            third,
            RunOutcome::Notified {
                reason: NotifyReason::Caution,
                ..
            }
        ));
        assert_eq!(h.flag.read().unwrap(), Some(d("2024-06-10")));
        assert_eq!(h.history.read_lines().unwrap().len(), 2);
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_weekend_skips_and_logs_reason() {
        let test_name = "weekend";
        let h = setup(test_name, "2024-06-08 10:00:00", june(570), MockDispatcher::new());

        let outcome = h.runner.run().await;

        assert!(matches!(outcome, RunOutcome::Skipped(SkipReason::Weekend(_))));
        assert!(h.dispatcher.sent().is_empty());
        let printed = h.console.printed();
        assert_eq!(printed.len(), 2);
        assert!(printed[0].starts_with("📆 This month (2024/06) overtime: 9:30"), "{}", printed[0]);
        assert_eq!(
            printed[1],
            "⏳ Notification skipped: Saturday is outside notification days (weekday=5)"
        );
        assert_eq!(
            h.history.read_lines().unwrap(),
            vec![
                "2024-06-08 10:00 | not notified: Saturday is outside notification days (weekday=5)"
                    .to_string()
            ]
        );
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_friday_report_slot_sends_low_percentage() {
        let test_name = "friday_slot";
        let h = setup(test_name, "2024-06-07 21:30:00", june(60), MockDispatcher::new());

        let outcome = h.runner.run().await;

        assert!(matches!(
            outcome,
            RunOutcome::Notified {
                reason: NotifyReason::WeeklyReport,
                ..
            }
        ));
        assert_eq!(h.dispatcher.sent().len(), 2);
        assert!(h.dispatcher.sent()[0].1.ends_with("✅ no issue"));
        assert_eq!(h.flag.read().unwrap(), None);
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_recipient_failure_still_logs() {
        let test_name = "recipient_failure";
        let dispatcher = MockDispatcher::new().with_unknown("a@example.com");
        let h = setup(test_name, "2024-06-04 10:00:00", june(650), dispatcher);

        let outcome = h.runner.run().await;

        match outcome {
            RunOutcome::Notified { dispatch, .. } => {
                assert_eq!(dispatch.failed.len(), 1);
                assert_eq!(dispatch.delivered.len(), 1);
                assert_eq!(dispatch.delivered[0].0, "b@example.com");
            }
            other => panic!("Expected notification but got: {:?}", other),
        }
        let lines = h.history.read_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("limit exceeded: +0:50 (50 min)"));
        assert!(lines[0].contains("vs last month: 130%"));
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_garbled_flag_is_treated_as_unset() {
        let test_name = "garbled_flag";
        let h = setup(test_name, "2024-06-04 10:00:00", june(510), MockDispatcher::new());
        fs::create_dir_all(state_dir(test_name)).unwrap();
        fs::write(h.flag.path(), "yesterday").unwrap();

        let outcome = h.runner.run().await;

        assert!(matches!(
            outcome,
            RunOutcome::Notified {
                reason: NotifyReason::Caution,
                ..
            }
        ));
        assert_eq!(h.flag.read().unwrap(), Some(d("2024-06-04")));
        teardown(test_name);
    }

    #[tokio::test]
    async fn test_dry_run_sends_and_writes_nothing() {
        let test_name = "dry_run";
        let h = setup(test_name, "2024-06-04 10:00:00", june(510), MockDispatcher::new());
        let runner = h.runner.dry_run(true);

        let outcome = runner.run().await;

        assert!(matches!(
            outcome,
            RunOutcome::DryRun(Decision::Notify(NotifyReason::Caution))
        ));
        assert!(h.dispatcher.sent().is_empty());
        assert!(!h.history.path().exists());
        assert_eq!(h.flag.read().unwrap(), None);
        teardown(test_name);
    }
}
