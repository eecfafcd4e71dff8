// src/policy.rs
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::holidays::HolidayCalendar;
use crate::metrics::{CAUTION_PERCENT, WARNING_PERCENT};

// --- Decision Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyReason {
    /// End-of-week report, sent whatever the percentage.
    WeeklyReport,
    Warning,
    Caution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Weekend(Weekday),
    Holiday,
    BelowThreshold(u32),
    AlreadyNotifiedThisWeek,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Weekend(weekday) => {
                let day = if *weekday == Weekday::Sat {
                    "Saturday"
                } else {
                    "Sunday"
                };
                write!(
                    f,
                    "{} is outside notification days (weekday={})",
                    day,
                    weekday.num_days_from_monday()
                )
            }
            SkipReason::Holiday => write!(f, "public holiday is outside notification days"),
            SkipReason::BelowThreshold(percent) => write!(
                f,
                "overtime ratio {}% is below the notification threshold",
                percent
            ),
            SkipReason::AlreadyNotifiedThisWeek => write!(
                f,
                "notification condition not met (outside weekly report slot and already notified this week)"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Notify(NotifyReason),
    Skip(SkipReason),
}

// --- Weekly Report Slot ---

/// Minute of the week at which a report goes out regardless of thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyReportSlot {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl WeeklyReportSlot {
    pub fn friday_at(time: NaiveTime) -> Self {
        Self {
            weekday: Weekday::Fri,
            time,
        }
    }

    // Seconds are ignored
    pub fn matches(&self, now: NaiveDateTime) -> bool {
        now.weekday() == self.weekday
            && now.hour() == self.time.hour()
            && now.minute() == self.time.minute()
    }
}

impl Default for WeeklyReportSlot {
    fn default() -> Self {
        Self::friday_at(NaiveTime::from_hms_opt(21, 30, 0).unwrap_or_default())
    }
}

// --- Policy ---

pub struct NotificationPolicy {
    calendar: Arc<dyn HolidayCalendar>,
    weekly_slot: WeeklyReportSlot,
}

impl NotificationPolicy {
    pub fn new(calendar: Arc<dyn HolidayCalendar>, weekly_slot: WeeklyReportSlot) -> Self {
        Self {
            calendar,
            weekly_slot,
        }
    }

    pub fn decide(
        &self,
        now: NaiveDateTime,
        percent_target: u32,
        last_notified: Option<NaiveDate>,
    ) -> Decision {
        let today = now.date();
        let weekday = today.weekday();

        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            return Decision::Skip(SkipReason::Weekend(weekday));
        }
        if self.calendar.is_holiday(today) {
            return Decision::Skip(SkipReason::Holiday);
        }

        if self.weekly_slot.matches(now) {
            return Decision::Notify(NotifyReason::WeeklyReport);
        }

        if percent_target >= WARNING_PERCENT {
            return Decision::Notify(NotifyReason::Warning);
        }

        if percent_target >= CAUTION_PERCENT {
            let notified = last_notified
                .map(|stored| already_notified_this_week(stored, today))
                .unwrap_or(false);
            if !notified {
                return Decision::Notify(NotifyReason::Caution);
            }
            debug!(
                "Caution-level notification already sent this week (flag: {:?})",
                last_notified
            );
            return Decision::Skip(SkipReason::AlreadyNotifiedThisWeek);
        }

        Decision::Skip(SkipReason::BelowThreshold(percent_target))
    }
}

/// Compares ISO week numbers only; the year is not checked, so the same week
/// number in another year also counts as "this week".
pub fn already_notified_this_week(stored: NaiveDate, today: NaiveDate) -> bool {
    stored.iso_week().week() == today.iso_week().week()
}

/// Whether a sent notification at this percentage should set the weekly flag.
pub fn sets_weekly_flag(percent_target: u32) -> bool {
    (CAUTION_PERCENT..WARNING_PERCENT).contains(&percent_target)
}
