// src/report.rs
use chrono::NaiveDateTime;

use crate::metrics::{format_minutes_with_raw, percentage, AlertLevel};
use crate::model::OvertimeSample;

// Position of this month's total relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStanding {
    Within { remaining: u32 },
    Exceeded { over: u32 },
}

impl TargetStanding {
    fn of(minutes: u32, target_minutes: u32) -> Self {
        if minutes <= target_minutes {
            TargetStanding::Within {
                remaining: target_minutes - minutes,
            }
        } else {
            TargetStanding::Exceeded {
                over: minutes - target_minutes,
            }
        }
    }
}

/// Month-over-month overtime report. The same text is printed and sent as the DM body.
#[derive(Debug, Clone)]
pub struct Report {
    pub this_month: OvertimeSample,
    pub last_month: OvertimeSample,
    pub percent_vs_last: u32,
    pub percent_target: u32,
    pub standing: TargetStanding,
    pub alert: AlertLevel,
}

impl Report {
    pub fn build(this_month: OvertimeSample, last_month: OvertimeSample, target_minutes: u32) -> Self {
        let percent_target = percentage(this_month.minutes, target_minutes);
        Self {
            this_month,
            last_month,
            percent_vs_last: percentage(this_month.minutes, last_month.minutes),
            percent_target,
            standing: TargetStanding::of(this_month.minutes, target_minutes),
            alert: AlertLevel::from_percent(percent_target),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "📆 This month ({}) overtime: {}",
                self.this_month.year_month.label(),
                format_minutes_with_raw(self.this_month.minutes)
            ),
            format!(
                "📆 Last month ({}) overtime: {}",
                self.last_month.year_month.label(),
                format_minutes_with_raw(self.last_month.minutes)
            ),
        ];

        let comparison = match self.standing {
            TargetStanding::Within { remaining } => format!(
                "📊 vs last month: {}% ⏳ within limit: {} remaining",
                self.percent_vs_last,
                format_minutes_with_raw(remaining)
            ),
            TargetStanding::Exceeded { over } => format!(
                "📊 vs last month: {}% 🚨 limit exceeded: +{} suppression failed",
                self.percent_vs_last,
                format_minutes_with_raw(over)
            ),
        };
        lines.push(comparison);
        lines.push(self.alert.annotation());
        lines
    }

    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    /// Single-line form written to the history log after a notification.
    pub fn summary_line(&self, now: NaiveDateTime) -> String {
        let standing = match self.standing {
            TargetStanding::Within { remaining } => {
                format!("remaining to limit: {}", format_minutes_with_raw(remaining))
            }
            TargetStanding::Exceeded { over } => {
                format!("limit exceeded: +{}", format_minutes_with_raw(over))
            }
        };
        format!(
            "{} | overtime: {} | {} | vs last month: {}% | {}",
            now.format("%Y-%m-%d %H:%M"),
            format_minutes_with_raw(self.this_month.minutes),
            standing,
            self.percent_vs_last,
            self.alert.annotation()
        )
    }
}
