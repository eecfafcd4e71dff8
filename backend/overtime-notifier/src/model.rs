// src/model.rs
use chrono::{Datelike, NaiveDate};
use std::fmt;

// --- Calendar Month ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32, // 1-12
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month out of range: {}", month);
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// Path form used by the usage API, e.g. `2024-06`.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Display form used in reports, e.g. `2024/06`.
    pub fn label(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

// One month's overtime total for the configured employee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvertimeSample {
    pub year_month: YearMonth,
    pub minutes: u32,
}

impl OvertimeSample {
    pub fn new(year_month: YearMonth, minutes: u32) -> Self {
        Self {
            year_month,
            minutes,
        }
    }
}
