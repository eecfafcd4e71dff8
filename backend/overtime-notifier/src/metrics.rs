// src/metrics.rs

// Alert thresholds, percent of the monthly target
pub const CRITICAL_PERCENT: u32 = 100;
pub const WARNING_PERCENT: u32 = 90;
pub const CAUTION_PERCENT: u32 = 80;
pub const NOTE_PERCENT: u32 = 50;

/// `numerator / denominator * 100`, rounded half-to-even. A zero denominator yields 0.
pub fn percentage(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let ratio = f64::from(numerator) / f64::from(denominator) * 100.0;
    ratio.round_ties_even() as u32
}

/// Formats minutes as `H:MM`, e.g. 65 -> "1:05".
pub fn format_minutes(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// `H:MM (N min)`
pub fn format_minutes_with_raw(minutes: u32) -> String {
    format!("{} ({} min)", format_minutes(minutes), minutes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertLevel {
    Clear,
    Note,
    Caution,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn from_percent(percent_target: u32) -> Self {
        if percent_target >= CRITICAL_PERCENT {
            AlertLevel::Critical
        } else if percent_target >= WARNING_PERCENT {
            AlertLevel::Warning
        } else if percent_target >= CAUTION_PERCENT {
            AlertLevel::Caution
        } else if percent_target >= NOTE_PERCENT {
            AlertLevel::Note
        } else {
            AlertLevel::Clear
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "🚨",
            AlertLevel::Warning | AlertLevel::Caution => "⚠️",
            AlertLevel::Note => "📘",
            AlertLevel::Clear => "✅",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "critical: over 100%",
            AlertLevel::Warning => "warning: over 90%",
            AlertLevel::Caution => "caution: over 80%",
            AlertLevel::Note => "note: over 50%",
            AlertLevel::Clear => "no issue",
        }
    }

    pub fn annotation(&self) -> String {
        format!("{} {}", self.marker(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_of_zero_denominator_is_zero() {
        for x in [0, 1, 450, 600, u32::MAX] {
            assert_eq!(percentage(x, 0), 0);
        }
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(percentage(450, 600), 75);
        assert_eq!(percentage(600, 600), 100);
        assert_eq!(percentage(650, 600), 108);
        assert_eq!(percentage(650, 500), 130);
        assert_eq!(percentage(2, 3), 67);
    }

    #[test]
    fn percentage_ties_round_to_even() {
        // 12.5 and 37.5
        assert_eq!(percentage(1, 8), 12);
        assert_eq!(percentage(3, 8), 38);
    }

    #[test]
    fn format_minutes_pads_remainder() {
        assert_eq!(format_minutes(0), "0:00");
        assert_eq!(format_minutes(65), "1:05");
        assert_eq!(format_minutes(600), "10:00");
        assert_eq!(format_minutes(59), "0:59");
        assert_eq!(format_minutes(1501), "25:01");
        assert_eq!(format_minutes_with_raw(50), "0:50 (50 min)");
    }

    #[test]
    fn alert_level_uses_first_matching_threshold() {
        assert_eq!(AlertLevel::from_percent(150), AlertLevel::Critical);
        assert_eq!(AlertLevel::from_percent(100), AlertLevel::Critical);
        assert_eq!(AlertLevel::from_percent(99), AlertLevel::Warning);
        assert_eq!(AlertLevel::from_percent(90), AlertLevel::Warning);
        assert_eq!(AlertLevel::from_percent(89), AlertLevel::Caution);
        assert_eq!(AlertLevel::from_percent(80), AlertLevel::Caution);
        assert_eq!(AlertLevel::from_percent(79), AlertLevel::Note);
        assert_eq!(AlertLevel::from_percent(50), AlertLevel::Note);
        assert_eq!(AlertLevel::from_percent(49), AlertLevel::Clear);
        assert_eq!(AlertLevel::from_percent(0), AlertLevel::Clear);
    }

    #[test]
    fn annotation_combines_marker_and_description() {
        assert_eq!(AlertLevel::Critical.annotation(), "🚨 critical: over 100%");
        assert_eq!(AlertLevel::Clear.annotation(), "✅ no issue");
    }
}
