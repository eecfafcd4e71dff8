// src/holidays.rs
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

// --- Japanese Public Holidays ---

/// Japanese national holidays computed by rule, plus any extra company days off.
///
/// Each rule applies from the year it came into force. Equinox dates use the
/// usual approximation, valid for 1980-2099.
#[derive(Debug, Clone, Default)]
pub struct JapaneseHolidayCalendar {
    extra_holidays: HashSet<NaiveDate>,
}

impl JapaneseHolidayCalendar {
    pub fn new(extra_holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            extra_holidays: extra_holidays.into_iter().collect(),
        }
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&'static str> {
        if let Some(name) = national_holiday(date) {
            return Some(name);
        }
        if is_substitute_holiday(date) {
            return Some("Substitute Holiday");
        }
        if is_citizens_holiday(date) {
            return Some("Citizens' Holiday");
        }
        if self.extra_holidays.contains(&date) {
            return Some("Company Holiday");
        }
        None
    }
}

impl HolidayCalendar for JapaneseHolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
}

fn national_holiday(date: NaiveDate) -> Option<&'static str> {
    let year = date.year();
    let name = match (date.month(), date.day()) {
        (1, 1) => "New Year's Day",
        (2, 11) => "National Foundation Day",
        (2, 23) if year >= 2020 => "Emperor's Birthday",
        (2, 24) if year == 1989 => "State Funeral of Emperor Showa",
        (4, 29) if year >= 2007 => "Showa Day",
        (4, 29) if year >= 1989 => "Greenery Day",
        (4, 29) => "Emperor's Birthday",
        (4, 30) if year == 2019 => "National Holiday",
        (5, 1) if year == 2019 => "Enthronement Day",
        (5, 3) => "Constitution Memorial Day",
        (5, 4) if year >= 2007 => "Greenery Day",
        (5, 5) => "Children's Day",
        (6, 9) if year == 1993 => "Wedding of Crown Prince Naruhito",
        (10, 22) if year == 2019 => "Enthronement Ceremony Day",
        (11, 3) => "Culture Day",
        (11, 12) if year == 1990 => "Enthronement Ceremony Day",
        (11, 23) => "Labor Thanksgiving Day",
        (12, 23) if (1989..=2018).contains(&year) => "Emperor's Birthday",
        _ => return moving_holiday(date),
    };
    Some(name)
}

fn moving_holiday(date: NaiveDate) -> Option<&'static str> {
    let year = date.year();
    let candidates = [
        (coming_of_age_day(year), "Coming of Age Day"),
        (equinox(year, 3, 20.8431), "Vernal Equinox Day"),
        (marine_day(year), "Marine Day"),
        (mountain_day(year), "Mountain Day"),
        (respect_for_the_aged_day(year), "Respect for the Aged Day"),
        (equinox(year, 9, 23.2488), "Autumnal Equinox Day"),
        (sports_day(year), "Sports Day"),
    ];
    candidates
        .into_iter()
        .find(|(day, _)| *day == Some(date))
        .map(|(_, name)| name)
}

// A holiday falling on Sunday moves to the next day that is not itself a holiday.
// Before 2007 it only ever moved to the Monday.
fn is_substitute_holiday(date: NaiveDate) -> bool {
    if national_holiday(date).is_some() {
        return false;
    }
    if date.year() < 2007 {
        return date
            .pred_opt()
            .filter(|d| d.weekday() == Weekday::Sun && national_holiday(*d).is_some())
            .is_some();
    }
    let mut day = date.pred_opt();
    while let Some(d) = day {
        if national_holiday(d).is_none() {
            return false;
        }
        if d.weekday() == Weekday::Sun {
            return true;
        }
        day = d.pred_opt();
    }
    false
}

// An ordinary day sandwiched between two national holidays, from 1988.
fn is_citizens_holiday(date: NaiveDate) -> bool {
    if date.year() < 1988 || date.weekday() == Weekday::Sun || national_holiday(date).is_some() {
        return false;
    }
    match (date.pred_opt(), date.succ_opt()) {
        (Some(before), Some(after)) => {
            national_holiday(before).is_some() && national_holiday(after).is_some()
        }
        _ => false,
    }
}

fn nth_monday(year: i32, month: u32, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Mon, n)
}

fn equinox(year: i32, month: u32, base: f64) -> Option<NaiveDate> {
    let offset = f64::from(year - 1980);
    let day = (base + 0.242194 * offset - (offset / 4.0).floor()).floor();
    NaiveDate::from_ymd_opt(year, month, day as u32)
}

fn coming_of_age_day(year: i32) -> Option<NaiveDate> {
    if year >= 2000 {
        nth_monday(year, 1, 2)
    } else {
        NaiveDate::from_ymd_opt(year, 1, 15)
    }
}

fn marine_day(year: i32) -> Option<NaiveDate> {
    match year {
        y if y < 1996 => None,
        2020 => NaiveDate::from_ymd_opt(2020, 7, 23),
        2021 => NaiveDate::from_ymd_opt(2021, 7, 22),
        y if y >= 2003 => nth_monday(y, 7, 3),
        y => NaiveDate::from_ymd_opt(y, 7, 20),
    }
}

fn mountain_day(year: i32) -> Option<NaiveDate> {
    match year {
        2020 => NaiveDate::from_ymd_opt(2020, 8, 10),
        2021 => NaiveDate::from_ymd_opt(2021, 8, 8),
        y if y >= 2016 => NaiveDate::from_ymd_opt(y, 8, 11),
        _ => None,
    }
}

fn respect_for_the_aged_day(year: i32) -> Option<NaiveDate> {
    if year >= 2003 {
        nth_monday(year, 9, 3)
    } else {
        NaiveDate::from_ymd_opt(year, 9, 15)
    }
}

fn sports_day(year: i32) -> Option<NaiveDate> {
    match year {
        2020 => NaiveDate::from_ymd_opt(2020, 7, 24),
        2021 => NaiveDate::from_ymd_opt(2021, 7, 23),
        y if y >= 2000 => nth_monday(y, 10, 2),
        y => NaiveDate::from_ymd_opt(y, 10, 10),
    }
}
