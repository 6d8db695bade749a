//! Completion date parsing.
//!
//! Accepted inputs:
//! - ISO `YYYY-MM-DD` (an RFC 3339 timestamp is also accepted and reduced to its UTC date)
//! - day-first `DD/MM/YYYY` or `DD-MM-YYYY`
//!
//! Day-first values are range checked (month 1-12, day 1-31) and then resolved
//! the way a UTC calendar constructor does, so `31/02/2024` rolls over to
//! 2024-03-02. Anything else is "no date", never an error.

use chrono::{DateTime, Days, NaiveDate, Utc};
use regex::Regex;
use std::sync::LazyLock;

static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").expect("day-first date pattern")
});

pub fn parse_completion_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    parse_day_first(value)
}

fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let caps = DAY_FIRST.captures(value)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_days(Days::new(u64::from(day - 1)))
}
