//! Calendar date arithmetic.
//!
//! Pure functions over [`NaiveDate`]. Day, month, and year offsets saturate
//! at chrono's representable range instead of panicking, so they are total.
//! Month and year offsets clamp the day to the end of the target month.

mod weekday;

pub use weekday::{ParseWeekdayError, Weekday};

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::CalendarError;

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    add_months(date, years.saturating_mul(12))
}

pub fn day_of_week(date: NaiveDate) -> Weekday {
    date.weekday().into()
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth(month));
    }
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    };
    Ok(days)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// The `n`-th `weekday` in `month` of `year`, with `n` in `1..=5`.
///
/// Fails when the month has no such occurrence (a fifth Monday that doesn't
/// exist is an error, never the first Monday of the following month).
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    n: u8,
) -> Result<NaiveDate, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth(month));
    }
    if !(1..=5).contains(&n) {
        return Err(CalendarError::InvalidOccurrence(n));
    }
    NaiveDate::from_weekday_of_month_opt(year, month, weekday.into(), n).ok_or(
        CalendarError::NoSuchWeekday {
            year,
            month,
            weekday,
            n,
        },
    )
}
