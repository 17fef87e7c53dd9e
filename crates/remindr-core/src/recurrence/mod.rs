//! Recurrence rules and the display-window engine built on them.
//!
//! A [`RecurrenceRule`] is one of seven fixed patterns. Every pattern except
//! `Daily` and `Once` is searched through the [`Occurrences`] trait, whose two
//! stepping functions are the only rule-specific logic; the bracket search in
//! [`window`] is written once against that trait.

pub mod cache;
pub mod clock;
pub mod engine;
mod fields;
mod syntax;
pub mod window;

pub use cache::{CacheStats, OccurrenceCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::WindowEngine;
pub use fields::{DayOfMonth, Interval, Month, MonthDay, WeekOfMonth};
pub use syntax::ParseRuleError;
pub use window::{bracket_search, compute_display_window, DisplayWindow, WindowQuery};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::{self, Weekday};
use crate::error::{RuleRangeError, SearchError};

/// How far the nth-weekday rule scans for a year that has the occurrence.
/// A fifth weekday of February needs Feb 29 on that weekday; across a
/// skipped century leap year (2100) the gap reaches 40 years, e.g.
/// 2072-02-29 to 2112-02-29 for Monday.
const MAX_YEAR_SCAN: i32 = 40;

/// A recurrence pattern. The set of variants is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RecurrenceRule {
    #[default]
    Daily,
    Weekly {
        weekday: Weekday,
    },
    Monthly {
        monthday: MonthDay,
    },
    Yearly {
        month: Month,
        day: DayOfMonth,
    },
    XDays {
        interval: Interval,
    },
    /// The `week`-th `weekday` of `month`, once a year.
    XMonthYWeekZWeekday {
        month: Month,
        week: WeekOfMonth,
        weekday: Weekday,
    },
    Once {
        date: NaiveDate,
    },
}

impl RecurrenceRule {
    pub fn weekly(weekday: Weekday) -> Self {
        RecurrenceRule::Weekly { weekday }
    }

    pub fn monthly(monthday: i64) -> Result<Self, RuleRangeError> {
        Ok(RecurrenceRule::Monthly {
            monthday: MonthDay::new(monthday)?,
        })
    }

    pub fn yearly(month: i64, day: i64) -> Result<Self, RuleRangeError> {
        Ok(RecurrenceRule::Yearly {
            month: Month::new(month)?,
            day: DayOfMonth::new(day)?,
        })
    }

    pub fn x_days(interval: i64) -> Result<Self, RuleRangeError> {
        Ok(RecurrenceRule::XDays {
            interval: Interval::new(interval)?,
        })
    }

    pub fn nth_weekday(month: i64, week: i64, weekday: Weekday) -> Result<Self, RuleRangeError> {
        Ok(RecurrenceRule::XMonthYWeekZWeekday {
            month: Month::new(month)?,
            week: WeekOfMonth::new(week)?,
            weekday,
        })
    }

    pub fn once(date: NaiveDate) -> Self {
        RecurrenceRule::Once { date }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            RecurrenceRule::Daily => RuleKind::Daily,
            RecurrenceRule::Weekly { .. } => RuleKind::Weekly,
            RecurrenceRule::Monthly { .. } => RuleKind::Monthly,
            RecurrenceRule::Yearly { .. } => RuleKind::Yearly,
            RecurrenceRule::XDays { .. } => RuleKind::XDays,
            RecurrenceRule::XMonthYWeekZWeekday { .. } => RuleKind::XMonthYWeekZWeekday,
            RecurrenceRule::Once { .. } => RuleKind::Once,
        }
    }

    /// Month of a Yearly or nth-weekday rule.
    pub fn month(&self) -> Option<Month> {
        match self {
            RecurrenceRule::Yearly { month, .. }
            | RecurrenceRule::XMonthYWeekZWeekday { month, .. } => Some(*month),
            _ => None,
        }
    }

    pub fn monthday(&self) -> Option<MonthDay> {
        match self {
            RecurrenceRule::Monthly { monthday } => Some(*monthday),
            _ => None,
        }
    }

    /// Day of month of a Yearly rule.
    pub fn day(&self) -> Option<DayOfMonth> {
        match self {
            RecurrenceRule::Yearly { day, .. } => Some(*day),
            _ => None,
        }
    }

    pub fn week(&self) -> Option<WeekOfMonth> {
        match self {
            RecurrenceRule::XMonthYWeekZWeekday { week, .. } => Some(*week),
            _ => None,
        }
    }

    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            RecurrenceRule::Weekly { weekday }
            | RecurrenceRule::XMonthYWeekZWeekday { weekday, .. } => Some(*weekday),
            _ => None,
        }
    }

    pub fn interval(&self) -> Option<Interval> {
        match self {
            RecurrenceRule::XDays { interval } => Some(*interval),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            RecurrenceRule::Once { date } => Some(*date),
            _ => None,
        }
    }

    /// Bind the rule to a start date so it can be stepped.
    pub fn anchored(self, start: NaiveDate) -> AnchoredRule {
        AnchoredRule { rule: self, start }
    }
}

/// Variant name of a [`RecurrenceRule`], without its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    XDays,
    XMonthYWeekZWeekday,
    Once,
}

impl RuleKind {
    pub const ALL: [RuleKind; 7] = [
        RuleKind::Daily,
        RuleKind::Weekly,
        RuleKind::Monthly,
        RuleKind::Yearly,
        RuleKind::XDays,
        RuleKind::XMonthYWeekZWeekday,
        RuleKind::Once,
    ];

    /// Stored name of the variant.
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Daily => "Daily",
            RuleKind::Weekly => "Weekly",
            RuleKind::Monthly => "Monthly",
            RuleKind::Yearly => "Yearly",
            RuleKind::XDays => "XDays",
            RuleKind::XMonthYWeekZWeekday => "XMonthYWeekZWeekday",
            RuleKind::Once => "Once",
        }
    }

    /// Days before an occurrence a new task of this kind is shown, by default.
    pub fn default_advance_days(self) -> u32 {
        match self {
            RuleKind::Daily => 0,
            RuleKind::Weekly => 0,
            RuleKind::Monthly => 7,
            RuleKind::Yearly => 363,
            RuleKind::XDays => 0,
            RuleKind::XMonthYWeekZWeekday => 363,
            RuleKind::Once => 14,
        }
    }

    /// Days after an occurrence a new task of this kind stays visible, by default.
    pub fn default_expire_days(self) -> u32 {
        match self {
            RuleKind::Daily => 0,
            RuleKind::Weekly => 6,
            RuleKind::Monthly => 7,
            RuleKind::Yearly => 363,
            RuleKind::XDays => 1,
            RuleKind::XMonthYWeekZWeekday => 363,
            RuleKind::Once => 7,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKind {
    type Err = ParseRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRuleError::UnknownKind(s.to_string()))
    }
}

/// Stepping functions of a recurrence pattern.
///
/// `previous_or_same(d)` must return a date `<= d` and `next_after(d)` a date
/// `> d`; the window search checks both and reports a [`SearchError`] when an
/// implementation breaks them.
pub trait Occurrences {
    /// Latest occurrence on or before `date`.
    fn previous_or_same(&self, date: NaiveDate) -> Result<NaiveDate, SearchError>;

    /// Earliest occurrence strictly after `date`.
    fn next_after(&self, date: NaiveDate) -> Result<NaiveDate, SearchError>;
}

/// A rule together with the task start date it is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchoredRule {
    pub rule: RecurrenceRule,
    pub start: NaiveDate,
}

impl Occurrences for AnchoredRule {
    fn previous_or_same(&self, date: NaiveDate) -> Result<NaiveDate, SearchError> {
        match self.rule {
            RecurrenceRule::Daily => Ok(date),
            RecurrenceRule::Weekly { weekday } => {
                let current = calendar::day_of_week(date).iso_ordinal();
                let back = (current + 7 - weekday.iso_ordinal()) % 7;
                Ok(calendar::add_days(date, -i64::from(back)))
            }
            RecurrenceRule::Monthly { monthday } => {
                let current = monthday_in(date, monthday)?;
                if current <= date {
                    Ok(current)
                } else {
                    Ok(calendar::add_months(current, -1))
                }
            }
            RecurrenceRule::Yearly { month, day } => {
                let current = yearly_anchor(date.year(), month, day, date)?;
                if current <= date {
                    Ok(current)
                } else {
                    yearly_anchor(date.year() - 1, month, day, date)
                }
            }
            RecurrenceRule::XDays { interval } => {
                let step = i64::from(interval.get());
                let k = calendar::days_between(self.start, date).div_euclid(step);
                Ok(calendar::add_days(self.start, k * step))
            }
            RecurrenceRule::XMonthYWeekZWeekday {
                month,
                week,
                weekday,
            } => (0..=MAX_YEAR_SCAN)
                .filter_map(|back| nth_weekday_anchor(date.year() - back, month, week, weekday))
                .find(|candidate| *candidate <= date)
                .ok_or_else(|| SearchError::NoOccurrence {
                    rule: self.rule.to_string(),
                    near: date,
                }),
            RecurrenceRule::Once { date: once } => Ok(once),
        }
    }

    fn next_after(&self, date: NaiveDate) -> Result<NaiveDate, SearchError> {
        match self.rule {
            RecurrenceRule::Daily => Ok(calendar::add_days(date, 1)),
            RecurrenceRule::Weekly { weekday } => {
                let current = calendar::day_of_week(date).iso_ordinal();
                let ahead = match (weekday.iso_ordinal() + 7 - current) % 7 {
                    0 => 7,
                    n => n,
                };
                Ok(calendar::add_days(date, i64::from(ahead)))
            }
            RecurrenceRule::Monthly { monthday } => {
                let current = monthday_in(date, monthday)?;
                if current > date {
                    Ok(current)
                } else {
                    Ok(calendar::add_months(current, 1))
                }
            }
            RecurrenceRule::Yearly { month, day } => {
                let current = yearly_anchor(date.year(), month, day, date)?;
                if current > date {
                    Ok(current)
                } else {
                    yearly_anchor(date.year() + 1, month, day, date)
                }
            }
            RecurrenceRule::XDays { interval } => {
                let step = i64::from(interval.get());
                let k = calendar::days_between(self.start, date).div_euclid(step);
                Ok(calendar::add_days(self.start, (k + 1) * step))
            }
            RecurrenceRule::XMonthYWeekZWeekday {
                month,
                week,
                weekday,
            } => (0..=MAX_YEAR_SCAN)
                .filter_map(|ahead| nth_weekday_anchor(date.year() + ahead, month, week, weekday))
                .find(|candidate| *candidate > date)
                .ok_or_else(|| SearchError::NoOccurrence {
                    rule: self.rule.to_string(),
                    near: date,
                }),
            // Single occurrence: no stepping past it.
            RecurrenceRule::Once { date: once } => Ok(once),
        }
    }
}

fn monthday_in(date: NaiveDate, monthday: MonthDay) -> Result<NaiveDate, SearchError> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), u32::from(monthday.get()))
        .ok_or(SearchError::DateOutOfRange { near: date })
}

/// `month`/`day` in `year`, with the day clamped to the month's length.
fn yearly_anchor(
    year: i32,
    month: Month,
    day: DayOfMonth,
    near: NaiveDate,
) -> Result<NaiveDate, SearchError> {
    let month = u32::from(month.get());
    calendar::days_in_month(year, month)
        .ok()
        .and_then(|last| NaiveDate::from_ymd_opt(year, month, u32::from(day.get()).min(last)))
        .ok_or(SearchError::DateOutOfRange { near })
}

fn nth_weekday_anchor(
    year: i32,
    month: Month,
    week: WeekOfMonth,
    weekday: Weekday,
) -> Option<NaiveDate> {
    calendar::nth_weekday_of_month(year, u32::from(month.get()), weekday, week.get()).ok()
}
