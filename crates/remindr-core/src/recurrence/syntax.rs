//! Compact text form of a rule, used on the command line.
//!
//! ```text
//! daily
//! weekly:thu
//! monthly:7
//! yearly:12-25
//! every:10            every 10 days from the start date
//! nth:4:thu:11        4th Thursday of November
//! once:2024-05-01
//! ```

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::RecurrenceRule;
use crate::calendar::{ParseWeekdayError, Weekday};
use crate::error::RuleRangeError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRuleError {
    #[error("unknown rule '{0}' (expected daily, weekly, monthly, yearly, every, nth or once)")]
    UnknownKind(String),

    #[error("'{rule}' expects {expected}")]
    WrongArguments {
        rule: &'static str,
        expected: &'static str,
    },

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("'{0}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error(transparent)]
    Weekday(#[from] ParseWeekdayError),

    #[error(transparent)]
    Range(#[from] RuleRangeError),
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceRule::Daily => write!(f, "daily"),
            RecurrenceRule::Weekly { weekday } => {
                write!(f, "weekly:{}", weekday.short_name().to_ascii_lowercase())
            }
            RecurrenceRule::Monthly { monthday } => write!(f, "monthly:{monthday}"),
            RecurrenceRule::Yearly { month, day } => write!(f, "yearly:{month}-{day}"),
            RecurrenceRule::XDays { interval } => write!(f, "every:{interval}"),
            RecurrenceRule::XMonthYWeekZWeekday {
                month,
                week,
                weekday,
            } => write!(
                f,
                "nth:{week}:{}:{month}",
                weekday.short_name().to_ascii_lowercase()
            ),
            RecurrenceRule::Once { date } => write!(f, "once:{}", date.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for RecurrenceRule {
    type Err = ParseRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let kind = parts.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        match (kind.as_str(), args.as_slice()) {
            ("daily", []) => Ok(RecurrenceRule::Daily),
            ("weekly", [weekday]) => Ok(RecurrenceRule::weekly(weekday.parse()?)),
            ("monthly", [day]) => Ok(RecurrenceRule::monthly(number(day)?)?),
            ("yearly", [month_day]) => {
                let (month, day) =
                    month_day
                        .split_once('-')
                        .ok_or(ParseRuleError::WrongArguments {
                            rule: "yearly",
                            expected: "MONTH-DAY",
                        })?;
                Ok(RecurrenceRule::yearly(number(month)?, number(day)?)?)
            }
            ("every", [interval]) => Ok(RecurrenceRule::x_days(number(interval)?)?),
            ("nth", [week, weekday, month]) => Ok(RecurrenceRule::nth_weekday(
                number(month)?,
                number(week)?,
                weekday.parse::<Weekday>()?,
            )?),
            ("once", [date]) => NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .map(RecurrenceRule::once)
                .map_err(|_| ParseRuleError::InvalidDate(date.to_string())),
            ("daily", _) => Err(wrong("daily", "no arguments")),
            ("weekly", _) => Err(wrong("weekly", "WEEKDAY")),
            ("monthly", _) => Err(wrong("monthly", "DAY")),
            ("yearly", _) => Err(wrong("yearly", "MONTH-DAY")),
            ("every", _) => Err(wrong("every", "DAYS")),
            ("nth", _) => Err(wrong("nth", "WEEK:WEEKDAY:MONTH")),
            ("once", _) => Err(wrong("once", "YYYY-MM-DD")),
            _ => Err(ParseRuleError::UnknownKind(s.to_string())),
        }
    }
}

fn wrong(rule: &'static str, expected: &'static str) -> ParseRuleError {
    ParseRuleError::WrongArguments { rule, expected }
}

fn number(value: &str) -> Result<i64, ParseRuleError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseRuleError::InvalidNumber(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_variant() {
        assert_eq!("daily".parse::<RecurrenceRule>().unwrap(), RecurrenceRule::Daily);
        assert_eq!(
            "weekly:Monday".parse::<RecurrenceRule>().unwrap(),
            RecurrenceRule::weekly(Weekday::Monday)
        );
        assert_eq!(
            "monthly:7".parse::<RecurrenceRule>().unwrap(),
            RecurrenceRule::monthly(7).unwrap()
        );
        assert_eq!(
            "yearly:12-25".parse::<RecurrenceRule>().unwrap(),
            RecurrenceRule::yearly(12, 25).unwrap()
        );
        assert_eq!(
            "every:10".parse::<RecurrenceRule>().unwrap(),
            RecurrenceRule::x_days(10).unwrap()
        );
        assert_eq!(
            "nth:4:thu:11".parse::<RecurrenceRule>().unwrap(),
            RecurrenceRule::nth_weekday(11, 4, Weekday::Thursday).unwrap()
        );
        assert_eq!(
            "once:2024-05-01".parse::<RecurrenceRule>().unwrap(),
            RecurrenceRule::once(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        );
    }

    #[test]
    fn display_parses_back() {
        let rules = [
            RecurrenceRule::Daily,
            RecurrenceRule::weekly(Weekday::Sunday),
            RecurrenceRule::nth_weekday(5, 2, Weekday::Sunday).unwrap(),
            RecurrenceRule::once(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
        ];
        for rule in rules {
            assert_eq!(rule.to_string().parse::<RecurrenceRule>().unwrap(), rule);
        }
        assert_eq!(
            RecurrenceRule::nth_weekday(11, 4, Weekday::Thursday)
                .unwrap()
                .to_string(),
            "nth:4:thu:11"
        );
    }

    #[test]
    fn reports_range_errors_with_field() {
        let err = "monthly:30".parse::<RecurrenceRule>().unwrap_err();
        match err {
            ParseRuleError::Range(range) => {
                assert_eq!(range.field, "monthday");
                assert_eq!((range.min, range.max), (1, 28));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            "fortnightly".parse::<RecurrenceRule>(),
            Err(ParseRuleError::UnknownKind(_))
        ));
        assert!(matches!(
            "weekly".parse::<RecurrenceRule>(),
            Err(ParseRuleError::WrongArguments { rule: "weekly", .. })
        ));
        assert!(matches!(
            "monthly:x".parse::<RecurrenceRule>(),
            Err(ParseRuleError::InvalidNumber(_))
        ));
        assert!(matches!(
            "once:2024-13-01".parse::<RecurrenceRule>(),
            Err(ParseRuleError::InvalidDate(_))
        ));
        assert!(matches!(
            "weekly:funday".parse::<RecurrenceRule>(),
            Err(ParseRuleError::Weekday(_))
        ));
    }
}
