//! Built-in US holiday reminders.

use chrono::NaiveDate;

use super::{Task, TaskCategory};
use crate::calendar::Weekday;
use crate::error::RuleRangeError;
use crate::recurrence::RecurrenceRule;

const ADVANCE_DAYS: u32 = 14;
const EXPIRE_DAYS: u32 = 3;

/// Unsaved holiday tasks, starting 1900-01-01.
pub fn presets() -> Result<Vec<Task>, RuleRangeError> {
    use Weekday::*;

    let presets = [
        ("New Year's Day", RecurrenceRule::yearly(1, 1)?, ADVANCE_DAYS),
        ("Martin Luther King Jr. Day", RecurrenceRule::nth_weekday(1, 3, Monday)?, ADVANCE_DAYS),
        ("Presidents' Day", RecurrenceRule::nth_weekday(2, 3, Monday)?, ADVANCE_DAYS),
        ("Mother's Day", RecurrenceRule::nth_weekday(5, 2, Sunday)?, ADVANCE_DAYS),
        ("Father's Day", RecurrenceRule::nth_weekday(6, 3, Sunday)?, ADVANCE_DAYS),
        ("Labor Day", RecurrenceRule::nth_weekday(9, 1, Monday)?, ADVANCE_DAYS),
        ("Thanksgiving", RecurrenceRule::nth_weekday(11, 4, Thursday)?, ADVANCE_DAYS),
        ("Christmas", RecurrenceRule::yearly(12, 25)?, 30),
    ];

    let start = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);
    Ok(presets
        .into_iter()
        .map(|(description, rule, advance)| Task {
            id: None,
            description: description.to_string(),
            note: String::new(),
            category: TaskCategory::Holiday,
            rule,
            start_date: start,
            last_completed: None,
            advance_display_days: advance,
            expire_display_days: EXPIRE_DAYS,
        })
        .collect())
}
