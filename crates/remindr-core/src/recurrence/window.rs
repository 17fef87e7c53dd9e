//! Display-window search.
//!
//! Given a rule and a reference date, find the occurrence whose display
//! window is the relevant one: the earliest occurrence (on or after the
//! latest one at or before the reference) whose window has not yet expired,
//! which the task could have reached since its start date, and which has not
//! already been completed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Occurrences, RecurrenceRule};
use crate::calendar;
use crate::error::SearchError;

/// Upper bound on how many occurrences the bracket search steps through.
pub const MAX_SEARCH_STEPS: usize = 10_000;

/// Every input the window search depends on, apart from the Daily clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowQuery {
    pub rule: RecurrenceRule,
    pub start_date: NaiveDate,
    pub last_completed: Option<NaiveDate>,
    pub advance_days: u32,
    pub expire_days: u32,
    pub reference: NaiveDate,
}

impl WindowQuery {
    /// The reference date after clamping to the start date and then to the
    /// last completion.
    pub fn clamped_reference(&self) -> NaiveDate {
        let reference = self.reference.max(self.start_date);
        match self.last_completed {
            Some(completed) => reference.max(completed),
            None => reference,
        }
    }

    fn accepts(&self, reference: NaiveDate, window: &DisplayWindow) -> bool {
        reference <= window.display_end
            && self.start_date <= window.display_end
            && self
                .last_completed
                .map_or(true, |completed| completed < window.display_start)
    }
}

/// An occurrence and the inclusive range of dates it is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayWindow {
    pub occurrence: NaiveDate,
    pub display_start: NaiveDate,
    pub display_end: NaiveDate,
}

impl DisplayWindow {
    pub fn around(occurrence: NaiveDate, advance_days: u32, expire_days: u32) -> Self {
        Self {
            occurrence,
            display_start: calendar::add_days(occurrence, -i64::from(advance_days)),
            display_end: calendar::add_days(occurrence, i64::from(expire_days)),
        }
    }

    /// Both ends inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.display_start <= date && date <= self.display_end
    }

    /// Days from `reference` to the occurrence; negative once it is past.
    pub fn days_until(&self, reference: NaiveDate) -> i64 {
        calendar::days_between(reference, self.occurrence)
    }
}

/// Compute the display window for `query`.
///
/// `today` is only read by the Daily rule: a completion recorded today or
/// later moves the task to tomorrow.
pub fn compute_display_window(
    query: &WindowQuery,
    today: NaiveDate,
) -> Result<DisplayWindow, SearchError> {
    let reference = query.clamped_reference();
    match query.rule {
        RecurrenceRule::Daily => {
            let done_today = query
                .last_completed
                .is_some_and(|completed| completed >= today);
            if done_today {
                let tomorrow = calendar::add_days(reference, 1);
                Ok(DisplayWindow::around(tomorrow, 0, query.expire_days))
            } else {
                Ok(DisplayWindow::around(
                    reference,
                    query.advance_days,
                    query.expire_days,
                ))
            }
        }
        RecurrenceRule::Once { date } => Ok(DisplayWindow::around(
            date,
            query.advance_days,
            query.expire_days,
        )),
        rule => bracket_search(&rule.anchored(query.start_date), query),
    }
}

/// Anchor on the latest occurrence at or before the clamped reference and
/// step forward until an occurrence's window is accepted.
///
/// Only the stepping functions of `occurrences` are used; `query.rule` is
/// not consulted.
pub fn bracket_search<O>(occurrences: &O, query: &WindowQuery) -> Result<DisplayWindow, SearchError>
where
    O: Occurrences + ?Sized,
{
    let reference = query.clamped_reference();
    let mut prior = occurrences.previous_or_same(reference)?;
    if prior > reference {
        return Err(SearchError::AnchorAfterReference {
            anchor: prior,
            reference,
        });
    }

    // Occurrences up to completed + advance start their window on or before
    // the completion and are always rejected.
    if let Some(completed) = query.last_completed {
        let floor = calendar::add_days(completed, i64::from(query.advance_days));
        if prior <= floor {
            let next = occurrences.next_after(floor)?;
            if next <= floor {
                return Err(SearchError::NoProgress { prior: floor, next });
            }
            prior = next;
        }
    }

    for step in 0..MAX_SEARCH_STEPS {
        let window = DisplayWindow::around(prior, query.advance_days, query.expire_days);
        if query.accepts(reference, &window) {
            debug!(%reference, occurrence = %window.occurrence, steps = step, "window accepted");
            return Ok(window);
        }
        let next = occurrences.next_after(prior)?;
        if next <= prior {
            return Err(SearchError::NoProgress { prior, next });
        }
        prior = next;
    }

    Err(SearchError::StepLimitExceeded {
        steps: MAX_SEARCH_STEPS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Weekday;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn query(rule: RecurrenceRule, advance: u32, expire: u32, reference: NaiveDate) -> WindowQuery {
        WindowQuery {
            rule,
            start_date: ymd(1900, 1, 1),
            last_completed: None,
            advance_days: advance,
            expire_days: expire,
            reference,
        }
    }

    fn window(occurrence: NaiveDate, start: NaiveDate, end: NaiveDate) -> DisplayWindow {
        DisplayWindow {
            occurrence,
            display_start: start,
            display_end: end,
        }
    }

    #[test]
    fn daily_window_surrounds_reference() {
        let q = query(RecurrenceRule::Daily, 1, 1, ymd(2020, 1, 1));
        let w = compute_display_window(&q, ymd(2020, 1, 1)).unwrap();
        assert_eq!(w, window(ymd(2020, 1, 1), ymd(2019, 12, 31), ymd(2020, 1, 2)));
    }

    #[test]
    fn daily_completed_today_moves_to_tomorrow() {
        let today = ymd(2020, 1, 1);
        let q = WindowQuery {
            last_completed: Some(today),
            ..query(RecurrenceRule::Daily, 1, 1, today)
        };
        let w = compute_display_window(&q, today).unwrap();
        assert_eq!(w, window(ymd(2020, 1, 2), ymd(2020, 1, 2), ymd(2020, 1, 3)));
        assert!(!w.contains(today));
    }

    #[test]
    fn daily_completed_yesterday_shows_today() {
        let today = ymd(2020, 1, 1);
        let q = WindowQuery {
            last_completed: Some(ymd(2019, 12, 31)),
            ..query(RecurrenceRule::Daily, 0, 0, today)
        };
        let w = compute_display_window(&q, today).unwrap();
        assert_eq!(w.occurrence, today);
    }

    #[test]
    fn monthly_finds_upcoming_day() {
        let q = query(RecurrenceRule::monthly(7).unwrap(), 2, 3, ymd(2020, 1, 1));
        let w = compute_display_window(&q, ymd(2020, 1, 1)).unwrap();
        assert_eq!(w, window(ymd(2020, 1, 7), ymd(2020, 1, 5), ymd(2020, 1, 10)));
    }

    #[test]
    fn weekly_clamps_reference_to_start() {
        let q = WindowQuery {
            start_date: ymd(2020, 1, 1),
            ..query(RecurrenceRule::weekly(Weekday::Monday), 1, 1, ymd(2019, 12, 1))
        };
        let w = compute_display_window(&q, ymd(2019, 12, 1)).unwrap();
        assert_eq!(w, window(ymd(2020, 1, 6), ymd(2020, 1, 5), ymd(2020, 1, 7)));
    }

    #[test]
    fn yearly_rolls_into_next_year() {
        let q = query(RecurrenceRule::yearly(1, 6).unwrap(), 2, 3, ymd(2019, 12, 1));
        let w = compute_display_window(&q, ymd(2019, 12, 1)).unwrap();
        assert_eq!(w, window(ymd(2020, 1, 6), ymd(2020, 1, 4), ymd(2020, 1, 9)));
    }

    #[test]
    fn thanksgiving_before_and_after() {
        let rule = RecurrenceRule::nth_weekday(11, 4, Weekday::Thursday).unwrap();
        let before = query(rule, 2, 3, ymd(2020, 6, 1));
        assert_eq!(
            compute_display_window(&before, ymd(2020, 6, 1)).unwrap().occurrence,
            ymd(2020, 11, 26)
        );
        let after = query(rule, 2, 3, ymd(2020, 12, 15));
        assert_eq!(
            compute_display_window(&after, ymd(2020, 12, 15)).unwrap().occurrence,
            ymd(2021, 11, 25)
        );
    }

    #[test]
    fn completed_weekly_occurrence_is_suppressed() {
        // 2020-01-06 is a Monday; the task was done that day.
        let q = WindowQuery {
            last_completed: Some(ymd(2020, 1, 6)),
            ..query(RecurrenceRule::weekly(Weekday::Monday), 0, 6, ymd(2020, 1, 8))
        };
        let w = compute_display_window(&q, ymd(2020, 1, 8)).unwrap();
        assert_eq!(w, window(ymd(2020, 1, 13), ymd(2020, 1, 13), ymd(2020, 1, 19)));
    }

    #[test]
    fn completion_before_window_does_not_suppress() {
        let q = WindowQuery {
            last_completed: Some(ymd(2020, 1, 4)),
            ..query(RecurrenceRule::monthly(7).unwrap(), 2, 3, ymd(2020, 1, 4))
        };
        assert_eq!(
            compute_display_window(&q, ymd(2020, 1, 4)).unwrap().occurrence,
            ymd(2020, 1, 7)
        );
        let q = WindowQuery {
            last_completed: Some(ymd(2020, 1, 5)),
            ..q
        };
        assert_eq!(
            compute_display_window(&q, ymd(2020, 1, 5)).unwrap().occurrence,
            ymd(2020, 2, 7)
        );
    }

    #[test]
    fn huge_advance_after_completion_skips_ahead() {
        let q = WindowQuery {
            last_completed: Some(ymd(2020, 1, 6)),
            ..query(RecurrenceRule::weekly(Weekday::Monday), 80_000, 6, ymd(2020, 1, 8))
        };
        let w = compute_display_window(&q, ymd(2020, 1, 8)).unwrap();
        // First Monday whose window opens after the completion.
        assert_eq!(w, window(ymd(2239, 1, 21), ymd(2020, 1, 9), ymd(2239, 1, 27)));
        assert!(w.contains(ymd(2020, 1, 9)));
        assert!(!w.contains(ymd(2020, 1, 8)));
    }

    #[test]
    fn x_days_counts_from_start() {
        let q = WindowQuery {
            start_date: ymd(2020, 1, 1),
            ..query(RecurrenceRule::x_days(10).unwrap(), 0, 1, ymd(2020, 1, 15))
        };
        let w = compute_display_window(&q, ymd(2020, 1, 15)).unwrap();
        assert_eq!(w.occurrence, ymd(2020, 1, 21));
    }

    #[test]
    fn once_returns_its_date() {
        let date = ymd(2020, 5, 1);
        let q = query(RecurrenceRule::once(date), 14, 7, ymd(2021, 1, 1));
        let w = compute_display_window(&q, ymd(2021, 1, 1)).unwrap();
        assert_eq!(w, window(date, ymd(2020, 4, 17), ymd(2020, 5, 8)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = window(ymd(2020, 1, 7), ymd(2020, 1, 5), ymd(2020, 1, 10));
        assert!(w.contains(ymd(2020, 1, 5)));
        assert!(w.contains(ymd(2020, 1, 10)));
        assert!(!w.contains(ymd(2020, 1, 4)));
        assert!(!w.contains(ymd(2020, 1, 11)));
        assert_eq!(w.days_until(ymd(2020, 1, 5)), 2);
        assert_eq!(w.days_until(ymd(2020, 1, 10)), -3);
    }

    struct Stuck;

    impl Occurrences for Stuck {
        fn previous_or_same(&self, date: NaiveDate) -> Result<NaiveDate, SearchError> {
            Ok(calendar::add_days(date, -30))
        }

        fn next_after(&self, date: NaiveDate) -> Result<NaiveDate, SearchError> {
            Ok(date)
        }
    }

    struct AheadOfReference;

    impl Occurrences for AheadOfReference {
        fn previous_or_same(&self, date: NaiveDate) -> Result<NaiveDate, SearchError> {
            Ok(calendar::add_days(date, 1))
        }

        fn next_after(&self, date: NaiveDate) -> Result<NaiveDate, SearchError> {
            Ok(calendar::add_days(date, 1))
        }
    }

    struct FarBehind;

    impl Occurrences for FarBehind {
        fn previous_or_same(&self, date: NaiveDate) -> Result<NaiveDate, SearchError> {
            Ok(calendar::add_days(date, -20_000))
        }

        fn next_after(&self, date: NaiveDate) -> Result<NaiveDate, SearchError> {
            Ok(calendar::add_days(date, 1))
        }
    }

    #[test]
    fn stepper_without_progress_is_reported() {
        let q = query(RecurrenceRule::Daily, 0, 0, ymd(2020, 1, 1));
        assert_eq!(
            bracket_search(&Stuck, &q),
            Err(SearchError::NoProgress {
                prior: ymd(2019, 12, 2),
                next: ymd(2019, 12, 2),
            })
        );
    }

    #[test]
    fn stuck_stepper_is_reported_when_skipping_completed() {
        let q = WindowQuery {
            last_completed: Some(ymd(2020, 1, 1)),
            ..query(RecurrenceRule::Daily, 0, 0, ymd(2020, 1, 1))
        };
        assert_eq!(
            bracket_search(&Stuck, &q),
            Err(SearchError::NoProgress {
                prior: ymd(2020, 1, 1),
                next: ymd(2020, 1, 1),
            })
        );
    }

    #[test]
    fn anchor_after_reference_is_reported() {
        let q = query(RecurrenceRule::Daily, 0, 0, ymd(2020, 1, 1));
        assert!(matches!(
            bracket_search(&AheadOfReference, &q),
            Err(SearchError::AnchorAfterReference { .. })
        ));
    }

    #[test]
    fn runaway_search_hits_step_limit() {
        let q = query(RecurrenceRule::Daily, 0, 0, ymd(2020, 1, 1));
        assert_eq!(
            bracket_search(&FarBehind, &q),
            Err(SearchError::StepLimitExceeded {
                steps: MAX_SEARCH_STEPS
            })
        );
    }
}
