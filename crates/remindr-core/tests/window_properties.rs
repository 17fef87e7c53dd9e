//! Property tests for rule stepping and the display-window search.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use remindr_core::{
    compute_display_window, Occurrences, RecurrenceRule, Weekday, WindowQuery,
};

fn date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2050, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn weekday() -> impl Strategy<Value = Weekday> {
    (1u32..=7).prop_map(|n| Weekday::from_iso_ordinal(n).unwrap())
}

/// Rules that go through the bracket search.
fn stepped_rule() -> impl Strategy<Value = RecurrenceRule> {
    prop_oneof![
        weekday().prop_map(RecurrenceRule::weekly),
        (1i64..=28).prop_map(|d| RecurrenceRule::monthly(d).unwrap()),
        (1i64..=12, 1i64..=31).prop_map(|(m, d)| RecurrenceRule::yearly(m, d).unwrap()),
        (1i64..=9999).prop_map(|n| RecurrenceRule::x_days(n).unwrap()),
        (1i64..=12, 1i64..=5, weekday())
            .prop_map(|(m, w, wd)| RecurrenceRule::nth_weekday(m, w, wd).unwrap()),
    ]
}

fn any_rule() -> impl Strategy<Value = RecurrenceRule> {
    prop_oneof![
        Just(RecurrenceRule::Daily),
        stepped_rule(),
        date().prop_map(RecurrenceRule::once),
    ]
}

fn query(rule: impl Strategy<Value = RecurrenceRule>) -> impl Strategy<Value = WindowQuery> {
    (
        rule,
        date(),
        proptest::option::of(date()),
        0u32..400,
        0u32..400,
        date(),
    )
        .prop_map(
            |(rule, start_date, last_completed, advance_days, expire_days, reference)| {
                WindowQuery {
                    rule,
                    start_date,
                    last_completed,
                    advance_days,
                    expire_days,
                    reference,
                }
            },
        )
}

proptest! {
    #[test]
    fn stepping_makes_progress(rule in stepped_rule(), start in date(), d in date()) {
        let anchored = rule.anchored(start);
        prop_assert!(anchored.previous_or_same(d).unwrap() <= d);
        prop_assert!(anchored.next_after(d).unwrap() > d);
    }

    #[test]
    fn daily_stepping_makes_progress(start in date(), d in date()) {
        let anchored = RecurrenceRule::Daily.anchored(start);
        prop_assert_eq!(anchored.previous_or_same(d).unwrap(), d);
        prop_assert!(anchored.next_after(d).unwrap() > d);
    }

    #[test]
    fn requery_is_identical(q in query(any_rule()), today in date()) {
        prop_assert_eq!(
            compute_display_window(&q, today).unwrap(),
            compute_display_window(&q, today).unwrap()
        );
    }

    #[test]
    fn completed_occurrences_are_never_returned(q in query(stepped_rule()), today in date()) {
        let window = compute_display_window(&q, today).unwrap();
        if let Some(completed) = q.last_completed {
            prop_assert!(completed < window.display_start);
        }
        prop_assert!(q.clamped_reference() <= window.display_end);
        prop_assert!(q.start_date <= window.display_end);
    }

    #[test]
    fn reference_before_start_is_floored(q in query(any_rule()), today in date(), back in 1u64..5000) {
        let early = WindowQuery {
            reference: q.start_date.checked_sub_days(Days::new(back)).unwrap(),
            ..q
        };
        let at_start = WindowQuery { reference: q.start_date, ..q };
        prop_assert_eq!(
            compute_display_window(&early, today).unwrap(),
            compute_display_window(&at_start, today).unwrap()
        );
    }

    #[test]
    fn window_bounds_are_inclusive(q in query(any_rule()), today in date()) {
        let window = compute_display_window(&q, today).unwrap();
        prop_assert!(window.contains(window.display_start));
        prop_assert!(window.contains(window.display_end));
        prop_assert!(window.contains(window.occurrence));
        prop_assert!(!window.contains(window.display_start.pred_opt().unwrap()));
        prop_assert!(!window.contains(window.display_end.succ_opt().unwrap()));
    }
}

#[test]
fn fifth_weekday_rule_never_lands_in_the_wrong_month() {
    let rule = RecurrenceRule::nth_weekday(2, 5, Weekday::Saturday).unwrap();
    let start = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
    let mut d = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    for year in [2020, 2048, 2076] {
        d = rule.anchored(start).next_after(d).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(year, 2, 29).unwrap());
    }
}
