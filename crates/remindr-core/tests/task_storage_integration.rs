//! Integration tests: persisted tasks driven through the window engine.

use chrono::NaiveDate;
use remindr_core::task::{build_agenda, group_by_date, holidays};
use remindr_core::{
    FixedClock, RecurrenceRule, Task, TaskCategory, TaskDb, TaskFilter, Weekday, WindowEngine,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_complete_weekly_task_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let db = TaskDb::open_at(&dir.path().join("remindr.db")).unwrap();
    let today = ymd(2020, 1, 6);
    let engine = WindowEngine::with_clock(FixedClock(today));

    let saved = db
        .upsert(&Task {
            description: "Take out trash".into(),
            category: TaskCategory::Chore,
            rule: RecurrenceRule::weekly(Weekday::Monday),
            ..Task::template(ymd(2020, 1, 1))
        }
        .with_rule_defaults())
        .unwrap();
    let id = saved.id.clone().unwrap();

    // Due today, shown all week.
    assert!(saved.is_currently_displayed(&engine, today).unwrap());
    assert_eq!(saved.next_due_date(&engine, today).unwrap(), today);

    // Completing it hides it until next Monday.
    let done = db.mark_complete(&id, today).unwrap();
    assert!(!done.is_currently_displayed(&engine, today).unwrap());
    assert_eq!(done.next_due_date(&engine, today).unwrap(), ymd(2020, 1, 13));

    // Reloaded from disk, the completion still applies.
    let reopened = TaskDb::open_at(&dir.path().join("remindr.db")).unwrap();
    let loaded = reopened.get(&id).unwrap().unwrap();
    assert_eq!(loaded, done);
    assert!(TaskFilter::initial()
        .matches(&loaded, &engine, ymd(2020, 1, 13))
        .unwrap());
}

#[test]
fn test_seeded_holidays_agenda() {
    let db = TaskDb::open_memory().unwrap();
    for preset in holidays::presets().unwrap() {
        db.upsert(&preset).unwrap();
    }
    let tasks = db.list().unwrap();
    assert_eq!(tasks.len(), 8);

    let reference = ymd(2021, 11, 20);
    let engine = WindowEngine::with_clock(FixedClock(reference));
    let entries = build_agenda(&tasks, &TaskFilter::initial(), &engine, reference).unwrap();
    let due: Vec<_> = entries.iter().map(|e| e.task.description.as_str()).collect();
    // Thanksgiving (Nov 25) is within 14 days; Christmas shows from Nov 25.
    assert_eq!(due, ["Thanksgiving"]);

    let everything = build_agenda(&tasks, &TaskFilter::all(), &engine, reference).unwrap();
    let days = group_by_date(everything);
    assert_eq!(days.len(), 8);
    assert_eq!(days[0].date, ymd(2021, 11, 25));
    assert_eq!(days[1].date, ymd(2021, 12, 25));
    assert!(days.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[test]
fn test_cache_is_shared_across_a_listing() {
    let db = TaskDb::open_memory().unwrap();
    db.upsert(&Task {
        description: "Pay rent".into(),
        rule: RecurrenceRule::monthly(1).unwrap(),
        ..Task::template(ymd(2020, 1, 1))
    })
    .unwrap();
    let tasks = db.list().unwrap();
    let engine = WindowEngine::with_clock(FixedClock(ymd(2020, 1, 15)));

    // The filter and the agenda entry query the same window.
    build_agenda(&tasks, &TaskFilter::all(), &engine, ymd(2020, 1, 15)).unwrap();
    build_agenda(&tasks, &TaskFilter::initial(), &engine, ymd(2020, 1, 15)).unwrap();
    let stats = engine.cache_stats().unwrap();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}
