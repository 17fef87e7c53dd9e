//! Task listing ordered and grouped by next due date.

use chrono::NaiveDate;
use serde::Serialize;

use super::{Task, TaskFilter};
use crate::error::SearchError;
use crate::recurrence::{Clock, DisplayWindow, WindowEngine};

/// A task with its window for the listing's reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaEntry {
    pub task: Task,
    pub window: DisplayWindow,
    pub days_until_due: i64,
    pub displayed: bool,
}

/// All entries sharing a due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub entries: Vec<AgendaEntry>,
}

/// Tasks matching `filter`, sorted by next due date, then description.
pub fn build_agenda<'a, C, I>(
    tasks: I,
    filter: &TaskFilter,
    engine: &WindowEngine<C>,
    reference: NaiveDate,
) -> Result<Vec<AgendaEntry>, SearchError>
where
    C: Clock,
    I: IntoIterator<Item = &'a Task>,
{
    let mut entries = Vec::new();
    for task in tasks {
        if !filter.matches(task, engine, reference)? {
            continue;
        }
        let window = task.display_window(engine, reference)?;
        entries.push(AgendaEntry {
            task: task.clone(),
            window,
            days_until_due: window.days_until(reference),
            displayed: window.contains(reference),
        });
    }
    entries.sort_by(|a, b| {
        a.window
            .occurrence
            .cmp(&b.window.occurrence)
            .then_with(|| a.task.description.cmp(&b.task.description))
    });
    Ok(entries)
}

/// Split sorted entries into runs with the same due date.
pub fn group_by_date(entries: Vec<AgendaEntry>) -> Vec<AgendaDay> {
    let mut days: Vec<AgendaDay> = Vec::new();
    for entry in entries {
        let date = entry.window.occurrence;
        match days.last_mut() {
            Some(day) if day.date == date => day.entries.push(entry),
            _ => days.push(AgendaDay {
                date,
                entries: vec![entry],
            }),
        }
    }
    days
}
