//! Tasks: a recurrence rule plus the metadata a user attaches to it.
//!
//! A [`Task`] is a plain value. The engine derives windows and due dates from
//! it but never changes it; completing a task produces a new value.

pub mod agenda;
pub mod filter;
pub mod holidays;

pub use agenda::{build_agenda, group_by_date, AgendaDay, AgendaEntry};
pub use filter::TaskFilter;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, SearchError};
use crate::recurrence::{Clock, DisplayWindow, RecurrenceRule, WindowEngine, WindowQuery};

/// Stored task category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskCategory {
    Appointment,
    Chore,
    Grooming,
    Holiday,
    Reminder,
    #[default]
    Task,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 6] = [
        TaskCategory::Appointment,
        TaskCategory::Chore,
        TaskCategory::Grooming,
        TaskCategory::Holiday,
        TaskCategory::Reminder,
        TaskCategory::Task,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskCategory::Appointment => "Appointment",
            TaskCategory::Chore => "Chore",
            TaskCategory::Grooming => "Grooming",
            TaskCategory::Holiday => "Holiday",
            TaskCategory::Reminder => "Reminder",
            TaskCategory::Task => "Task",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidInput {
                field: "category".into(),
                message: format!("unknown category '{s}'"),
            })
    }
}

/// Category constraint of a filter. `Any` is never stored on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    Any,
    Only(TaskCategory),
}

impl CategoryFilter {
    pub fn matches(self, category: TaskCategory) -> bool {
        match self {
            CategoryFilter::Any => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl From<TaskCategory> for CategoryFilter {
    fn from(value: TaskCategory) -> Self {
        CategoryFilter::Only(value)
    }
}

impl FromStr for CategoryFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("any") {
            Ok(CategoryFilter::Any)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// A recurring or one-time task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// `None` until the task has been saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub category: TaskCategory,
    pub rule: RecurrenceRule,
    /// The rule has no occurrences before this date.
    pub start_date: NaiveDate,
    #[serde(default)]
    pub last_completed: Option<NaiveDate>,
    pub advance_display_days: u32,
    pub expire_display_days: u32,
}

impl Task {
    /// Blank task as a new-task form starts out: daily, starting `today`,
    /// visible for one day after it is due.
    pub fn template(today: NaiveDate) -> Self {
        Self {
            id: None,
            description: String::new(),
            note: String::new(),
            category: TaskCategory::Task,
            rule: RecurrenceRule::Daily,
            start_date: today,
            last_completed: None,
            advance_display_days: 0,
            expire_display_days: 1,
        }
    }

    /// Replace the display offsets with the defaults for the task's rule kind.
    pub fn with_rule_defaults(mut self) -> Self {
        let kind = self.rule.kind();
        self.advance_display_days = kind.default_advance_days();
        self.expire_display_days = kind.default_expire_days();
        self
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.description.trim().is_empty() {
            return Err(CoreError::InvalidInput {
                field: "description".into(),
                message: "must not be blank".into(),
            });
        }
        Ok(())
    }

    /// The same task, marked done on `date`.
    pub fn completed_on(&self, date: NaiveDate) -> Self {
        Self {
            last_completed: Some(date),
            ..self.clone()
        }
    }

    pub fn window_query(&self, reference: NaiveDate) -> WindowQuery {
        WindowQuery {
            rule: self.rule,
            start_date: self.start_date,
            last_completed: self.last_completed,
            advance_days: self.advance_display_days,
            expire_days: self.expire_display_days,
            reference,
        }
    }

    pub fn display_window<C: Clock>(
        &self,
        engine: &WindowEngine<C>,
        reference: NaiveDate,
    ) -> Result<DisplayWindow, SearchError> {
        engine.display_window(&self.window_query(reference))
    }

    pub fn next_due_date<C: Clock>(
        &self,
        engine: &WindowEngine<C>,
        reference: NaiveDate,
    ) -> Result<NaiveDate, SearchError> {
        Ok(self.display_window(engine, reference)?.occurrence)
    }

    /// Negative when the task is overdue but still inside its expire window.
    pub fn days_until_due<C: Clock>(
        &self,
        engine: &WindowEngine<C>,
        reference: NaiveDate,
    ) -> Result<i64, SearchError> {
        Ok(self.display_window(engine, reference)?.days_until(reference))
    }

    pub fn is_currently_displayed<C: Clock>(
        &self,
        engine: &WindowEngine<C>,
        reference: NaiveDate,
    ) -> Result<bool, SearchError> {
        Ok(self.display_window(engine, reference)?.contains(reference))
    }
}
