use chrono::NaiveDate;

use super::{CategoryFilter, Task};
use crate::error::SearchError;
use crate::recurrence::{Clock, WindowEngine};

/// Criteria for listing tasks. Each unset criterion matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFilter {
    /// `Some(true)`: only tasks shown on the reference date.
    /// `Some(false)`: only tasks hidden on it.
    pub due: Option<bool>,
    /// Case-insensitive substring of the description. Blank means unset.
    pub description_like: Option<String>,
    pub category: CategoryFilter,
}

impl TaskFilter {
    /// What a task list starts with: tasks that are due, any category.
    pub fn initial() -> Self {
        Self {
            due: Some(true),
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches<C: Clock>(
        &self,
        task: &Task,
        engine: &WindowEngine<C>,
        reference: NaiveDate,
    ) -> Result<bool, SearchError> {
        if !self.description_matches(task) || !self.category.matches(task.category) {
            return Ok(false);
        }
        match self.due {
            None => Ok(true),
            Some(due) => Ok(task.is_currently_displayed(engine, reference)? == due),
        }
    }

    fn description_matches(&self, task: &Task) -> bool {
        match self.description_like.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => task
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}
