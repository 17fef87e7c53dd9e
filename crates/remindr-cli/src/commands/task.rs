//! Task management commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use remindr_core::task::{build_agenda, group_by_date};
use remindr_core::{
    CategoryFilter, Config, DisplayWindow, RecurrenceRule, TaskCategory, TaskDb, TaskFilter,
};
use serde::Serialize;
use tracing::{debug, info};

use super::{engine, reference_date};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new task
    Add {
        /// Task description
        description: String,
        /// Recurrence rule: daily, weekly:thu, monthly:7, yearly:12-25,
        /// every:10, nth:4:thu:11 or once:2024-05-01
        #[arg(long, default_value = "daily")]
        rule: RecurrenceRule,
        /// Category (defaults to `defaults.category`)
        #[arg(long)]
        category: Option<TaskCategory>,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
        /// First date the rule can fall on (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Days before the due date to start showing the task
        #[arg(long)]
        advance: Option<u32>,
        /// Days after the due date to keep showing the task
        #[arg(long)]
        expire: Option<u32>,
    },
    /// List tasks ordered by next due date
    List {
        /// Only tasks shown on the reference date
        #[arg(long, conflicts_with_all = ["not_due", "all"])]
        due: bool,
        /// Only tasks hidden on the reference date
        #[arg(long, conflicts_with = "all")]
        not_due: bool,
        /// Tasks in any state
        #[arg(long)]
        all: bool,
        /// Case-insensitive description substring
        #[arg(long)]
        search: Option<String>,
        /// Category, or "any"
        #[arg(long, default_value = "any")]
        category: CategoryFilter,
        /// Reference date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// One entry per task instead of grouping by due date
        #[arg(long)]
        flat: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New recurrence rule
        #[arg(long)]
        rule: Option<RecurrenceRule>,
        /// New category
        #[arg(long)]
        category: Option<TaskCategory>,
        /// New note
        #[arg(long)]
        note: Option<String>,
        /// New start date
        #[arg(long)]
        start: Option<NaiveDate>,
        /// New advance display days
        #[arg(long)]
        advance: Option<u32>,
        /// New expire display days
        #[arg(long)]
        expire: Option<u32>,
        /// Forget the last completion
        #[arg(long)]
        clear_completed: bool,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Mark a task done
    Complete {
        /// Task ID
        id: String,
        /// Completion date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show when a task is next due
    Next {
        /// Task ID
        id: String,
        /// Reference date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct NextDue<'a> {
    id: &'a str,
    description: &'a str,
    rule: String,
    next_due_date: NaiveDate,
    days_until_due: i64,
    displayed: bool,
    window: DisplayWindow,
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = TaskDb::open()?;
    let engine = engine(&config);

    match action {
        TaskAction::Add {
            description,
            rule,
            category,
            note,
            start,
            advance,
            expire,
        } => {
            let today = engine.today();
            let mut task = config.defaults.new_task(&description, rule, today);
            if let Some(c) = category {
                task.category = c;
            }
            if let Some(n) = note {
                task.note = n;
            }
            if let Some(s) = start {
                task.start_date = s;
            }
            if let Some(a) = advance {
                task.advance_display_days = a;
            }
            if let Some(e) = expire {
                task.expire_display_days = e;
            }

            let task = db.upsert(&task)?;
            info!(id = task.id.as_deref().unwrap_or_default(), rule = %task.rule, "added task");
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List {
            due,
            not_due,
            all,
            search,
            category,
            date,
            flat,
        } => {
            let due = if due {
                Some(true)
            } else if not_due {
                Some(false)
            } else if all {
                None
            } else {
                config.list.due.as_option()
            };
            let filter = TaskFilter {
                due,
                description_like: search,
                category,
            };
            let reference = reference_date(date, &engine);
            let tasks = db.list()?;
            let entries = build_agenda(&tasks, &filter, &engine, reference)?;
            debug!(%reference, listed = entries.len(), total = tasks.len(), "built agenda");

            if config.list.group_by_date && !flat {
                println!("{}", serde_json::to_string_pretty(&group_by_date(entries))?);
            } else {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
        }
        TaskAction::Get { id } => {
            let task = db.get(&id)?.ok_or_else(|| format!("task not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Update {
            id,
            description,
            rule,
            category,
            note,
            start,
            advance,
            expire,
            clear_completed,
        } => {
            let mut task = db.get(&id)?.ok_or_else(|| format!("task not found: {id}"))?;

            if let Some(d) = description {
                task.description = d;
            }
            if let Some(r) = rule {
                task.rule = r;
            }
            if let Some(c) = category {
                task.category = c;
            }
            if let Some(n) = note {
                task.note = n;
            }
            if let Some(s) = start {
                task.start_date = s;
            }
            if let Some(a) = advance {
                task.advance_display_days = a;
            }
            if let Some(e) = expire {
                task.expire_display_days = e;
            }
            if clear_completed {
                task.last_completed = None;
            }

            let task = db.upsert(&task)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            if !db.delete(&id)? {
                return Err(format!("task not found: {id}").into());
            }
            info!(%id, "removed task");
            println!("Task deleted: {id}");
        }
        TaskAction::Complete { id, date } => {
            let date = reference_date(date, &engine);
            let task = db.mark_complete(&id, date)?;
            info!(%id, %date, "completed task");
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Next { id, date } => {
            let task = db.get(&id)?.ok_or_else(|| format!("task not found: {id}"))?;
            let reference = reference_date(date, &engine);
            let window = task.display_window(&engine, reference)?;
            let next = NextDue {
                id: &id,
                description: &task.description,
                rule: task.rule.to_string(),
                next_due_date: window.occurrence,
                days_until_due: window.days_until(reference),
                displayed: window.contains(reference),
                window,
            };
            println!("{}", serde_json::to_string_pretty(&next)?);
        }
    }
    Ok(())
}
