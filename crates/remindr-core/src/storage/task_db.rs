//! SQLite-based storage for tasks.
//!
//! A rule is flattened into its kind name (`frequency`) and the nullable
//! columns that kind uses. Loading checks that every column the kind needs
//! is present and in range, so a damaged row surfaces as an error instead of
//! a wrong schedule.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use super::{data_dir, migrations};
use crate::calendar::Weekday;
use crate::error::{DatabaseError, Result};
use crate::recurrence::{RecurrenceRule, RuleKind};
use crate::task::{Task, TaskCategory};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "id, description, note, category, frequency, month_day, weekday,
     month, day, week, on_date, start_date, last_completed,
     advance_display_days, expire_display_days";

/// A `tasks` row as stored, before validation.
#[derive(Debug, Clone)]
struct TaskRow {
    id: String,
    description: String,
    note: String,
    category: String,
    frequency: String,
    month_day: Option<i64>,
    weekday: Option<String>,
    month: Option<i64>,
    day: Option<i64>,
    week: Option<i64>,
    on_date: Option<String>,
    start_date: String,
    last_completed: Option<String>,
    advance_display_days: i64,
    expire_display_days: i64,
}

impl TaskRow {
    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            description: row.get(1)?,
            note: row.get(2)?,
            category: row.get(3)?,
            frequency: row.get(4)?,
            month_day: row.get(5)?,
            weekday: row.get(6)?,
            month: row.get(7)?,
            day: row.get(8)?,
            week: row.get(9)?,
            on_date: row.get(10)?,
            start_date: row.get(11)?,
            last_completed: row.get(12)?,
            advance_display_days: row.get(13)?,
            expire_display_days: row.get(14)?,
        })
    }

    fn rule(&self) -> Result<RecurrenceRule, DatabaseError> {
        let kind: RuleKind = self
            .frequency
            .parse()
            .map_err(|_| invalid("frequency", &self.frequency))?;
        let need = |column: &'static str, value: Option<i64>| {
            value.ok_or(DatabaseError::MissingRequiredField {
                frequency: kind,
                column,
            })
        };
        let weekday = || -> Result<Weekday, DatabaseError> {
            let name = self
                .weekday
                .as_deref()
                .ok_or(DatabaseError::MissingRequiredField {
                    frequency: kind,
                    column: "weekday",
                })?;
            name.parse().map_err(|_| invalid("weekday", name))
        };

        let rule = match kind {
            RuleKind::Daily => RecurrenceRule::Daily,
            RuleKind::Weekly => RecurrenceRule::weekly(weekday()?),
            RuleKind::Monthly => RecurrenceRule::monthly(need("month_day", self.month_day)?)?,
            RuleKind::Yearly => {
                RecurrenceRule::yearly(need("month", self.month)?, need("day", self.day)?)?
            }
            RuleKind::XDays => RecurrenceRule::x_days(need("day", self.day)?)?,
            RuleKind::XMonthYWeekZWeekday => RecurrenceRule::nth_weekday(
                need("month", self.month)?,
                need("week", self.week)?,
                weekday()?,
            )?,
            RuleKind::Once => {
                let text = self
                    .on_date
                    .as_deref()
                    .ok_or(DatabaseError::MissingRequiredField {
                        frequency: kind,
                        column: "on_date",
                    })?;
                RecurrenceRule::once(parse_date("on_date", text)?)
            }
        };
        Ok(rule)
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = DatabaseError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let rule = row.rule()?;
        let category: TaskCategory = row
            .category
            .parse()
            .map_err(|_| invalid("category", &row.category))?;
        let last_completed = row
            .last_completed
            .as_deref()
            .map(|text| parse_date("last_completed", text))
            .transpose()?;
        let advance_display_days = u32::try_from(row.advance_display_days)
            .map_err(|_| invalid("advance_display_days", &row.advance_display_days.to_string()))?;
        let expire_display_days = u32::try_from(row.expire_display_days)
            .map_err(|_| invalid("expire_display_days", &row.expire_display_days.to_string()))?;

        Ok(Task {
            start_date: parse_date("start_date", &row.start_date)?,
            id: Some(row.id),
            description: row.description,
            note: row.note,
            category,
            rule,
            last_completed,
            advance_display_days,
            expire_display_days,
        })
    }
}

/// Nullable rule columns for one rule.
#[derive(Debug, Default, PartialEq, Eq)]
struct RuleColumns {
    month_day: Option<i64>,
    weekday: Option<&'static str>,
    month: Option<i64>,
    day: Option<i64>,
    week: Option<i64>,
    on_date: Option<String>,
}

impl From<&RecurrenceRule> for RuleColumns {
    fn from(rule: &RecurrenceRule) -> Self {
        let columns = RuleColumns {
            month: rule.month().map(|m| i64::from(m.get())),
            week: rule.week().map(|w| i64::from(w.get())),
            weekday: rule.weekday().map(Weekday::name),
            month_day: rule.monthday().map(|d| i64::from(d.get())),
            on_date: rule.date().map(format_date),
            ..RuleColumns::default()
        };
        let day = rule
            .day()
            .map(|d| i64::from(d.get()))
            .or_else(|| rule.interval().map(|i| i64::from(i.get())));
        RuleColumns { day, ..columns }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(column: &'static str, text: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| invalid(column, text))
}

fn invalid(column: &'static str, value: &str) -> DatabaseError {
    DatabaseError::InvalidValue {
        column,
        value: value.to_string(),
    }
}

/// SQLite store for tasks.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the task database at `<data dir>/remindr.db`.
    ///
    /// Creates the file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("remindr.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Insert or replace a task, assigning an id to an unsaved one.
    ///
    /// Returns the task as stored.
    pub fn upsert(&self, task: &Task) -> Result<Task> {
        task.validate()?;
        let id = task
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let columns = RuleColumns::from(&task.rule);
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO tasks (
                    id, description, note, category, frequency, month_day, weekday,
                    month, day, week, on_date, start_date, last_completed,
                    advance_display_days, expire_display_days, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)
                 ON CONFLICT(id) DO UPDATE SET
                    description = excluded.description,
                    note = excluded.note,
                    category = excluded.category,
                    frequency = excluded.frequency,
                    month_day = excluded.month_day,
                    weekday = excluded.weekday,
                    month = excluded.month,
                    day = excluded.day,
                    week = excluded.week,
                    on_date = excluded.on_date,
                    start_date = excluded.start_date,
                    last_completed = excluded.last_completed,
                    advance_display_days = excluded.advance_display_days,
                    expire_display_days = excluded.expire_display_days,
                    updated_at = excluded.updated_at",
                params![
                    id,
                    task.description,
                    task.note,
                    task.category.name(),
                    task.rule.kind().name(),
                    columns.month_day,
                    columns.weekday,
                    columns.month,
                    columns.day,
                    columns.week,
                    columns.on_date,
                    format_date(task.start_date),
                    task.last_completed.map(format_date),
                    task.advance_display_days,
                    task.expire_display_days,
                    now,
                ],
            )
            .map_err(DatabaseError::from)?;

        info!(%id, rule = %task.rule, "saved task");
        Ok(Task {
            id: Some(id),
            ..task.clone()
        })
    }

    /// Get a task by ID.
    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                TaskRow::read,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(row.map(Task::try_from).transpose()?)
    }

    /// All tasks, ordered by description.
    pub fn list(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM tasks ORDER BY description COLLATE NOCASE, id"
            ))
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], TaskRow::read)
            .map_err(DatabaseError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(DatabaseError::from)?;
        debug!(count = rows.len(), "loaded tasks");

        let tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, DatabaseError>>()?;
        Ok(tasks)
    }

    /// Delete a task. Returns whether a row was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .map_err(DatabaseError::from)?;
        if removed > 0 {
            info!(%id, "deleted task");
        }
        Ok(removed > 0)
    }

    /// Record a completion on `date` and return the updated task.
    pub fn mark_complete(&self, id: &str, date: NaiveDate) -> Result<Task> {
        let task = self
            .get(id)?
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))?;
        self.upsert(&task.completed_on(date))
    }
}
