//! Database schema migrations for remindr.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use indoc::indoc;
use rusqlite::{Connection, Result as SqliteResult};
use tracing::{info, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub fn schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!("failed to read schema_version: {e}");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: the tasks table.
///
/// A rule is stored as its kind name in `frequency` plus the columns that
/// kind needs; the others stay NULL. `day` holds the Yearly day of month or
/// the XDays interval, `on_date` the date of a Once rule.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(indoc! {"
        CREATE TABLE IF NOT EXISTS tasks (
            id                   TEXT PRIMARY KEY,
            description          TEXT NOT NULL,
            note                 TEXT NOT NULL DEFAULT '',
            category             TEXT NOT NULL,
            frequency            TEXT NOT NULL,
            month_day            INTEGER,
            weekday              TEXT,
            month                INTEGER,
            day                  INTEGER,
            week                 INTEGER,
            on_date              TEXT,
            start_date           TEXT NOT NULL,
            last_completed       TEXT,
            advance_display_days INTEGER NOT NULL DEFAULT 0,
            expire_display_days  INTEGER NOT NULL DEFAULT 0
        );
    "})?;
    set_schema_version(&tx, 1)?;
    tx.commit()?;
    info!("applied schema migration v1");
    Ok(())
}

/// Migration v2: creation/update timestamps and a description index for
/// the substring filter.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(indoc! {"
        ALTER TABLE tasks ADD COLUMN created_at TEXT NOT NULL DEFAULT '';
        ALTER TABLE tasks ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';
        CREATE INDEX IF NOT EXISTS idx_tasks_description ON tasks (description COLLATE NOCASE);
    "})?;
    set_schema_version(&tx, 2)?;
    tx.commit()?;
    info!("applied schema migration v2");
    Ok(())
}
