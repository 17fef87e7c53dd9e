//! Core error types for remindr-core.
//!
//! The engine itself only produces [`RuleRangeError`] (at rule construction)
//! and [`SearchError`] (a broken rule invariant during the window search).
//! Storage and configuration have their own enums, and everything folds into
//! [`CoreError`] for callers that don't care which layer failed.

use std::path::PathBuf;
use thiserror::Error;

use crate::recurrence::RuleKind;

/// Core error type for remindr-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A recurrence rule field was out of range
    #[error(transparent)]
    RuleRange(#[from] RuleRangeError),

    /// The window search hit a broken invariant
    #[error("Search invariant violated: {0}")]
    Search(#[from] SearchError),

    /// Calendar arithmetic failed
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input that doesn't parse into a domain value
    #[error("Invalid value for '{field}': {message}")]
    InvalidInput { field: String, message: String },
}

/// A rule field was constructed outside its valid range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} must be between {min} and {max}, got {value}")]
pub struct RuleRangeError {
    pub field: &'static str,
    pub min: i64,
    pub max: i64,
    pub value: i64,
}

/// A rule's stepping functions misbehaved, or the bracket search ran away.
///
/// These indicate a defect in a rule implementation rather than bad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("previous_or_same returned {anchor} for reference {reference}")]
    AnchorAfterReference {
        anchor: chrono::NaiveDate,
        reference: chrono::NaiveDate,
    },

    #[error("next_after returned {next} for {prior}, expected a later date")]
    NoProgress {
        prior: chrono::NaiveDate,
        next: chrono::NaiveDate,
    },

    #[error("no accepted occurrence within {steps} steps")]
    StepLimitExceeded { steps: usize },

    #[error("no occurrence of {rule} found near {near}")]
    NoOccurrence {
        rule: String,
        near: chrono::NaiveDate,
    },

    #[error("date arithmetic left the representable range near {near}")]
    DateOutOfRange { near: chrono::NaiveDate },
}

/// Calendar primitive failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("occurrence index must be between 1 and 5, got {0}")]
    InvalidOccurrence(u8),

    #[error("{year}-{month:02} has no occurrence #{n} of {weekday}")]
    NoSuchWeekday {
        year: i32,
        month: u32,
        weekday: crate::calendar::Weekday,
        n: u8,
    },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored rule lacks a column its frequency requires
    #[error("{frequency} rule is missing required column '{column}'")]
    MissingRequiredField {
        frequency: RuleKind,
        column: &'static str,
    },

    /// A stored value could not be decoded
    #[error("Invalid stored value in column '{column}': {value}")]
    InvalidValue { column: &'static str, value: String },

    /// Stored rule fields are out of range
    #[error("Stored rule is invalid: {0}")]
    RuleRange(#[from] RuleRangeError),

    /// No row with the given id
    #[error("Task not found: {0}")]
    NotFound(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_range_error_names_field_and_range() {
        let err = RuleRangeError {
            field: "monthday",
            min: 1,
            max: 28,
            value: 30,
        };
        assert_eq!(err.to_string(), "monthday must be between 1 and 28, got 30");
    }

    #[test]
    fn missing_field_mentions_frequency() {
        let err = DatabaseError::MissingRequiredField {
            frequency: RuleKind::Weekly,
            column: "weekday",
        };
        assert_eq!(
            err.to_string(),
            "Weekly rule is missing required column 'weekday'"
        );
    }

    #[test]
    fn search_error_converts_into_core_error() {
        let err: CoreError = SearchError::StepLimitExceeded { steps: 10 }.into();
        assert!(matches!(err, CoreError::Search(_)));
    }

    #[test]
    fn calendar_error_propagates_with_question_mark() {
        fn fifth_monday(year: i32, month: u32) -> Result<chrono::NaiveDate> {
            Ok(crate::calendar::nth_weekday_of_month(
                year,
                month,
                crate::calendar::Weekday::Monday,
                5,
            )?)
        }
        // February 2021 has four Mondays.
        assert!(matches!(
            fifth_monday(2021, 2),
            Err(CoreError::Calendar(CalendarError::NoSuchWeekday { n: 5, .. }))
        ));
        assert!(matches!(
            fifth_monday(2021, 13),
            Err(CoreError::Calendar(CalendarError::InvalidMonth(13)))
        ));
    }
}
