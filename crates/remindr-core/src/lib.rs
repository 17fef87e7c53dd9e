//! # Remindr Core Library
//!
//! This library provides the core logic for remindr, a tracker for recurring
//! and one-time tasks. For any task and reference date it answers two
//! questions: when is the task next due, and over which dates should it be
//! shown. All operations are available through the `remindr` CLI, which is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Calendar**: total date arithmetic and nth-weekday lookup
//! - **Recurrence**: the seven rule kinds, their stepping functions, and the
//!   display-window search built on them
//! - **Task**: the task value, list filter, agenda grouping, holiday presets
//! - **Storage**: SQLite task persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`RecurrenceRule`]: a validated recurrence pattern
//! - [`compute_display_window`]: the pure window search
//! - [`WindowEngine`]: the search with an injected clock and a memo cache
//! - [`Task`] and [`TaskFilter`]: what the CLI lists and filters
//! - [`TaskDb`]: task persistence
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod error;
pub mod recurrence;
pub mod storage;
pub mod task;

pub use calendar::Weekday;
pub use error::{
    CalendarError, ConfigError, CoreError, DatabaseError, RuleRangeError, SearchError,
};
pub use recurrence::{
    compute_display_window, Clock, DisplayWindow, FixedClock, Occurrences, OccurrenceCache,
    RecurrenceRule, RuleKind, SystemClock, WindowEngine, WindowQuery,
};
pub use storage::{Config, TaskDb};
pub use task::{CategoryFilter, Task, TaskCategory, TaskFilter};
