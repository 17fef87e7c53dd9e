pub mod completions;
pub mod config;
pub mod holidays;
pub mod task;

use chrono::NaiveDate;
use remindr_core::{Config, SystemClock, WindowEngine};

/// Engine for one command invocation, honouring `engine.cache_enabled`.
pub fn engine(config: &Config) -> WindowEngine<SystemClock> {
    let engine = WindowEngine::new();
    if config.engine.cache_enabled {
        engine
    } else {
        engine.without_cache()
    }
}

/// `--date` value, or today when absent.
pub fn reference_date(date: Option<NaiveDate>, engine: &WindowEngine<SystemClock>) -> NaiveDate {
    date.unwrap_or_else(|| engine.today())
}
