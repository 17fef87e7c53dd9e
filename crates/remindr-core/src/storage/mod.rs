mod config;
pub mod migrations;
pub mod task_db;

pub use config::{Config, DefaultsConfig, DueFilter, EngineConfig, ListConfig};
pub use task_db::TaskDb;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `REMINDR_DATA_DIR` wins when set. Otherwise `~/.config/remindr/`, or
/// `~/.config/remindr-dev/` when `REMINDR_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("REMINDR_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("REMINDR_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("remindr-dev")
            } else {
                base_dir.join("remindr")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
