use chrono::NaiveDate;
use clap::Subcommand;
use remindr_core::task::{build_agenda, holidays};
use remindr_core::{Config, TaskCategory, TaskDb, TaskFilter};
use serde::Serialize;
use tracing::info;

use super::{engine, reference_date};

#[derive(Subcommand)]
pub enum HolidaysAction {
    /// List the built-in holidays with their next dates
    List {
        /// Reference date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Save the built-in holidays as tasks, skipping ones already saved
    Seed,
}

#[derive(Serialize)]
struct SeedReport {
    added: Vec<String>,
    skipped: Vec<String>,
}

pub fn run(action: HolidaysAction) -> Result<(), Box<dyn std::error::Error>> {
    let presets = holidays::presets()?;

    match action {
        HolidaysAction::List { date } => {
            let config = Config::load()?;
            let engine = engine(&config);
            let reference = reference_date(date, &engine);
            let entries = build_agenda(&presets, &TaskFilter::all(), &engine, reference)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        HolidaysAction::Seed => {
            let db = TaskDb::open()?;
            let existing = db.list()?;
            let mut report = SeedReport {
                added: Vec::new(),
                skipped: Vec::new(),
            };
            for preset in presets {
                let saved = existing.iter().any(|task| {
                    task.category == TaskCategory::Holiday && task.description == preset.description
                });
                if saved {
                    report.skipped.push(preset.description);
                } else {
                    db.upsert(&preset)?;
                    report.added.push(preset.description);
                }
            }
            info!(added = report.added.len(), skipped = report.skipped.len(), "seeded holidays");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
