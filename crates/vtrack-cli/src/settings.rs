//! Settings command handlers. These never open the database.

use std::path::Path;

use clap::Subcommand;
use vtrack_core::{SettingsStore, WeekStart};

/// Sub-commands available under `settings`.
#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,
    /// Set the minimum daily views for admitting a new video
    SetThreshold { vv_threshold: u32 },
    /// Set the first day of the week used for weekly series
    SetWeekStart { week_start: WeekStart },
}

/// # Errors
///
/// Returns an error if the settings file cannot be read or written, or the
/// new value is invalid.
pub(crate) fn run_settings(path: &Path, command: SettingsCommands) -> anyhow::Result<()> {
    let mut store = SettingsStore::load(path)?;
    match command {
        SettingsCommands::Show => {}
        SettingsCommands::SetThreshold { vv_threshold } => {
            store.set_vv_threshold(vv_threshold)?;
            tracing::info!(vv_threshold, "view threshold updated");
        }
        SettingsCommands::SetWeekStart { week_start } => {
            store.set_week_start(week_start)?;
            tracing::info!(%week_start, "week start updated");
        }
    }

    let settings = store.settings();
    println!("Settings file: {}", store.path().display());
    println!("View threshold: {}", settings.vv_threshold);
    println!("Week start: {}", settings.week_start);
    Ok(())
}
