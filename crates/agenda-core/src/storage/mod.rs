pub mod agenda_db;
pub mod config;

pub use agenda_db::AgendaDb;
pub use config::{Config, ExternalPlannerConfig, PlannerConfig, PlannerStrategy};

use std::path::PathBuf;

/// Returns the planner's data directory.
///
/// `AGENDA_DATA_DIR` overrides the location entirely. Otherwise this is
/// `~/.config/agenda-planner[-dev]/`, with the `-dev` suffix selected by
/// `AGENDA_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("AGENDA_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("AGENDA_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("agenda-planner-dev")
            } else {
                base_dir.join("agenda-planner")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
