//! Confirmed agenda commands for CLI.

use agenda_core::{AgendaDb, Config};
use clap::Subcommand;

use super::{format_agenda, resolve_user, CliResult};

#[derive(Subcommand)]
pub enum AgendaAction {
    /// Show the confirmed agenda
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the confirmed agenda
    Clear,
}

pub fn run(action: AgendaAction, user: Option<String>) -> CliResult {
    let config = Config::load_or_default();
    let user = resolve_user(user, &config);
    let db = AgendaDb::open()?;

    match action {
        AgendaAction::List { json } => {
            let blocks = db.list_agenda(&user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else if blocks.is_empty() {
                println!("No agenda.");
            } else {
                let projects = db.list_projects(&user)?;
                print!("{}", format_agenda(&blocks, &projects));
            }
        }
        AgendaAction::Clear => {
            let removed = db.clear_agenda(&user)?;
            println!("Removed {removed} block(s).");
        }
    }
    Ok(())
}
