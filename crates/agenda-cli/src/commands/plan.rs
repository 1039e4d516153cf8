//! Agenda generation and confirmation commands for CLI.

use std::sync::Arc;

use agenda_core::{
    AgendaBlock, AgendaDb, AgendaPlanner, Config, EnergyLevel, PlanningRequest, SystemClock,
};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{format_agenda, resolve_user, CliResult};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Propose an agenda from the backlog
    Generate {
        /// Hours to plan for
        #[arg(long)]
        horizon: f64,
        /// Energy level: low, medium (med) or high
        #[arg(long)]
        energy: Option<EnergyLevel>,
        /// Store the proposal as the confirmed agenda
        #[arg(long)]
        confirm: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the confirmed agenda with a block list
    Confirm {
        /// JSON: an array of blocks or an object with a `blocks` array
        json: String,
    },
}

/// A block as supplied by the caller; id and owner are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmedBlock {
    #[serde(default)]
    id: Option<String>,
    project_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConfirmPayload {
    List(Vec<ConfirmedBlock>),
    Wrapped { blocks: Vec<ConfirmedBlock> },
}

impl ConfirmPayload {
    fn into_blocks(self) -> Vec<ConfirmedBlock> {
        match self {
            ConfirmPayload::List(blocks) | ConfirmPayload::Wrapped { blocks } => blocks,
        }
    }
}

pub fn run(action: PlanAction, user: Option<String>) -> CliResult {
    let config = Config::load_or_default();
    let user = resolve_user(user, &config);
    let db = AgendaDb::open()?;

    match action {
        PlanAction::Generate {
            horizon,
            energy,
            confirm,
            json,
        } => {
            let energy = energy.unwrap_or(config.planner.default_energy);
            let planner = AgendaPlanner::from_config(&config.planner, Arc::new(SystemClock))?;
            let projects = db.list_projects(&user)?;
            let request = PlanningRequest::new(&user, projects.clone(), horizon, energy);

            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(planner.plan(&request))?;
            info!(blocks = result.blocks.len(), total_hours = result.total_hours, "agenda generated");

            if confirm {
                db.replace_agenda(&user, &result.blocks)?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                if result.blocks.is_empty() {
                    println!("Nothing to schedule.");
                } else {
                    print!("{}", format_agenda(&result.blocks, &projects));
                }
                println!("Total: {:.1}h of {horizon}h ({energy} energy)", result.total_hours);
                if confirm {
                    println!("Agenda confirmed.");
                }
            }
        }
        PlanAction::Confirm { json } => {
            let payload: ConfirmPayload = serde_json::from_str(&json)?;
            let mut blocks = Vec::new();
            for b in payload.into_blocks() {
                if b.end <= b.start {
                    return Err(format!("block for {} ends before it starts", b.project_id).into());
                }
                if db.get_project(&b.project_id, &user)?.is_none() {
                    return Err(format!("project not found: {}", b.project_id).into());
                }
                blocks.push(AgendaBlock {
                    id: b.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: user.clone(),
                    project_id: b.project_id,
                    start: b.start,
                    end: b.end,
                });
            }
            blocks.sort_by_key(|b| b.start);
            let stored = db.replace_agenda(&user, &blocks)?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
    }
    Ok(())
}
