//! Backlog management commands for CLI.

use agenda_core::{AgendaDb, Config, Project, ProjectUpdate};
use clap::Subcommand;

use super::{parse_due_date, resolve_user, CliResult};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Add a project to the backlog
    Create {
        /// Project title
        title: String,
        /// Free-form category (e.g. work, family)
        #[arg(long, default_value = "general")]
        category: String,
        /// Importance, 1-5
        #[arg(long, default_value = "3")]
        valence: i32,
        /// Estimated effort in hours
        #[arg(long)]
        hours: f64,
        /// Urgency, 1-5
        #[arg(long, default_value = "3")]
        priority: i32,
        /// Due date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        due: String,
    },
    /// List the backlog
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one project
    Show {
        /// Project ID
        id: String,
    },
    /// Update a project
    Update {
        /// Project ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        valence: Option<i32>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Delete a project (and its agenda blocks)
    Delete {
        /// Project ID
        id: String,
    },
}

pub fn run(action: ProjectAction, user: Option<String>) -> CliResult {
    let config = Config::load_or_default();
    let user = resolve_user(user, &config);
    let db = AgendaDb::open()?;

    match action {
        ProjectAction::Create {
            title,
            category,
            valence,
            hours,
            priority,
            due,
        } => {
            if title.trim().is_empty() || category.trim().is_empty() {
                return Err("title and category must not be empty".into());
            }
            let due_date = parse_due_date(&due)?;
            let project = Project::new(
                &user,
                title.trim(),
                category.trim(),
                valence,
                hours,
                priority,
                due_date,
            )?;
            db.create_project(&project)?;
            println!("Project created: {}", project.id);
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::List { json } => {
            let projects = db.list_projects(&user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else if projects.is_empty() {
                println!("No projects.");
            } else {
                for p in &projects {
                    println!(
                        "{}  P{} V{}  {:>5.1}h  due {}  [{}] {}",
                        p.id,
                        p.priority,
                        p.valence,
                        p.estimated_hours,
                        p.due_date.format("%Y-%m-%d"),
                        p.category,
                        p.title
                    );
                }
            }
        }
        ProjectAction::Show { id } => match db.get_project(&id, &user)? {
            Some(project) => println!("{}", serde_json::to_string_pretty(&project)?),
            None => return Err(format!("project not found: {id}").into()),
        },
        ProjectAction::Update {
            id,
            title,
            category,
            valence,
            hours,
            priority,
            due,
        } => {
            let mut project = db
                .get_project(&id, &user)?
                .ok_or_else(|| format!("project not found: {id}"))?;
            let update = ProjectUpdate {
                title,
                category,
                valence,
                estimated_hours: hours,
                priority,
                due_date: due.as_deref().map(parse_due_date).transpose()?,
            };
            if update.is_empty() {
                return Err("nothing to update".into());
            }
            project.apply(&update)?;
            db.update_project(&project)?;
            println!("Project updated: {}", project.id);
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::Delete { id } => {
            if !db.delete_project(&id, &user)? {
                return Err(format!("project not found: {id}").into());
            }
            println!("Project deleted: {id}");
        }
    }
    Ok(())
}
