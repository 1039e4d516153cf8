use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "agenda", version, about = "Agenda planner CLI")]
struct Cli {
    /// Owner id to act as (defaults to `user_id` from config)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backlog management
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Generate or confirm an agenda
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Inspect the confirmed agenda
    Agenda {
        #[command(subcommand)]
        action: commands::agenda::AgendaAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let user = cli.user;
    let result = match cli.command {
        Commands::Project { action } => commands::project::run(action, user),
        Commands::Plan { action } => commands::plan::run(action, user),
        Commands::Agenda { action } => commands::agenda::run(action, user),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
