use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use timesheets::commands::*;
use timesheets::config::Config;
use timesheets::error::TimesheetError;
use timesheets::notify::ChangeBus;
use timesheets::repository::Repository;
use timesheets::storage::{FileStore, KeyValueStore};

#[derive(Parser)]
#[command(name = "timesheets")]
#[command(about = "Log and review weekly timesheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List weeks with their hours and status
    Weeks,
    /// Show the tasks of one week, grouped by day
    Show {
        /// Week id
        week: String,
    },
    /// Log a task in a week
    Add {
        /// Week id
        week: String,
        /// Day of the task in YYYY-MM-DD
        #[arg(short, long)]
        date: String,
        /// What you worked on
        #[arg(short = 'm', long)]
        description: String,
        /// Hours spent, e.g. 1.5
        #[arg(short = 'H', long)]
        hours: String,
        /// Project name
        #[arg(short, long)]
        project: String,
    },
    /// Edit a task (unspecified fields are kept)
    Edit {
        /// Week id
        week: String,
        /// Task id
        task: String,
        /// New description
        #[arg(short = 'm', long)]
        description: Option<String>,
        /// New duration in hours
        #[arg(short = 'H', long)]
        hours: Option<String>,
        /// New project
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Week id
        week: String,
        /// Task id
        task: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Delete all stored timesheets (defaults are restored on next run)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Print the week list whenever another process changes it
    Watch,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TimesheetError> {
    let command = cli.command.unwrap_or(Commands::Weeks);
    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "timesheets", &mut io::stdout());
        return Ok(());
    }

    let config = Config::from_env();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.data_dir.clone())?);
    if let Commands::Reset { force } = command {
        cmd_reset(store.as_ref(), force)?;
        return Ok(());
    }

    let mut repo = Repository::open(Arc::clone(&store), Arc::new(ChangeBus::new()))?;
    match command {
        Commands::Weeks => cmd_weeks(&repo),
        Commands::Show { week } => cmd_show(&repo, &week)?,
        Commands::Add { week, date, description, hours, project } => {
            cmd_add(&mut repo, &week, &date, description, hours, project, false)?;
        }
        Commands::Edit { week, task, description, hours, project } => {
            cmd_edit(&mut repo, &week, &task, description, hours, project, false)?;
        }
        Commands::Delete { week, task, force } => {
            cmd_delete(&mut repo, &week, &task, force, false)?;
        }
        Commands::Watch => cmd_watch(&mut repo, store, config.poll_interval)?,
        Commands::Reset { .. } | Commands::Completions { .. } => {}
    }
    Ok(())
}

fn report(e: &TimesheetError) {
    match e {
        TimesheetError::Validation(errors) => {
            eprintln!("Task not saved:");
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
        }
        other => eprintln!("Error: {other}"),
    }
}
