use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod run;

/// cleanroute CLI - run the cleaning-task optimizer against local fixtures
#[derive(Parser)]
#[command(name = "cleanroute")]
#[command(about = "cleanroute optimizer CLI for local runs and debugging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the optimizer against a JSON fixture file, no database required
    Run {
        /// Path to a fixture file (work_date, tasks, cleaners, params)
        fixture: PathBuf,
        /// Algorithm version tag recorded on the run
        #[arg(long, default_value = "cleanroute-1")]
        algorithm_version: String,
        /// Print the full schedule and decision event count
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { fixture, algorithm_version, verbose } => {
            run::run(&fixture, &algorithm_version, verbose).await?;
        }
    }

    Ok(())
}
