use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use vacancy_analytics::{
    commands::{partition, rates, stats, table},
    config::{get_config, init_config},
    error::Result,
    utils::prompt::Prompter,
    AppState,
};

/// Vacancy file analytics: console tables, salary statistics and reports.
///
/// Every command asks for its parameters on stdin.
#[derive(Parser)]
#[command(name = "vacancy-analytics", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Filter, sort and print vacancies as a table
    Table,
    /// Print yearly and area statistics; write report.xlsx and graph.svg
    Stats,
    /// Print statistics and render report.pdf
    Report,
    /// Statistics for a profession within one region, rendered as PDF
    Region,
    /// Split a vacancy file into per-year partitions
    Split,
    /// Statistics computed from per-year partitions on a worker pool
    Partitioned,
    /// Fetch monthly exchange rates from the central bank
    Rates,
    /// Convert salaries to roubles with the monthly rate file
    Convert,
}

async fn run(command: Command) -> Result<()> {
    init_config()?;
    let state = AppState::new(get_config()?.clone())?;
    debug!(?command, "Starting");

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    match command {
        Command::Table => table::run_table(&state, &mut prompter),
        Command::Stats => stats::run_stats(&state, &mut prompter),
        Command::Report => stats::run_report(&state, &mut prompter).await,
        Command::Region => stats::run_region(&state, &mut prompter).await,
        Command::Split => partition::run_split(&state, &mut prompter),
        Command::Partitioned => partition::run_partitioned(&state, &mut prompter).await,
        Command::Rates => rates::run_rates(&state, &mut prompter).await,
        Command::Convert => rates::run_convert(&state, &mut prompter),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_user_facing() => {
            println!("{}", e);
            let _ = io::stdout().flush();
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = ?e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
