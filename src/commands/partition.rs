use crate::commands::stats::ask_stats;
use crate::commands::{print_lines, ASK_FILE};
use crate::error::Result;
use crate::services::partition_service::PartitionService;
use crate::services::stats_service::StatsService;
use crate::utils::prompt::Prompter;
use crate::AppState;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::instrument;

/// Splits a file into per-year partitions and lists them.
#[instrument(skip_all)]
pub fn run_split<R: BufRead, W: Write>(state: &AppState, prompter: &mut Prompter<R, W>) -> Result<()> {
    let file_name = prompter.ask(ASK_FILE)?;
    let partitions = PartitionService::split_by_year(Path::new(&file_name), &state.config.partition_dir)?;
    print_lines(
        prompter,
        partitions.iter().map(|p| p.path.display().to_string()),
    )
}

/// Year series from per-year partitions on the worker pool; areas from the full file.
#[instrument(skip_all)]
pub async fn run_partitioned<R: BufRead, W: Write>(
    state: &AppState,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let query = ask_stats(prompter, false)?;
    let partitions = PartitionService::split_by_year(&query.file_name, &state.config.partition_dir)?;

    let yearly = PartitionService::aggregate_partitions(
        &partitions,
        &query.profession,
        state.rates.clone(),
        state.config.worker_pool_size,
    )
    .await?;

    let mut stats = StatsService::collect(&query, &state.rates)?;
    stats.yearly = yearly;
    print_lines(prompter, StatsService::summary_lines(&stats))
}
