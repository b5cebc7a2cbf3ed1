use crate::commands::{print_lines, ASK_FILE, ASK_PROFESSION, ASK_REGION};
use crate::dto::stats_query::{StatsPrompt, StatsQuery};
use crate::error::Result;
use crate::models::stats::Statistics;
use crate::services::chart_service::ChartService;
use crate::services::export_service::ExportService;
use crate::services::rate_service::RateService;
use crate::services::report_service::ReportService;
use crate::services::stats_service::StatsService;
use crate::utils::prompt::Prompter;
use crate::AppState;
use anyhow::Context;
use std::io::{BufRead, Write};
use tracing::instrument;

pub const WORKBOOK_FILE: &str = "report.xlsx";
pub const CHART_FILE: &str = "graph.svg";
pub const PDF_FILE: &str = "report.pdf";

pub fn ask_stats<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    with_region: bool,
) -> Result<StatsQuery> {
    let file_name = prompter.ask(ASK_FILE)?;
    let profession = prompter.ask(ASK_PROFESSION)?;
    let region = if with_region {
        Some(prompter.ask(ASK_REGION)?)
    } else {
        None
    };
    StatsQuery::from_prompt(&StatsPrompt {
        file_name,
        profession,
        region,
    })
}

fn collect_and_print<R: BufRead, W: Write>(
    state: &AppState,
    prompter: &mut Prompter<R, W>,
) -> Result<Statistics> {
    let query = ask_stats(prompter, false)?;
    let stats = StatsService::collect(&query, &state.rates)?;
    print_lines(prompter, StatsService::summary_lines(&stats))?;
    Ok(stats)
}

/// Prints the statistics and writes the workbook and the chart.
#[instrument(skip_all)]
pub fn run_stats<R: BufRead, W: Write>(state: &AppState, prompter: &mut Prompter<R, W>) -> Result<()> {
    let stats = collect_and_print(state, prompter)?;
    let dir = &state.config.report_dir;
    std::fs::create_dir_all(dir)?;
    ExportService::save_statistics_xlsx(&stats, &dir.join(WORKBOOK_FILE))?;
    ChartService::save_svg(&stats, &dir.join(CHART_FILE))
}

/// Prints the statistics and renders the PDF report.
#[instrument(skip_all)]
pub async fn run_report<R: BufRead, W: Write>(
    state: &AppState,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let stats = collect_and_print(state, prompter)?;
    write_pdf(state, &stats).await
}

/// Region variant: the profession series only counts vacancies from one area,
/// and salaries are priced with the monthly rate file.
#[instrument(skip_all)]
pub async fn run_region<R: BufRead, W: Write>(
    state: &AppState,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let stats = collect_region(state, prompter)?;
    write_pdf(state, &stats).await
}

/// Asks for file, profession and region and prints the monthly-rate statistics.
pub fn collect_region<R: BufRead, W: Write>(
    state: &AppState,
    prompter: &mut Prompter<R, W>,
) -> Result<Statistics> {
    let query = ask_stats(prompter, true)?;
    let rates_csv = &state.config.rates_csv;
    let rates = RateService::read_csv(rates_csv)
        .with_context(|| format!("Cannot read rate file {}", rates_csv.display()))?;
    let stats = StatsService::collect_monthly(&query, &rates)?;
    print_lines(prompter, StatsService::summary_lines(&stats))?;
    Ok(stats)
}

async fn write_pdf(state: &AppState, stats: &Statistics) -> Result<()> {
    let dir = &state.config.report_dir;
    tokio::fs::create_dir_all(dir).await?;
    ReportService::from_config(&state.config)?
        .write_pdf(stats, &dir.join(PDF_FILE))
        .await?;
    Ok(())
}
