use crate::commands::{print_lines, ASK_FILE};
use crate::error::Result;
use crate::services::convert_service::ConvertService;
use crate::services::rate_service::{CbrClient, RateService};
use crate::utils::prompt::Prompter;
use crate::AppState;
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::instrument;

pub const CONVERTED_FILE: &str = "vac_dif_curr.csv";

/// Builds the monthly rate file for every publication month of a vacancy file.
#[instrument(skip_all)]
pub async fn run_rates<R: BufRead, W: Write>(
    state: &AppState,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let file_name = prompter.ask(ASK_FILE)?;
    let months = RateService::collect_months(Path::new(&file_name))?;

    let client = CbrClient::with_client(state.http_client.clone(), state.config.cbr_daily_url.clone());
    let table = RateService::fetch_monthly(&client, &months).await?;
    RateService::write_csv(&state.config.rates_csv, &table)?;

    print_lines(
        prompter,
        [format!(
            "Курсы за {} мес. сохранены в {}",
            table.len(),
            state.config.rates_csv.display()
        )],
    )
}

/// Converts salaries to roubles with the monthly rate file.
#[instrument(skip_all)]
pub fn run_convert<R: BufRead, W: Write>(state: &AppState, prompter: &mut Prompter<R, W>) -> Result<()> {
    let file_name = prompter.ask(ASK_FILE)?;
    let rates_csv = &state.config.rates_csv;
    let table = RateService::read_csv(rates_csv)
        .with_context(|| format!("Cannot read rate file {}", rates_csv.display()))?;

    let dir = &state.config.report_dir;
    std::fs::create_dir_all(dir)?;
    let out_path = dir.join(CONVERTED_FILE);
    let written = ConvertService::convert_file(
        Path::new(&file_name),
        &table,
        state.config.convert_row_limit,
        BufWriter::new(File::create(&out_path)?),
    )?;

    print_lines(
        prompter,
        [format!("Записано строк: {} ({})", written, out_path.display())],
    )
}
