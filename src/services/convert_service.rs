use crate::error::Result;
use crate::models::currency::{Currency, MonthKey, MonthlyRates};
use crate::models::stats::SalarySource;
use crate::models::vacancy::{parse_bound, Salary};
use crate::models::{field, RawRow};
use crate::services::loader_service::{RowPolicy, RowStream};
use rust_decimal::Decimal;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, instrument, warn};

pub const OUTPUT_HEADER: [&str; 4] = ["name", "salary", "area_name", "published_at"];

/// One converted output row.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedRow {
    pub name: String,
    pub salary: Option<Decimal>,
    pub area_name: String,
    pub published_at: String,
}

impl ConvertedRow {
    pub fn from_row(row: &RawRow, rates: &MonthlyRates) -> Result<Self> {
        let published_at = field(row, "published_at")?.to_string();
        Ok(Self {
            name: field(row, "name")?.to_string(),
            salary: convert_salary(row, &published_at, rates)?,
            area_name: field(row, "area_name")?.to_string(),
            published_at,
        })
    }
}

/// RUB salary for the publication month, or `None` when no rate applies or both
/// bounds are absent.
pub fn convert_salary(row: &RawRow, published_at: &str, rates: &MonthlyRates) -> Result<Option<Decimal>> {
    let code = field(row, "salary_currency")?;
    let currency = match code {
        "" => return Ok(None),
        "BYN" => Currency::Byr,
        code => match Currency::from_code(code) {
            Ok(currency) => currency,
            Err(_) => {
                debug!(code, "No rate for currency");
                return Ok(None);
            }
        },
    };
    let Some(rate) = rates.rate(MonthKey::parse(published_at)?, currency) else {
        return Ok(None);
    };

    let salary = Salary {
        from: parse_bound(row, "salary_from")?,
        to: parse_bound(row, "salary_to")?,
        currency,
        gross: false,
        rate,
    };
    Ok(salary.average_rub()?.map(|value| value.normalize()))
}

/// Lets the aggregator price each row with the rate of its publication month.
impl SalarySource for MonthlyRates {
    fn salary_rub(&self, row: &RawRow) -> Result<Option<Decimal>> {
        convert_salary(row, field(row, "published_at")?, self)
    }
}

pub struct ConvertService;

impl ConvertService {
    #[instrument(skip(rates, out), fields(file = %source.display()))]
    pub fn convert_file<W: Write>(
        source: &Path,
        rates: &MonthlyRates,
        row_limit: usize,
        out: W,
    ) -> Result<usize> {
        let stream = RowStream::open(source, RowPolicy::AllowEmpty)?;
        Self::convert(stream, rates, row_limit, out)
    }

    /// Writes at most `row_limit` converted rows and returns how many were written.
    pub fn convert<R: Read, W: Write>(
        stream: RowStream<R>,
        rates: &MonthlyRates,
        row_limit: usize,
        out: W,
    ) -> Result<usize> {
        if rates.is_empty() {
            warn!("Rate table is empty; only rouble salaries will convert");
        }
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(OUTPUT_HEADER)?;

        let mut written = 0;
        for row in stream.take(row_limit) {
            let converted = ConvertedRow::from_row(&row?, rates)?;
            let salary = converted
                .salary
                .map(|value| value.to_string())
                .unwrap_or_default();
            writer.write_record([
                converted.name.as_str(),
                salary.as_str(),
                converted.area_name.as_str(),
                converted.published_at.as_str(),
            ])?;
            written += 1;
        }
        writer.flush()?;

        debug!(written, "Salaries converted");
        Ok(written)
    }
}
