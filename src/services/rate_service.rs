use crate::error::{Error, Result};
use crate::models::currency::{Currency, MonthKey, MonthlyRates};
use crate::models::field;
use crate::services::loader_service::{RowPolicy, RowStream};
use crate::utils::time::from_published;
use chrono::Datelike;
use reqwest::Client;
use rust_decimal::Decimal;
use select::document::Document;
use select::predicate::Name;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// Currencies occurring more often than this are reported by the month scan.
pub const FREQUENT_CURRENCY_MIN: usize = 5000;

/// Source of the central bank's daily rate documents.
pub trait RateSource {
    fn daily_xml(&self, month: MonthKey) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Clone)]
pub struct CbrClient {
    client: Client,
    base_url: String,
}

impl CbrClient {
    /// Reuses the shared client so its timeout applies to rate requests.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl RateSource for CbrClient {
    async fn daily_xml(&self, month: MonthKey) -> Result<String> {
        let url = url::Url::parse_with_params(
            &self.base_url,
            &[("date_req", month.request_date())],
        )
        .map_err(|e| Error::Config(format!("Invalid CBR_DAILY_URL: {}", e)))?;
        debug!(%url, "Requesting daily rates");

        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Reads `Value / Nominal` for the monthly currencies from one daily document.
pub fn parse_daily_rates(xml: &str) -> Result<HashMap<Currency, Decimal>> {
    let document = Document::from(xml);
    let mut rates = HashMap::new();

    for valute in document.find(Name("valute")) {
        let text = |name: &str| {
            valute
                .find(Name(name))
                .next()
                .map(|node| node.text().trim().to_string())
        };
        let code = match text("charcode").as_deref() {
            Some("BYN") | Some("BYR") => Currency::Byr,
            Some(code) => match Currency::from_code(code) {
                Ok(currency) if Currency::MONTHLY.contains(&currency) => currency,
                _ => continue,
            },
            None => continue,
        };

        let nominal = text("nominal").unwrap_or_default();
        let value = text("value").unwrap_or_default();
        let nominal = Decimal::from_str(&nominal)
            .map_err(|_| Error::invalid_number("Nominal", &nominal))?;
        let value = Decimal::from_str(&value.replace(',', "."))
            .map_err(|_| Error::invalid_number("Value", &value))?;
        if nominal.is_zero() {
            return Err(Error::invalid_number("Nominal", "0"));
        }
        rates.insert(code, (value / nominal).normalize());
    }

    Ok(rates)
}

/// A row of the monthly rate file.
#[derive(Debug, Deserialize)]
struct RateRow {
    date: String,
    #[serde(rename = "BYR")]
    byr: Option<String>,
    #[serde(rename = "USD")]
    usd: Option<String>,
    #[serde(rename = "EUR")]
    eur: Option<String>,
    #[serde(rename = "KZT")]
    kzt: Option<String>,
    #[serde(rename = "UAH")]
    uah: Option<String>,
}

impl RateRow {
    fn into_rates(self) -> Result<(MonthKey, HashMap<Currency, Decimal>)> {
        let month = MonthKey::parse(&self.date)?;
        let cells = [
            (Currency::Byr, self.byr),
            (Currency::Usd, self.usd),
            (Currency::Eur, self.eur),
            (Currency::Kzt, self.kzt),
            (Currency::Uah, self.uah),
        ];
        let mut rates = HashMap::new();
        for (currency, cell) in cells {
            let Some(cell) = cell.filter(|c| !c.trim().is_empty()) else {
                continue;
            };
            let rate = Decimal::from_str(cell.trim())
                .or_else(|_| Decimal::from_scientific(cell.trim()))
                .map_err(|_| Error::invalid_number(currency.code(), &cell))?;
            rates.insert(currency, rate);
        }
        Ok((month, rates))
    }
}

pub struct RateService;

impl RateService {
    /// Distinct UTC publication months of a vacancy file, in date order.
    #[instrument(fields(file = %path.display()))]
    pub fn collect_months(path: &Path) -> Result<BTreeSet<MonthKey>> {
        let mut months = BTreeSet::new();
        let mut currencies: HashMap<String, usize> = HashMap::new();

        for row in RowStream::open(path, RowPolicy::AllowEmpty)? {
            let row = row?;
            let published = from_published(field(&row, "published_at")?)?;
            months.insert(MonthKey::new(published.year(), published.month())?);

            let currency = field(&row, "salary_currency")?;
            if !currency.is_empty() {
                *currencies.entry(currency.to_string()).or_default() += 1;
            }
        }

        let mut frequent: Vec<(String, usize)> = currencies
            .into_iter()
            .filter(|(_, count)| *count > FREQUENT_CURRENCY_MIN)
            .collect();
        frequent.sort_by(|a, b| b.1.cmp(&a.1));
        info!(?frequent, months = months.len(), "Currency frequencies");

        Ok(months)
    }

    /// Requests one daily document per month, sequentially.
    pub async fn fetch_monthly<S: RateSource>(
        source: &S,
        months: &BTreeSet<MonthKey>,
    ) -> Result<MonthlyRates> {
        let mut table = MonthlyRates::new();
        for month in months {
            let xml = source.daily_xml(*month).await?;
            let rates = parse_daily_rates(&xml)?;
            debug!(%month, currencies = rates.len(), "Rates fetched");
            table.insert(*month, rates);
        }
        Ok(table)
    }

    /// Writes `date,BYR,USD,EUR,KZT,UAH`; missing rates stay empty.
    pub fn write_csv(path: &Path, table: &MonthlyRates) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec!["date"];
        header.extend(Currency::MONTHLY.iter().map(Currency::code));
        writer.write_record(&header)?;

        for (month, rates) in table.months() {
            let mut record = vec![month.to_string()];
            record.extend(Currency::MONTHLY.iter().map(|currency| {
                rates
                    .get(currency)
                    .map(|rate| rate.normalize().to_string())
                    .unwrap_or_default()
            }));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<MonthlyRates> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut table = MonthlyRates::new();
        for row in reader.deserialize::<RateRow>() {
            let (month, rates) = row?.into_rates()?;
            table.insert(month, rates);
        }
        debug!(months = table.len(), "Rate table loaded");
        Ok(table)
    }
}
