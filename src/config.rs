use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub report_dir: PathBuf,
    pub rates_csv: PathBuf,
    pub cbr_daily_url: String,
    pub wkhtmltopdf_bin: String,
    pub pdf_template: Option<PathBuf>,
    pub partition_dir: PathBuf,
    pub worker_pool_size: usize,
    pub convert_row_limit: usize,
    pub http_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let default_pool = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        let config = Self {
            report_dir: PathBuf::from(get_env_or("REPORT_DIR", ".")),
            rates_csv: PathBuf::from(get_env_or("RATES_CSV", "curr.csv")),
            cbr_daily_url: get_env_or("CBR_DAILY_URL", "https://www.cbr.ru/scripts/XML_daily.asp"),
            wkhtmltopdf_bin: get_env_or("WKHTMLTOPDF_BIN", "wkhtmltopdf"),
            pdf_template: env::var("PDF_TEMPLATE").ok().map(PathBuf::from),
            partition_dir: PathBuf::from(get_env_or("PARTITION_DIR", "new_csv_files")),
            worker_pool_size: get_env_parse_or("WORKER_POOL_SIZE", default_pool)?,
            convert_row_limit: get_env_parse_or("CONVERT_ROW_LIMIT", 100)?,
            http_timeout_secs: get_env_parse_or("HTTP_TIMEOUT_SECS", 30)?,
        };

        if config.worker_pool_size == 0 {
            return Err(Error::Config("WORKER_POOL_SIZE must be at least 1".to_string()));
        }

        Ok(config)
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
