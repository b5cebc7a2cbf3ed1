pub mod commands;
pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::models::currency::CurrencyRates;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs, built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub rates: Arc<CurrencyRates>,
    pub http_client: Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            config,
            rates: Arc::new(CurrencyRates::fixed()),
            http_client,
        })
    }
}
