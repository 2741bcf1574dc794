use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::{RateError, Result},
    provider::{RateProvider, RateSnapshot},
};

pub const DEFAULT_BASE_URL: &str = "http://data.fixer.io/api";
const DEFAULT_BASE_CURRENCY: &str = "EUR";

#[derive(Debug, Deserialize)]
struct FixerError {
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FixerResponse {
    success: bool,
    base: Option<String>,
    date: Option<NaiveDate>,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
    error: Option<FixerError>,
}

pub struct FixerClient {
    client: Client,
    base_url: String,
    access_key: String,
}

impl FixerClient {
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RateError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
        })
    }

    fn url(&self, date: Option<NaiveDate>) -> String {
        let endpoint = match date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "latest".to_string(),
        };
        format!("{}/{}?access_key={}", self.base_url, endpoint, self.access_key)
    }

    async fn load_json(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await.map_err(transport_error)?;
        if !resp.status().is_success() {
            return Err(RateError::ProviderUnavailable(format!(
                "Unexpected response status: {}",
                resp.status()
            )));
        }

        resp.text().await.map_err(transport_error)
    }
}

// reqwest puts the full URL, access key included, into its error messages.
fn transport_error(err: reqwest::Error) -> RateError {
    RateError::ProviderUnavailable(err.without_url().to_string())
}

fn into_snapshot(response: FixerResponse, requested: Option<NaiveDate>) -> Result<RateSnapshot> {
    if !response.success {
        let message = response
            .error
            .and_then(|error| error.info.or(error.kind))
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(RateError::ProviderRejected(message));
    }

    if response.rates.is_empty() {
        return Err(RateError::ProviderUnavailable(
            "Response contained no rates".to_string(),
        ));
    }

    let date = response
        .date
        .or(requested)
        .unwrap_or_else(|| Utc::now().date_naive());

    Ok(RateSnapshot {
        date,
        base: response
            .base
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string()),
        rates: response.rates,
    })
}

#[async_trait]
impl RateProvider for FixerClient {
    async fn fetch_rates(&self, date: Option<NaiveDate>) -> Result<RateSnapshot> {
        match date {
            Some(date) => debug!("Fetching exchange rates for {}", date),
            None => debug!("Fetching latest exchange rates"),
        }

        let text = self.load_json(&self.url(date)).await?;
        let response: FixerResponse = serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse rates response: {}", e);
            RateError::ProviderUnavailable(format!("Malformed rates response: {}", e))
        })?;

        let snapshot = into_snapshot(response, date)?;
        debug!(
            "Received {} rates against {} for {}",
            snapshot.rates.len(),
            snapshot.base,
            snapshot.date
        );

        Ok(snapshot)
    }
}
