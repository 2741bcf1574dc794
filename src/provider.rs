use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{RateError, Result};

/// Rates for one day, each expressed against `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub date: NaiveDate,
    pub base: String,
    pub rates: HashMap<String, Decimal>,
}

impl RateSnapshot {
    pub fn rate(&self, currency_code: &str) -> Result<Decimal> {
        self.rates
            .get(currency_code)
            .copied()
            .ok_or_else(|| RateError::UnknownCurrency(currency_code.to_string()))
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Latest rates when `date` is `None`, otherwise the historical snapshot for that day.
    async fn fetch_rates(&self, date: Option<NaiveDate>) -> Result<RateSnapshot>;
}
