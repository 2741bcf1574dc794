use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use crate::{
    conversion::convert,
    error::{RateError, Result},
    exchange_rate::RatePoint,
    provider::RateProvider,
    store::RateStore,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Serves conversions from provider snapshots and range lookups from the store.
pub struct QueryService {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn RateStore>,
}

impl QueryService {
    pub fn new(provider: Arc<dyn RateProvider>, store: Arc<dyn RateStore>) -> Self {
        Self { provider, store }
    }

    pub async fn convert(&self, request: &ConversionRequest) -> Result<Decimal> {
        self.convert_at(
            &request.from_currency,
            &request.to_currency,
            request.amount,
            request.date,
        )
        .await
    }

    pub async fn convert_live(&self, from: &str, to: &str, amount: Decimal) -> Result<Decimal> {
        self.convert_at(from, to, amount, None).await
    }

    pub async fn convert_historical(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Decimal> {
        self.convert_at(from, to, amount, Some(date)).await
    }

    async fn convert_at(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        date: Option<NaiveDate>,
    ) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(RateError::InvalidAmount(amount));
        }
        let (from, to) = (normalize_code(from), normalize_code(to));

        let snapshot = self.provider.fetch_rates(date).await?;
        let from_rate = snapshot.rate(&from)?;
        let to_rate = snapshot.rate(&to)?;

        let result = convert(from_rate, to_rate, amount)?;
        debug!(
            "Converted {} {} to {} {} using rates of {}",
            amount, from, result, to, snapshot.date
        );
        Ok(result)
    }

    /// Stored rates for `currency_code` within `[start, end]`; no rows is `NotFound`.
    pub async fn get_range(
        &self,
        currency_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>> {
        let currency = normalize_code(currency_code);
        let points = self.store.query_range(&currency, start, end).await?;
        if points.is_empty() {
            return Err(RateError::NotFound {
                currency,
                start,
                end,
            });
        }
        Ok(points)
    }
}
