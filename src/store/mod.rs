//! Persisted daily rate snapshots, unique per (date, currency code).

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::{RateError, Result},
    exchange_rate::{RatePoint, StoredRate},
};

pub use memory::MemoryRateStore;
pub use postgres::PgRateStore;

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Replaces every row for `date` with `rates` in one atomic step.
    async fn upsert_day(&self, date: NaiveDate, rates: &HashMap<String, Decimal>) -> Result<()>;

    /// Rates for `currency_code` within `[start, end]`, ascending by date.
    /// An empty result is not an error.
    async fn query_range(
        &self,
        currency_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>>;

    /// Diagnostic read: every stored row for `date`, ordered by currency code.
    /// Not used on the conversion or range paths.
    async fn rates_for_day(&self, date: NaiveDate) -> Result<Vec<StoredRate>>;
}

pub(crate) fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(RateError::InvalidRange { start, end });
    }
    Ok(())
}
