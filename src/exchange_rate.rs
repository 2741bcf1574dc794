use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// One row of the `exchange_rates` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredRate {
    pub id: Uuid,
    pub date: NaiveDate,
    pub currency_code: String,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RatePoint {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub rate: Decimal,
}

impl From<StoredRate> for RatePoint {
    fn from(stored: StoredRate) -> Self {
        Self {
            date: stored.date,
            rate: stored.rate,
        }
    }
}
