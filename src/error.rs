use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Rate provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Rate provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(Decimal),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Start date {start} must be before or equal to end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No rates found for {currency} between {start} and {end}")]
    NotFound {
        currency: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, RateError>;
