pub mod api;
pub mod config;
pub mod conversion;
pub mod error;
pub mod exchange_rate;
pub mod fixer;
pub mod provider;
pub mod query;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use error::{RateError, Result};
