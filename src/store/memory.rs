use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RateStore, validate_range};
use crate::{
    error::Result,
    exchange_rate::{RatePoint, StoredRate},
};

/// In-memory store keyed by date, then currency code.
///
/// A whole day is swapped under the write lock, so readers see either the
/// previous snapshot or the new one.
#[derive(Default)]
pub struct MemoryRateStore {
    days: RwLock<BTreeMap<NaiveDate, BTreeMap<String, StoredRate>>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn upsert_day(&self, date: NaiveDate, rates: &HashMap<String, Decimal>) -> Result<()> {
        let day: BTreeMap<String, StoredRate> = rates
            .iter()
            .map(|(code, rate)| {
                let row = StoredRate {
                    id: Uuid::new_v4(),
                    date,
                    currency_code: code.clone(),
                    rate: *rate,
                };
                (code.clone(), row)
            })
            .collect();

        let mut days = self.days.write().await;
        debug!("Replacing {} rates for {}", day.len(), date);
        days.insert(date, day);
        Ok(())
    }

    async fn query_range(
        &self,
        currency_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>> {
        validate_range(start, end)?;

        let days = self.days.read().await;
        Ok(days
            .range(start..=end)
            .filter_map(|(_, day)| day.get(currency_code))
            .cloned()
            .map(RatePoint::from)
            .collect())
    }

    async fn rates_for_day(&self, date: NaiveDate) -> Result<Vec<StoredRate>> {
        let days = self.days.read().await;
        Ok(days
            .get(&date)
            .map(|day| day.values().cloned().collect())
            .unwrap_or_default())
    }
}
