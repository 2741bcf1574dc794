use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::{RateError, Result},
    provider::{RateProvider, RateSnapshot},
};

pub fn snapshot(date: NaiveDate, pairs: &[(&str, Decimal)]) -> RateSnapshot {
    RateSnapshot {
        date,
        base: "EUR".to_string(),
        rates: pairs
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect::<HashMap<_, _>>(),
    }
}

/// Replays queued responses in order, then reports the provider as unavailable.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<RateSnapshot>>>,
    requested: Mutex<Vec<Option<NaiveDate>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<RateSnapshot>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_dates(&self) -> Vec<Option<NaiveDate>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateProvider for ScriptedProvider {
    async fn fetch_rates(&self, date: Option<NaiveDate>) -> Result<RateSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(date);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RateError::ProviderUnavailable("script exhausted".into())))
    }
}
