//! Background task that stores one rate snapshot per day.
//!
//! Each cycle moves `Idle -> Fetching -> Persisting -> Idle`, or through
//! `Failed` back to `Idle`. Failures are logged and left for the next
//! scheduled run; a missed day is not backfilled.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info};
use tokio::{sync::watch, task::JoinHandle};

use crate::{error::Result, provider::RateProvider, store::RateStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    DailyAtUtcMidnight,
    Every(Duration),
}

impl Cadence {
    pub fn delay_until_next_run(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Cadence::Every(interval) => *interval,
            Cadence::DailyAtUtcMidnight => {
                let next_midnight = now
                    .date_naive()
                    .succ_opt()
                    .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
                    .map(|midnight| midnight.and_utc());
                match next_midnight {
                    Some(next) => (next - now).to_std().unwrap_or(Duration::ZERO),
                    None => Duration::from_secs(24 * 60 * 60),
                }
            }
        }
    }
}

/// Sleeps for `delay`; `false` if shutdown was requested first.
async fn wait_for_next_run(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow_and_update() {
        return false;
    }

    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow_and_update() {
                    return false;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Idle,
    Fetching,
    Persisting,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub date: NaiveDate,
    pub stored: usize,
}

pub struct SyncScheduler {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn RateStore>,
    cadence: Cadence,
    sync_on_start: bool,
}

impl SyncScheduler {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<dyn RateStore>,
        cadence: Cadence,
    ) -> Self {
        Self {
            provider,
            store,
            cadence,
            sync_on_start: true,
        }
    }

    pub fn sync_on_start(mut self, enabled: bool) -> Self {
        self.sync_on_start = enabled;
        self
    }

    fn enter(&self, state: SyncState) {
        debug!("Rate sync state: {:?}", state);
    }

    /// Fetches today's latest rates and replaces today's stored snapshot.
    pub async fn run_cycle(&self) -> Result<SyncOutcome> {
        self.enter(SyncState::Fetching);
        let snapshot = self.provider.fetch_rates(None).await?;

        self.enter(SyncState::Persisting);
        let today = Utc::now().date_naive();
        self.store.upsert_day(today, &snapshot.rates).await?;

        Ok(SyncOutcome {
            date: today,
            stored: snapshot.rates.len(),
        })
    }

    async fn cycle(&self) {
        match self.run_cycle().await {
            Ok(outcome) => info!(
                "Successfully stored {} exchange rates for {}",
                outcome.stored, outcome.date
            ),
            Err(e) => {
                self.enter(SyncState::Failed);
                error!("Error occurred while syncing exchange rates: {}", e);
            }
        }
        self.enter(SyncState::Idle);
    }

    /// Runs until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if self.sync_on_start && !*shutdown.borrow_and_update() {
            self.cycle().await;
        }

        loop {
            let delay = self.cadence.delay_until_next_run(Utc::now());
            debug!("Next rate sync in {}s", delay.as_secs());

            if !wait_for_next_run(delay, &mut shutdown).await {
                info!("Rate sync scheduler stopped");
                return;
            }

            self.cycle().await;
        }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
