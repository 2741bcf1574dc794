use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};
use uuid::Uuid;

use super::{RateStore, validate_range};
use crate::{
    error::Result,
    exchange_rate::{RatePoint, StoredRate},
};

pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        info!("Database schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn upsert_day(&self, date: NaiveDate, rates: &HashMap<String, Decimal>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM exchange_rates WHERE date = $1")
            .bind(date)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if !rates.is_empty() {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO exchange_rates (id, date, currency_code, rate) ");
            builder.push_values(rates.iter(), |mut row, (code, rate)| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(date)
                    .push_bind(code.clone())
                    .push_bind(*rate);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        debug!(
            "Replaced {} rows with {} rates for {}",
            removed,
            rates.len(),
            date
        );

        Ok(())
    }

    async fn query_range(
        &self,
        currency_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>> {
        validate_range(start, end)?;

        let points = sqlx::query_as::<_, RatePoint>(
            "SELECT date, rate FROM exchange_rates \
             WHERE currency_code = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY date",
        )
        .bind(currency_code)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(points)
    }

    async fn rates_for_day(&self, date: NaiveDate) -> Result<Vec<StoredRate>> {
        let rows = sqlx::query_as::<_, StoredRate>(
            "SELECT id, date, currency_code, rate FROM exchange_rates \
             WHERE date = $1 ORDER BY currency_code",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
