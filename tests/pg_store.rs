//! Postgres-backed store checks.
//!
//! These need a disposable database and are ignored by default. Run them with
//! `DATABASE_URL=postgres://... cargo test --test pg_store -- --ignored`.

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use ratekeeper::{
    RateError,
    store::{PgRateStore, RateStore},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

async fn store() -> (PgRateStore, PgPool) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for Postgres tests");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .unwrap();
    let store = PgRateStore::new(pool.clone());
    store.migrate().await.unwrap();
    (store, pool)
}

fn rates(pairs: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
    pairs
        .iter()
        .map(|(code, rate)| (code.to_string(), *rate))
        .collect()
}

// Each test uses its own far-past year so tests can share one database.
fn day(year: i32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, d).unwrap()
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn upsert_day_replaces_previous_rows() {
    let (store, _) = store().await;
    let date = day(1901, 1);

    store
        .upsert_day(date, &rates(&[("USD", dec!(1.1)), ("GBP", dec!(0.9))]))
        .await
        .unwrap();
    store
        .upsert_day(date, &rates(&[("USD", dec!(1.2))]))
        .await
        .unwrap();

    let rows = store.rates_for_day(date).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].currency_code, "USD");
    assert_eq!(rows[0].rate, dec!(1.2));
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn rates_keep_full_decimal_precision() {
    let (store, _) = store().await;
    let date = day(1902, 1);

    store
        .upsert_day(date, &rates(&[("BTC", dec!(0.0000234567891234))]))
        .await
        .unwrap();

    let points = store.query_range("BTC", date, date).await.unwrap();
    assert_eq!(points[0].rate, dec!(0.0000234567891234));
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn query_range_is_ordered_and_bounded() {
    let (store, _) = store().await;
    for d in [12, 3, 1, 10, 5] {
        store
            .upsert_day(day(1903, d), &rates(&[("USD", Decimal::new(100 + d as i64, 2))]))
            .await
            .unwrap();
    }

    let points = store
        .query_range("USD", day(1903, 1), day(1903, 10))
        .await
        .unwrap();

    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    assert_eq!(
        dates,
        vec![day(1903, 1), day(1903, 3), day(1903, 5), day(1903, 10)]
    );
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn query_range_rejects_reversed_bounds() {
    let (store, _) = store().await;

    let result = store
        .query_range("USD", day(1904, 10), day(1904, 1))
        .await;

    assert!(matches!(result, Err(RateError::InvalidRange { .. })));
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn duplicate_date_and_currency_is_rejected() {
    let (store, pool) = store().await;
    let date = day(1905, 1);
    store
        .upsert_day(date, &rates(&[("USD", dec!(1.1))]))
        .await
        .unwrap();

    let result = sqlx::query(
        "INSERT INTO exchange_rates (id, date, currency_code, rate) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(date)
    .bind("USD")
    .bind(dec!(1.2))
    .execute(&pool)
    .await;

    let err = RateError::from(result.unwrap_err());
    assert!(matches!(
        &err,
        RateError::Storage(sqlx::Error::Database(db)) if db.is_unique_violation()
    ));
    let rows = store.rates_for_day(date).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rate, dec!(1.1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "needs DATABASE_URL"]
async fn readers_see_whole_snapshots_during_replacement() {
    let (store, _) = store().await;
    let store = Arc::new(store);
    let date = day(1906, 1);
    let old = rates(&[("USD", dec!(1.1)), ("GBP", dec!(1.1)), ("JPY", dec!(1.1))]);
    let new = rates(&[
        ("USD", dec!(2.2)),
        ("GBP", dec!(2.2)),
        ("CHF", dec!(2.2)),
        ("SEK", dec!(2.2)),
    ]);
    store.upsert_day(date, &old).await.unwrap();

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for i in 0..50 {
                let next = if i % 2 == 0 { &new } else { &old };
                store.upsert_day(date, next).await.unwrap();
            }
        })
    };

    let mut reads = 0;
    while !writer.is_finished() || reads == 0 {
        let rows = store.rates_for_day(date).await.unwrap();
        let whole_old = rows.len() == 3 && rows.iter().all(|r| r.rate == dec!(1.1));
        let whole_new = rows.len() == 4 && rows.iter().all(|r| r.rate == dec!(2.2));
        assert!(whole_old || whole_new, "torn snapshot: {:?}", rows);
        reads += 1;
    }
    writer.await.unwrap();
}
