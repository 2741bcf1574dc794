use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use anyhow::{Context, Result};
use log::info;
use ratekeeper::{
    api,
    config::AppConfig,
    fixer::FixerClient,
    provider::RateProvider,
    query::QueryService,
    scheduler::SyncScheduler,
    store::{PgRateStore, RateStore},
};
use tokio::sync::watch;

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;

    let provider: Arc<dyn RateProvider> = Arc::new(FixerClient::new(
        &config.fixer_base_url,
        &config.fixer_api_key,
        config.provider_timeout,
    )?);

    let store = PgRateStore::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Can't connect to the database")?;
    store.migrate().await.context("Can't apply migrations")?;
    let store: Arc<dyn RateStore> = Arc::new(store);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = SyncScheduler::new(provider.clone(), store.clone(), config.sync_cadence)
        .sync_on_start(config.sync_on_start)
        .spawn(shutdown_rx);

    let service = web::Data::new(QueryService::new(provider, store));

    info!("Listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(service.clone())
            .configure(api::configure)
    })
    .bind(&config.bind_address)
    .with_context(|| format!("Can't bind to {}", config.bind_address))?
    .run()
    .await?;

    shutdown_tx.send(true).ok();
    scheduler.await.context("Rate sync scheduler panicked")?;

    Ok(())
}
