//! cleanroute optimizer server

use cleanroute_api::build_router;
use cleanroute_api::state::AppState;
use cleanroute_config::AppConfig;
use cleanroute_storage::{create_pool, PostgresStore};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting cleanroute optimizer server");

    let config = AppConfig::from_env()?;
    tracing::info!(bind_address = %config.bind_address, "binding");

    let pool = create_pool(&config.database_url).await?;
    let store = PostgresStore::new(pool);
    store.migrate().await?;

    let state = Arc::new(AppState { store, config: config.clone(), start_time: Instant::now() });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
