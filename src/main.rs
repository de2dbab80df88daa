use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use catalog_api::{
    config::Config,
    db::{create_pool, run_migrations},
    routes::{create_router, AppState},
    store::SqliteCatalogStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let store = Arc::new(SqliteCatalogStore::new(pool));
    let state = Arc::new(AppState::new(store, &config));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        addr = %addr,
        mode = ?config.recommendation_mode,
        seeded = config.recommendation_seed.is_some(),
        "Server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
