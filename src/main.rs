use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use marquee_api::api::{create_router, AppState};
use marquee_api::cache::MetadataCache;
use marquee_api::config::Config;
use marquee_api::services::providers::tmdb::TmdbProvider;
use marquee_api::services::RecommendationEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let cache = Arc::new(MetadataCache::new(config.cache_capacity));
    let provider = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
    ));

    // Artifact problems are fatal: never serve queries over a missing or
    // misaligned catalog.
    let engine = RecommendationEngine::load(&config, provider)?;
    tracing::info!(
        titles = engine.catalog().len(),
        "Catalog and feature index loaded"
    );

    let state = AppState::new(engine);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
