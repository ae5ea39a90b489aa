//! Locus Server - location reviews with live weather

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locus_server::{
    config::{AppConfig, CacheBackend, StorageBackend},
    create_router,
    repository::Repository,
    services::{
        object_store::S3ObjectStore,
        redis::RedisService,
        weather::{DurableCache, FastCache, MemoryCache, MemoryObjectStore, OpenWeatherClient},
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("locus_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Locus Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    // Fast cache tier
    let fast_cache: Arc<dyn FastCache> = match config.cache.backend {
        CacheBackend::Redis => {
            let redis = RedisService::new(&config.cache.redis_url)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Connected to Redis");
            Arc::new(redis)
        }
        CacheBackend::Memory => {
            tracing::warn!("Using in-process fast cache");
            Arc::new(MemoryCache::new())
        }
    };

    // Durable cache tier
    let durable_cache: Arc<dyn DurableCache> = match config.storage.backend {
        StorageBackend::S3 => Arc::new(S3ObjectStore::new(&config.storage).await),
        StorageBackend::Memory => {
            tracing::warn!("Using in-process durable cache");
            Arc::new(MemoryObjectStore::new())
        }
    };

    if config.weather.api_key.is_empty() {
        tracing::warn!("No weather API key configured, upstream requests will be rejected");
    }
    let upstream = Arc::new(
        OpenWeatherClient::new(&config.weather).context("Failed to create weather client")?,
    );

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config, fast_cache, durable_cache, upstream);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().context("Invalid host address")?,
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
