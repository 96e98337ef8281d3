use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bundlepay_web::api::{self, AppState};
use bundlepay_web::config::Config;
use bundlepay_web::payments::BackendClient;
use bundlepay_web::storage::{KeyValueStore, MemoryStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[cfg(feature = "cache")]
async fn session_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    use bundlepay_web::storage::{RedisStore, RedisStoreConfig};

    let Some(redis_url) = config.session.redis_url.clone() else {
        tracing::info!("REDIS_URL not set, keeping sessions in memory");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let store = RedisStore::connect(&RedisStoreConfig {
        redis_url,
        session_ttl: config.session.ttl,
        ..Default::default()
    })
    .await
    .context("Failed to connect to Redis session store")?;
    tracing::info!("Sessions stored in Redis");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "cache"))]
async fn session_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    if config.session.redis_url.is_some() {
        tracing::warn!("REDIS_URL ignored, built without the cache feature");
    }
    Ok(Arc::new(MemoryStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;

    tracing::info!("Starting BundlePay web");
    tracing::info!("Environment: {}", config.server.environment);
    tracing::info!("Backend API: {}", config.backend.base_url);

    let api = BackendClient::new(config.backend.clone())
        .context("Failed to build backend API client")?;
    let store = session_store(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.host))?;

    let app = api::router(AppState::new(config, Arc::new(api), store));

    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
