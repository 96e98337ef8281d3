//! Redis-backed session store
//!
//! Values are written with a TTL that is refreshed on every read, so an
//! active browser session never loses its token or pending purchase. Like the
//! rest of the page layer, the store degrades gracefully: when Redis is
//! unreachable reads behave as misses and writes are dropped with a warning.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, error, info, warn};

use super::{
    error::{StoreError, StoreResult},
    KeyValueStore,
};

pub type RedisPool = Pool<RedisConnectionManager>;

type RedisConnection<'a> = PooledConnection<'a, RedisConnectionManager>;

#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    pub redis_url: String,
    pub max_connections: u32,
    pub min_idle: u32,
    pub connection_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    pub session_ttl: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 20,
            min_idle: 2,
            connection_timeout: Duration::from_secs(5),
            max_lifetime: Duration::from_secs(300),
            idle_timeout: Duration::from_secs(60),
            session_ttl: Duration::from_secs(86_400),
        }
    }
}

pub async fn init_pool(config: &RedisStoreConfig) -> StoreResult<RedisPool> {
    info!(
        "Initializing Redis session pool: max_connections={}, redis_url={}",
        config.max_connections, config.redis_url
    );

    let manager = RedisConnectionManager::new(config.redis_url.clone()).map_err(|e| {
        error!("Failed to create Redis connection manager: {}", e);
        StoreError::ConnectionError(e.to_string())
    })?;

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(config.min_idle)
        .connection_timeout(config.connection_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .test_on_check_out(false)
        .build(manager)
        .await
        .map_err(|e| {
            error!("Failed to build Redis connection pool: {}", e);
            StoreError::ConnectionError(e.to_string())
        })?;

    if let Err(e) = ping(&pool).await {
        warn!(
            "Initial Redis connection test failed, but continuing: {}",
            e
        );
    }

    info!("Redis session pool initialized successfully");
    Ok(pool)
}

async fn ping(pool: &RedisPool) -> StoreResult<()> {
    let mut conn = pool.get().await?;
    let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
    Ok(())
}

pub struct RedisStore {
    pool: RedisPool,
    ttl: Duration,
}

impl RedisStore {
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    pub async fn connect(config: &RedisStoreConfig) -> StoreResult<Self> {
        let pool = init_pool(config).await?;
        Ok(Self::new(pool, config.session_ttl))
    }

    pub async fn health_check(&self) -> StoreResult<()> {
        ping(&self.pool).await
    }

    async fn connection(&self) -> StoreResult<RedisConnection<'_>> {
        self.pool.get().await.map_err(|e| {
            warn!("Failed to get Redis connection: {}", e);
            e.into()
        })
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(_) => return Ok(None),
        };

        let value: Option<String> = conn.get(key).await.map_err(|e| {
            warn!("Redis GET failed for key '{}': {}", key, e);
            e
        })?;

        match value {
            Some(value) => {
                let ttl = self.ttl_secs() as i64;
                let _: redis::RedisResult<bool> = conn.expire(key, ttl).await;
                debug!("Session hit for key: {}", key);
                Ok(Some(value))
            }
            None => {
                debug!("Session miss for key: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(_) => return Ok(()),
        };

        let _: () = conn
            .set_ex(key, value, self.ttl_secs())
            .await
            .map_err(|e| {
                warn!("Redis SET_EX failed for key '{}': {}", key, e);
                e
            })?;

        debug!("Session set for key: {} (ttl: {:?})", key, self.ttl);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<bool> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(_) => return Ok(false),
        };

        let removed: i32 = conn.del(key).await.map_err(|e| {
            warn!("Redis DEL failed for key '{}': {}", key, e);
            e
        })?;

        Ok(removed > 0)
    }
}
