use std::sync::Arc;

use deadpool::managed::QueueMode;
use deadpool_redis::{Config as DeadpoolConfig, Pool, PoolConfig, Runtime, Timeouts};
use redis::AsyncCommands;

use crate::error::{ArtLensError, Result};

/// Redis connection manager
#[derive(Clone)]
pub struct RedisManager {
    pool: Arc<Pool>,
}

impl RedisManager {
    /// Create a new Redis manager with configuration
    pub async fn new_with_config(config: &crate::config::Config) -> Result<Self> {
        let redis_url = config.get_redis_url();

        tracing::info!(
            "Connecting to Redis at {}:{} (db: {})",
            config.redis.host,
            config.redis.port,
            config.redis.database
        );

        let mut cfg = DeadpoolConfig::from_url(&redis_url);
        cfg.pool = Some(PoolConfig {
            max_size: config.redis.pool.max_size,
            timeouts: Timeouts {
                wait: Some(config.get_pool_timeout()),
                create: Some(config.get_pool_timeout()),
                recycle: Some(config.get_pool_timeout()),
            },
            queue_mode: QueueMode::Fifo,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| ArtLensError::PoolCreation(e.to_string()))?;

        // Test the connection
        let mut conn = pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Redis connection established");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Store a value as a JSON string that expires after `ttl_seconds`
    pub async fn set_json_ex<T: serde::Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.get_connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, ttl_seconds).await?;
        Ok(())
    }

    /// Read a JSON string value, `None` if the key is absent or expired
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
            None => Ok(None),
        }
    }
}
