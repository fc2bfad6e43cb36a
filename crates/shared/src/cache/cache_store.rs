use crate::abstract_trait::CacheStoreTrait;
use async_trait::async_trait;
use chrono::Duration;
use deadpool_redis::{Connection, Pool, redis};
use tracing::{debug, error};

#[derive(Clone)]
pub struct CacheStore {
    redis_pool: Pool,
}

impl CacheStore {
    pub fn new(redis_pool: Pool) -> Self {
        Self { redis_pool }
    }

    async fn get_conn(&self) -> Option<Connection> {
        match self.redis_pool.get().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                error!("Failed to get Redis pooled connection: {:?}", e);
                None
            }
        }
    }
}

#[async_trait]
impl CacheStoreTrait for CacheStore {
    async fn get_raw(&self, key: &str) -> Option<String> {
        let mut conn = self.get_conn().await?;
        let result: redis::RedisResult<Option<String>> =
            redis::cmd("GET").arg(key).query_async(&mut conn).await;

        match result {
            Ok(value) => value,
            Err(e) => {
                error!("Redis get error for key '{}': {:?}", key, e);
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: String, expiration: Duration) {
        if let Some(mut conn) = self.get_conn().await {
            let result: redis::RedisResult<()> = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(expiration.num_seconds().max(1))
                .query_async(&mut conn)
                .await;

            match result {
                Ok(_) => debug!("Cached key '{}' with TTL {:?}", key, expiration),
                Err(e) => error!("Failed to set cache key '{}': {:?}", key, e),
            }
        }
    }

    async fn delete_from_cache(&self, key: &str) {
        if let Some(mut conn) = self.get_conn().await
            && let Err(e) = redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut conn)
                .await
        {
            error!("Failed to delete key '{}': {:?}", key, e);
        }
    }
}
