use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

pub type DynCacheStore = Arc<dyn CacheStoreTrait + Send + Sync>;

/// String-valued key store with expiry. Typed access goes through
/// `cache::get_from_cache` / `cache::set_to_cache`.
#[async_trait]
pub trait CacheStoreTrait {
    async fn get_raw(&self, key: &str) -> Option<String>;
    async fn set_raw(&self, key: &str, value: String, expiration: Duration);
    async fn delete_from_cache(&self, key: &str);
}
