mod cache_store;
mod session;

pub use self::cache_store::CacheStore;
pub use self::session::{Session, SessionStore};

use crate::abstract_trait::DynCacheStore;
use chrono::Duration;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, warn};

pub async fn get_from_cache<T>(cache: &DynCacheStore, key: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    let data = cache.get_raw(key).await;

    match data {
        Some(data) => match serde_json::from_str::<T>(&data) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                error!(
                    "Failed to deserialize cached value for key '{}': {:?}",
                    key, e
                );
                None
            }
        },
        None => {
            warn!("Cache miss for key: {key}");
            None
        }
    }
}

pub async fn set_to_cache<T>(cache: &DynCacheStore, key: &str, data: &T, expiration: Duration)
where
    T: Serialize,
{
    match serde_json::to_string(data) {
        Ok(json) => cache.set_raw(key, json, expiration).await,
        Err(e) => error!("Failed to serialize data for key '{}': {:?}", key, e),
    }
}
