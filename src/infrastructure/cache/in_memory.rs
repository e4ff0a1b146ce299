use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::core::errors::LoopMeetError;
use crate::infrastructure::cache::Cache;

#[derive(Clone, Default)]
pub struct InMemoryCache {
    cache: Arc<RwLock<HashMap<String, (serde_json::Value, chrono::DateTime<chrono::Utc>)>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, LoopMeetError> {
        let mut cache = self.cache.write().await;
        let expired = match cache.get(key) {
            Some((value, expires_at)) => {
                if *expires_at > chrono::Utc::now() {
                    return Ok(Some(value.clone()));
                }
                true
            }
            None => false,
        };
        if expired {
            cache.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<(), LoopMeetError> {
        let mut cache = self.cache.write().await;
        let expires_at = chrono::Utc::now()
            + chrono::Duration::from_std(ttl)
                .map_err(|e| LoopMeetError::CacheError(format!("Failed to convert TTL: {}", e)))?;
        cache.insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LoopMeetError> {
        let mut cache = self.cache.write().await;
        cache.remove(key);
        Ok(())
    }
}
