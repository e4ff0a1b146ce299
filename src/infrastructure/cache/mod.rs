pub mod cache_keys;
pub mod in_memory;

use async_trait::async_trait;
use std::time::Duration;

use crate::core::errors::LoopMeetError;

/// String-keyed cache of JSON values with per-entry TTL and explicit
/// invalidation. No eviction policy of its own.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, LoopMeetError>;
    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<(), LoopMeetError>;
    async fn remove(&self, key: &str) -> Result<(), LoopMeetError>;
}
