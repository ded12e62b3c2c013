//! Key-value store port shared by the response cache and the rate limiter.
//!
//! Both components only need five commands, modelled on Redis: `GET`, `SET`,
//! `EXPIRE`, `TTL` and `INCR`. Any store that increments atomically can back them.

mod memory;
mod redis;


use async_trait::async_trait;
use std::time::Duration;

use crate::errors::StoreResult;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value`, clearing any expiry previously set on `key`.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Sets the time-to-live of an existing key. Absent keys are left absent.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()>;

    /// Remaining time-to-live, or `None` when the key is absent or never expires.
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Atomically increments the integer at `key`, creating it at 1 when absent.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.set(key, value).await?;
        self.expire(key, ttl).await
    }
}
