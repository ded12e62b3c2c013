use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::KeyValueStore;
use crate::errors::{StoreError, StoreResult};

/// New keys written between sweeps of expired entries.
pub(crate) const SWEEP_EVERY: usize = 128;

struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-process store with Redis-like expiry semantics.
///
/// Only coordinates the tasks of a single process. Expiry is measured on the
/// tokio clock, so a paused runtime can advance it deterministically.
/// Expired keys are dropped when read, and swept in bulk every
/// [`SWEEP_EVERY`] inserts so keys that are never read again do not pile up.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
    inserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Entries held in the map, expired or not.
    #[cfg(test)]
    pub(crate) async fn raw_len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn insert(&self, entries: &mut HashMap<String, StoredValue>, key: &str, value: StoredValue) {
        let previous = entries.insert(key.to_string(), value);
        if previous.is_none() && (self.inserts.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0 {
            let now = Instant::now();
            entries.retain(|_, entry| entry.is_live(now));
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it now rather than waiting for the next sweep.
        let mut entries = self.entries.write().await;
        if entries.get(key).map_or(false, |entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        self.insert(
            &mut entries,
            key,
            StoredValue {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = Some(now + ttl);
            }
            Some(_) => {
                entries.remove(key);
            }
            None => {}
        }
        Ok(())
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at - now))
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.get_mut(key).filter(|entry| entry.is_live(now)) {
            let current: i64 = entry.value.parse().map_err(|_| StoreError::Malformed {
                key: key.to_string(),
                value: entry.value.clone(),
            })?;
            let next = current + 1;
            entry.value = next.to_string();
            return Ok(next);
        }

        self.insert(
            &mut entries,
            key,
            StoredValue {
                value: "1".to_string(),
                expires_at: None,
            },
        );
        Ok(1)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        self.insert(
            &mut entries,
            key,
            StoredValue {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }
}
