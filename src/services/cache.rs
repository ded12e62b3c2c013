use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::ttl;
use crate::config::CacheConfig;
use crate::store::KeyValueStore;

/// Upstream responses keyed by their full request URL.
///
/// An optimisation only: every store failure degrades to a miss on read and
/// to a dropped write, and is logged rather than returned.
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    config: CacheConfig,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        if self.config.bypass_enabled {
            return None;
        }

        match self.store.get(url).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Cache HIT for {}", url);
                    Some(value)
                }
                Err(e) => {
                    warn!("Discarding cached entry for {} that no longer decodes: {}", url, e);
                    None
                }
            },
            Ok(None) => {
                debug!("Cache MISS for {}", url);
                None
            }
            Err(e) => {
                warn!("Cache lookup for {} failed, treating as miss: {}", url, e);
                None
            }
        }
    }

    /// Stores `response` under `url`, replacing any previous entry and restarting its TTL.
    pub async fn put<T: Serialize + ?Sized>(&self, url: &str, response: &T, ttl: Duration) {
        if self.config.bypass_enabled {
            return;
        }

        let raw = match serde_json::to_string(response) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Not caching {}: {}", url, e);
                return;
            }
        };

        match self.store.set_ex(url, &raw, ttl).await {
            Ok(()) => debug!("Cached {} for {}s", url, ttl.as_secs()),
            Err(e) => warn!("Failed to cache {}: {}", url, e),
        }
    }

    pub fn classify(&self, url: &str) -> Duration {
        ttl::classify(url)
    }
}
