use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{CacheConfig, RateLimitPolicy, UpstreamUrls};
use crate::errors::GatewayError;
use crate::services::{Fetcher, RateLimiter, ResponseCache, SpaceApi};
use crate::store::KeyValueStore;
use crate::upstream::Upstream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub can_proceed: bool,
    pub remaining_calls: u32,
}

impl RateLimitStatus {
    pub fn proceed(remaining_calls: u32) -> Self {
        Self {
            can_proceed: true,
            remaining_calls,
        }
    }
}

/// What every resource fetch hands back: exactly one of `data` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> FetchResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T, GatewayError>> for FetchResult<T> {
    fn from(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(data) => FetchResult::ok(data),
            Err(e) => FetchResult::err(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub space: Arc<SpaceApi>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wires the cache and the rate limiter onto one shared store.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        upstream: Arc<dyn Upstream>,
        cache_config: CacheConfig,
        policy: RateLimitPolicy,
        urls: UpstreamUrls,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(store.clone(), cache_config, policy));
        let cache = ResponseCache::new(store, cache_config);
        let fetcher = Fetcher::new(cache, rate_limiter.clone(), upstream);
        Self {
            space: Arc::new(SpaceApi::new(fetcher, urls)),
            rate_limiter,
        }
    }
}
