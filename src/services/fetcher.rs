use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::cache::ResponseCache;
use super::rate_limiter::RateLimiter;
use crate::errors::{GatewayError, UpstreamError};
use crate::models::FetchResult;
use crate::upstream::Upstream;

/// The one path every metered upstream read goes through.
///
/// A live cache entry is always served without spending budget. With the
/// budget exhausted only cached entries are served; otherwise a miss goes
/// upstream, and a successful response is cached and recorded.
pub struct Fetcher {
    cache: ResponseCache,
    rate_limiter: Arc<RateLimiter>,
    upstream: Arc<dyn Upstream>,
}

impl Fetcher {
    pub fn new(cache: ResponseCache, rate_limiter: Arc<RateLimiter>, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            cache,
            rate_limiter,
            upstream,
        }
    }

    pub async fn fetch<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        self.fetch_json(url).await.into()
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GatewayError> {
        let budget = self.rate_limiter.check().await;

        if !budget.can_proceed {
            return match self.cache.get(url).await {
                Some(stale) => {
                    info!("Call budget exhausted, serving cached {}", url);
                    Ok(stale)
                }
                None => {
                    warn!("Call budget exhausted and nothing cached for {}", url);
                    Err(GatewayError::RateLimitExceeded)
                }
            };
        }

        if let Some(cached) = self.cache.get(url).await {
            return Ok(cached);
        }

        info!(
            "Fetching {} from upstream ({} calls left in window)",
            url, budget.remaining_calls
        );
        let body = self.upstream.get_json(url).await.map_err(|e| {
            error!("Upstream request for {} failed: {}", url, e);
            GatewayError::Upstream(e)
        })?;

        // A 2xx response spent budget even when its body is not what we expect,
        // but only bodies that decode are worth caching.
        let data = match serde_json::from_value::<T>(body.clone()) {
            Ok(data) => data,
            Err(e) => {
                self.rate_limiter.record().await;
                error!("Upstream response for {} did not decode: {}", url, e);
                return Err(UpstreamError::Decode(e.to_string()).into());
            }
        };

        self.cache.put(url, &body, self.cache.classify(url)).await;
        self.rate_limiter.record().await;
        Ok(data)
    }

    /// Direct upstream read for unmetered APIs: no budget, no cache.
    pub async fn fetch_live<T: DeserializeOwned>(&self, url: &str) -> Result<T, GatewayError> {
        let body = self.upstream.get_json(url).await.map_err(|e| {
            error!("Upstream request for {} failed: {}", url, e);
            GatewayError::Upstream(e)
        })?;
        serde_json::from_value(body).map_err(|e| UpstreamError::Decode(e.to_string()).into())
    }
}
