use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{CacheConfig, RateLimitPolicy, RATE_LIMIT_KEY};
use crate::errors::{StoreError, StoreResult};
use crate::models::RateLimitStatus;
use crate::store::KeyValueStore;

/// Shared budget of upstream calls per window, held in a single counter key.
///
/// `check` and `record` are separate store round trips, so two processes can
/// both see the last free slot and overshoot the budget slightly. That soft
/// limit is accepted; the counter itself is only ever changed with `INCR`.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    config: CacheConfig,
    policy: RateLimitPolicy,
    key: String,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            config,
            policy,
            key: RATE_LIMIT_KEY.to_string(),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Fails open: a store outage lets the call through.
    pub async fn check(&self) -> RateLimitStatus {
        if self.config.bypass_enabled {
            return RateLimitStatus::proceed(self.policy.max_calls);
        }

        match self.read_window().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Rate limit check failed, allowing call: {}", e);
                RateLimitStatus::proceed(1)
            }
        }
    }

    /// Counts one upstream call. Failures are logged and dropped.
    pub async fn record(&self) {
        if self.config.bypass_enabled {
            return;
        }

        match self.bump().await {
            Ok(count) => debug!(
                "Recorded upstream call {}/{} in current window",
                count, self.policy.max_calls
            ),
            Err(e) => warn!("Failed to record upstream call: {}", e),
        }
    }

    async fn read_window(&self) -> StoreResult<RateLimitStatus> {
        match self.store.get(&self.key).await? {
            None => {
                self.store.set_ex(&self.key, "0", self.policy.window).await?;
                Ok(RateLimitStatus::proceed(self.policy.max_calls))
            }
            Some(raw) => {
                let count: i64 = raw.trim().parse().map_err(|_| StoreError::Malformed {
                    key: self.key.clone(),
                    value: raw.clone(),
                })?;
                // A counter without expiry (INCR landed, EXPIRE did not) would never reset.
                if self.store.ttl(&self.key).await?.is_none() {
                    warn!("Call counter {} had no expiry, restarting its window", self.key);
                    self.store.expire(&self.key, self.policy.window).await?;
                }
                Ok(self.status_for(count))
            }
        }
    }

    async fn bump(&self) -> StoreResult<i64> {
        let count = self.store.incr(&self.key).await?;
        if count == 1 || self.policy.extend_window_on_record {
            self.store.expire(&self.key, self.policy.window).await?;
        }
        Ok(count)
    }

    fn status_for(&self, count: i64) -> RateLimitStatus {
        let limit = i64::from(self.policy.max_calls);
        RateLimitStatus {
            can_proceed: count < limit,
            remaining_calls: (limit - count).clamp(0, limit) as u32,
        }
    }
}
