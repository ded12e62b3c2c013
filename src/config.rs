use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3030";
pub const DEFAULT_LL_BASE_URL: &str = "https://ll.thespacedevs.com/2.2.0";
pub const DEFAULT_NEWS_BASE_URL: &str = "https://api.spaceflightnewsapi.net/v4";
pub const DEFAULT_ISS_BASE_URL: &str = "http://api.open-notify.org";
pub const RATE_LIMIT_CALLS: u32 = 15; // upstream free tier, calls per window
pub const RATE_LIMIT_WINDOW_SECS: u64 = 3600; // window size in seconds
pub const RATE_LIMIT_KEY: &str = "api_calls_count";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_LIMIT: u32 = 40;
pub const DEVELOPMENT_ENV: &str = "development";
pub const PRODUCTION_ENV: &str = "production";

/// Switches shared by the response cache and the rate limiter.
///
/// Built once at startup and handed to both constructors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Treat every cache read as a miss, drop every write and skip budget enforcement.
    pub bypass_enabled: bool,
}

impl CacheConfig {
    pub fn for_environment(environment: &str) -> Self {
        Self {
            bypass_enabled: environment == DEVELOPMENT_ENV,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_calls: u32,
    pub window: Duration,
    /// Re-assert the window expiry on every recorded call, so the window runs
    /// from the most recent call rather than the first one.
    pub extend_window_on_record: bool,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_calls: RATE_LIMIT_CALLS,
            window: Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
            extend_window_on_record: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamUrls {
    pub launch_library: String,
    pub news: String,
    pub iss: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            launch_library: DEFAULT_LL_BASE_URL.to_string(),
            news: DEFAULT_NEWS_BASE_URL.to_string(),
            iss: DEFAULT_ISS_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: String,
    pub bind_addr: String,
    pub redis_url: Option<String>,
    pub api_key: Option<String>,
    pub urls: UpstreamUrls,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitPolicy,
}

impl Settings {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| PRODUCTION_ENV.to_string());

        let urls = UpstreamUrls {
            launch_library: trimmed_url("LL_BASE_URL", DEFAULT_LL_BASE_URL),
            news: trimmed_url("SF_NEWS_BASE_URL", DEFAULT_NEWS_BASE_URL),
            iss: trimmed_url("ISS_BASE_URL", DEFAULT_ISS_BASE_URL),
        };

        let rate_limit = RateLimitPolicy {
            max_calls: parse_or("RATE_LIMIT_CALLS", RATE_LIMIT_CALLS),
            window: Duration::from_secs(parse_or("RATE_LIMIT_WINDOW_SECS", RATE_LIMIT_WINDOW_SECS)),
            extend_window_on_record: parse_or("RATE_LIMIT_EXTEND_ON_RECORD", true),
        };

        Self {
            cache: CacheConfig::for_environment(&environment),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            redis_url: non_empty("REDIS_URL"),
            api_key: non_empty("LL_API_KEY"),
            environment,
            urls,
            rate_limit,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION_ENV
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn trimmed_url(key: &str, default: &str) -> String {
    non_empty(key)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
