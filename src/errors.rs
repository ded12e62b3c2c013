use thiserror::Error;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Try again later.";

/// Errors that reach callers of the fetch layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimitExceeded,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl warp::reject::Reject for GatewayError {}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Unexpected response from upstream: {0}")]
    Decode(String),
}

/// Failures of the shared key-value store. Absorbed by the cache and the
/// rate limiter; never surfaced past them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("value at {key} is not an integer: {value}")]
    Malformed { key: String, value: String },
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
