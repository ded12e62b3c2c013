pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod types;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{GatewayError, StoreError, UpstreamError};
pub use models::{AppState, FetchResult, RateLimitStatus};
