mod cache;
mod fetcher;
mod rate_limiter;
pub mod space;
pub mod ttl;


pub use cache::ResponseCache;
pub use fetcher::Fetcher;
pub use rate_limiter::RateLimiter;
pub use space::{LaunchListQuery, PageQuery, SpaceApi, UpcomingQuery, VehicleQuery};
pub use ttl::classify;
