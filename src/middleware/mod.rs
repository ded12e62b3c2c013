use hyper::{HeaderMap, header::{HeaderName, HeaderValue}};
use tracing::info;


pub fn add_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("Content-Type"),
    );
}

pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    add_cors_headers(&mut headers);
    headers
}

/// Access log line per request: method, path, status and latency.
pub fn request_log() -> warp::log::Log<impl Fn(warp::log::Info<'_>) + Copy + Send + Sync> {
    warp::log::custom(|info| {
        info!(
            "{} {} {} {}ms",
            info.method(),
            info.path(),
            info.status().as_u16(),
            info.elapsed().as_millis()
        );
    })
}
