use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use launchlist_gateway::{
    AppState,
    config::Settings,
    routes::routes,
    store::{KeyValueStore, MemoryStore, RedisStore},
    upstream::HttpUpstream,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env();
    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid BIND_ADDR {:?}", settings.bind_addr))?;

    let store: Arc<dyn KeyValueStore> = match settings.redis_url.as_deref() {
        Some(url) => Arc::new(
            RedisStore::connect(url)
                .await
                .with_context(|| format!("connecting to Redis at {}", url))?,
        ),
        None => {
            warn!("REDIS_URL not set, using in-process store; budget is not shared across instances");
            Arc::new(MemoryStore::new())
        }
    };

    let mut upstream = HttpUpstream::new().context("building HTTP client")?;
    if settings.is_production() {
        if let Some(key) = settings.api_key.as_deref() {
            upstream = upstream.with_api_token(&settings.urls.launch_library, key);
        }
    }

    if settings.cache.bypass_enabled {
        warn!("Running in {} mode: cache and rate limit are bypassed", settings.environment);
    }

    let state = AppState::new(
        store,
        Arc::new(upstream),
        settings.cache,
        settings.rate_limit.clone(),
        settings.urls.clone(),
    );

    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .with_context(|| format!("binding {}", addr))?;

    info!("Launchlist gateway running on http://{}", bound);
    server.await;
    Ok(())
}
