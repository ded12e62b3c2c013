use chrono::Utc;
use hyper::StatusCode;
use serde::Serialize;
use std::convert::Infallible;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::errors::GatewayError;
use crate::models::{AppState, FetchResult};
use crate::services::{LaunchListQuery, PageQuery, UpcomingQuery, VehicleQuery};

#[cfg(test)]
mod tests;

fn respond<T: Serialize>(result: Result<T, GatewayError>) -> Result<Response, Rejection> {
    match result {
        Ok(data) => Ok(warp::reply::json(&FetchResult::ok(data)).into_response()),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn rate_limit(state: AppState) -> Result<Response, Rejection> {
    let status = state.rate_limiter.check().await;
    Ok(warp::reply::json(&FetchResult::ok(status)).into_response())
}

pub async fn home(state: AppState) -> Result<Response, Rejection> {
    let summary = state.space.home(Utc::now()).await;
    Ok(warp::reply::json(&FetchResult::ok(summary)).into_response())
}

pub async fn launches(query: LaunchListQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.launches(&query).await)
}

pub async fn upcoming_launches(query: UpcomingQuery, state: AppState) -> Result<Response, Rejection> {
    let page = PageQuery {
        offset: query.offset,
        limit: query.limit,
    };
    respond(state.space.upcoming_launches(&page, query.location).await)
}

pub async fn spacex_launches(page: PageQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.spacex_launches(&page).await)
}

pub async fn past_launches(page: PageQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.past_launches(&page).await)
}

pub async fn launch_statuses(state: AppState) -> Result<Response, Rejection> {
    respond(state.space.launch_statuses().await)
}

pub async fn launch(id: String, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.launch(&id).await)
}

pub async fn events(page: PageQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.events(&page).await)
}

pub async fn event(id: u32, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.event(id).await)
}

pub async fn astronauts(page: PageQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.astronauts(&page).await)
}

pub async fn astronauts_in_space(page: PageQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.astronauts_in_space(&page).await)
}

pub async fn astronaut_statuses(state: AppState) -> Result<Response, Rejection> {
    respond(state.space.astronaut_statuses().await)
}

pub async fn astronaut(id: u32, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.astronaut(id).await)
}

pub async fn locations(page: PageQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.locations(&page).await)
}

pub async fn location(id: u32, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.location(id).await)
}

pub async fn vehicles(query: VehicleQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.launcher_configs(&query).await)
}

pub async fn vehicle_families(state: AppState) -> Result<Response, Rejection> {
    respond(state.space.launcher_config_families().await)
}

pub async fn starship(state: AppState) -> Result<Response, Rejection> {
    respond(state.space.starship_dashboard().await)
}

pub async fn news(page: PageQuery, state: AppState) -> Result<Response, Rejection> {
    respond(state.space.articles(&page).await)
}

pub async fn iss_location(state: AppState) -> Result<Response, Rejection> {
    respond(state.space.iss_location().await)
}

/// Renders every failure as a `{ data: null, error }` body.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(e) = err.find::<GatewayError>() {
        match e {
            GatewayError::RateLimitExceeded => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            GatewayError::Upstream(_) => (StatusCode::BAD_GATEWAY, e.to_string()),
            GatewayError::InvalidUrl(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&FetchResult::<()>::err(message)),
        code,
    ))
}
