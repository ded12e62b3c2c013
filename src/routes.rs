use std::convert::Infallible;
use warp::http::Method;
use warp::{Filter, Reply};

use crate::handlers;
use crate::middleware::{cors_headers, request_log};
use crate::models::AppState;
use crate::services::{LaunchListQuery, PageQuery, UpcomingQuery, VehicleQuery};

const FIXED_LAUNCH_PATHS: [&str; 3] = ["upcoming", "past", "statuses"];

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// The full route tree: resource endpoints, error rendering, CORS and the access log.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path!("health").and(warp::get()).map(|| "OK");

    // Rejects as not-found for other methods so unknown GET paths stay 404.
    let preflight = warp::method().and_then(|method: Method| async move {
        if method == Method::OPTIONS {
            Ok(warp::reply())
        } else {
            Err(warp::reject::not_found())
        }
    });

    let rate_limit = warp::path!("api" / "rate-limit")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::rate_limit);

    let home = warp::path!("api" / "home")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::home);

    let api = rate_limit
        .or(home)
        .or(launch_routes(state.clone()))
        .or(astronaut_routes(state.clone()))
        .or(misc_routes(state));

    health
        .or(preflight)
        .or(api)
        .recover(handlers::handle_rejection)
        .with(warp::reply::with::headers(cors_headers()))
        .with(request_log())
}

fn launch_routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let list = warp::path!("api" / "launches")
        .and(warp::get())
        .and(warp::query::<LaunchListQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::launches);

    let upcoming = warp::path!("api" / "launches" / "upcoming")
        .and(warp::get())
        .and(warp::query::<UpcomingQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::upcoming_launches);

    let spacex = warp::path!("api" / "launches" / "upcoming" / "spacex")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::spacex_launches);

    let past = warp::path!("api" / "launches" / "past")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::past_launches);

    let statuses = warp::path!("api" / "launches" / "statuses")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::launch_statuses);

    let detail = warp::path("api")
        .and(warp::path("launches"))
        .and(launch_id())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::launch);

    let events = warp::path!("api" / "events")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::events);

    let event = warp::path!("api" / "events" / u32)
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::event);

    list.or(upcoming)
        .or(spacex)
        .or(past)
        .or(statuses)
        .or(detail)
        .or(events)
        .or(event)
}

/// A percent-decoded launch id segment. Never matches the fixed sub-paths, so
/// a bad query on `/api/launches/past` is not retried as a lookup of launch "past".
fn launch_id() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::path::param::<String>().and_then(|raw: String| async move {
        match urlencoding::decode(&raw) {
            Ok(id) if !FIXED_LAUNCH_PATHS.contains(&&*id) => Ok(id.into_owned()),
            _ => Err(warp::reject::not_found()),
        }
    })
}

fn astronaut_routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let list = warp::path!("api" / "astronauts")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::astronauts);

    let in_space = warp::path!("api" / "astronauts" / "in-space")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::astronauts_in_space);

    let statuses = warp::path!("api" / "astronauts" / "statuses")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::astronaut_statuses);

    let detail = warp::path!("api" / "astronauts" / u32)
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::astronaut);

    list.or(in_space).or(statuses).or(detail)
}

fn misc_routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let locations = warp::path!("api" / "locations")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::locations);

    let location = warp::path!("api" / "locations" / u32)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::location);

    let vehicles = warp::path!("api" / "vehicles")
        .and(warp::get())
        .and(warp::query::<VehicleQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::vehicles);

    let families = warp::path!("api" / "vehicles" / "families")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::vehicle_families);

    let starship = warp::path!("api" / "starship")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::starship);

    let news = warp::path!("api" / "news")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::news);

    let iss = warp::path!("api" / "iss-location")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::iss_location);

    locations
        .or(location)
        .or(vehicles)
        .or(families)
        .or(starship)
        .or(news)
        .or(iss)
}
