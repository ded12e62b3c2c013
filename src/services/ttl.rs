//! Cache lifetimes per upstream resource type.

use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use url::Url;

pub const UPCOMING_LIST_SECS: u64 = 3600; // 1 hour
pub const PAST_LIST_SECS: u64 = 7200; // 2 hours, past launches change rarely
pub const LAUNCH_DETAIL_SECS: u64 = 1800; // 30 minutes
pub const AGENCY_SECS: u64 = 86400; // 24 hours
pub const CONFIG_SECS: u64 = 2_592_000; // 30 days
pub const LOCATION_SECS: u64 = 86400; // 24 hours
pub const ASTRONAUT_SECS: u64 = 2_592_000; // 30 days
pub const LAUNCHER_CONFIG_FAMILIES_SECS: u64 = 604_800; // 1 week
pub const DEFAULT_SECS: u64 = 3600;

lazy_static! {
    static ref LAUNCH_DETAIL: Regex = Regex::new(r"/launches/[A-Za-z0-9-]+/?$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Config,
    UpcomingLaunches,
    PastLaunches,
    LaunchDetail,
    Agency,
    Location,
    Astronaut,
    LauncherConfigFamilies,
    Other,
}

impl ResourceClass {
    /// Classifies by path only; the first matching rule wins, most specific first.
    pub fn of(url: &str) -> Self {
        let path = request_path(url);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let has = |name: &str| segments.iter().any(|s| *s == name);
        let has_pair = |first: &str, second: &str| {
            segments
                .windows(2)
                .any(|pair| pair[0] == first && pair[1] == second)
        };

        if has("config") {
            ResourceClass::Config
        } else if has_pair("launches", "upcoming") {
            ResourceClass::UpcomingLaunches
        } else if has_pair("launches", "previous") {
            ResourceClass::PastLaunches
        } else if LAUNCH_DETAIL.is_match(&path) {
            ResourceClass::LaunchDetail
        } else if has("agencies") {
            ResourceClass::Agency
        } else if has("locations") {
            ResourceClass::Location
        } else if has("astronauts") {
            ResourceClass::Astronaut
        } else if has("launcher_configuration_families") {
            ResourceClass::LauncherConfigFamilies
        } else {
            ResourceClass::Other
        }
    }

    pub fn ttl_secs(self) -> u64 {
        match self {
            ResourceClass::Config => CONFIG_SECS,
            ResourceClass::UpcomingLaunches => UPCOMING_LIST_SECS,
            ResourceClass::PastLaunches => PAST_LIST_SECS,
            ResourceClass::LaunchDetail => LAUNCH_DETAIL_SECS,
            ResourceClass::Agency => AGENCY_SECS,
            ResourceClass::Location => LOCATION_SECS,
            ResourceClass::Astronaut => ASTRONAUT_SECS,
            ResourceClass::LauncherConfigFamilies => LAUNCHER_CONFIG_FAMILIES_SECS,
            ResourceClass::Other => DEFAULT_SECS,
        }
    }
}

/// How long a response fetched from `url` may be served from cache.
pub fn classify(url: &str) -> Duration {
    Duration::from_secs(ResourceClass::of(url).ttl_secs())
}

fn request_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
