//! One thin function per upstream resource. Each builds its request URL and
//! hands it to the [`Fetcher`]; nothing here special-cases caching or budget.

use chrono::{DateTime, Duration, DurationRound, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::fetcher::Fetcher;
use crate::config::{UpstreamUrls, DEFAULT_PAGE_LIMIT};
use crate::errors::GatewayError;
use crate::types::{
    Article, Astronaut, Event, HomeSummary, IssLocation, Launch, LauncherConfig,
    LauncherConfigFamily, Location, Paginated, StarshipDashboard, Status,
};

pub const MAX_PAGE_LIMIT: u32 = 100;
pub const LAUNCH_LIST_LIMIT: u32 = 10;
pub const HOME_LIST_LIMIT: u32 = 7;
pub const LAUNCH_ORDERINGS: [&str; 4] = ["net", "-net", "name", "-name"];

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    fn pairs(&self, default_limit: u32) -> Vec<(&'static str, String)> {
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT);
        vec![
            ("offset", self.offset.unwrap_or(0).to_string()),
            ("limit", limit.to_string()),
        ]
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LaunchListQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub ordering: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpcomingQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub location: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct VehicleQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub families: Option<String>,
    pub active: Option<String>,
}

pub struct SpaceApi {
    fetcher: Fetcher,
    urls: UpstreamUrls,
}

impl SpaceApi {
    pub fn new(fetcher: Fetcher, urls: UpstreamUrls) -> Self {
        Self { fetcher, urls }
    }

    pub async fn launches(&self, query: &LaunchListQuery) -> Result<Paginated<Launch>, GatewayError> {
        let page = PageQuery {
            offset: query.offset,
            limit: query.limit,
        };
        let mut pairs = page.pairs(LAUNCH_LIST_LIMIT);
        pairs.push(("ordering", sanitize_ordering(query.ordering.as_deref()).to_string()));
        if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
            pairs.push(("status", status.to_string()));
        }
        self.ll(&["launches"], &pairs).await
    }

    pub async fn upcoming_launches(
        &self,
        page: &PageQuery,
        location: Option<u32>,
    ) -> Result<Paginated<Launch>, GatewayError> {
        let mut pairs = page.pairs(DEFAULT_PAGE_LIMIT);
        if let Some(location) = location {
            pairs.push(("location__ids", location.to_string()));
        }
        pairs.push(("ordering", "net".to_string()));
        self.ll(&["launches", "upcoming"], &pairs).await
    }

    pub async fn spacex_launches(&self, page: &PageQuery) -> Result<Paginated<Launch>, GatewayError> {
        let mut pairs = page.pairs(DEFAULT_PAGE_LIMIT);
        pairs.push(("search", "spacex".to_string()));
        pairs.push(("ordering", "net".to_string()));
        self.ll(&["launches", "upcoming"], &pairs).await
    }

    pub async fn past_launches(&self, page: &PageQuery) -> Result<Paginated<Launch>, GatewayError> {
        let mut pairs = page.pairs(DEFAULT_PAGE_LIMIT);
        pairs.push(("ordering", "-net".to_string()));
        self.ll(&["launches", "previous"], &pairs).await
    }

    /// Launches in the seven days from `now`. The window start is truncated to
    /// the hour so repeated calls share one cache key.
    pub async fn launches_this_week(&self, now: DateTime<Utc>) -> Result<Paginated<Launch>, GatewayError> {
        let start = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
        let end = start + Duration::days(7);
        let pairs = vec![
            ("net__gte", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("net__lte", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];
        self.ll(&["launches", "upcoming"], &pairs).await
    }

    pub async fn launch(&self, id: &str) -> Result<Launch, GatewayError> {
        self.ll(&["launches", id], &[]).await
    }

    pub async fn launch_statuses(&self) -> Result<Paginated<Status>, GatewayError> {
        self.ll(&["config", "launch_statuses"], &[]).await
    }

    pub async fn events(&self, page: &PageQuery) -> Result<Paginated<Event>, GatewayError> {
        let mut pairs = page.pairs(DEFAULT_PAGE_LIMIT);
        pairs.push(("ordering", "net".to_string()));
        self.ll(&["events", "upcoming"], &pairs).await
    }

    pub async fn event(&self, id: u32) -> Result<Event, GatewayError> {
        self.ll(&["events", &id.to_string()], &[]).await
    }

    pub async fn astronauts(&self, page: &PageQuery) -> Result<Paginated<Astronaut>, GatewayError> {
        let mut pairs = page.pairs(DEFAULT_PAGE_LIMIT);
        pairs.push(("ordering", "-time_in_space".to_string()));
        self.ll(&["astronauts"], &pairs).await
    }

    pub async fn astronauts_in_space(&self, page: &PageQuery) -> Result<Paginated<Astronaut>, GatewayError> {
        let mut pairs = page.pairs(DEFAULT_PAGE_LIMIT);
        pairs.push(("in_space", "true".to_string()));
        pairs.push(("ordering", "-time_in_space".to_string()));
        self.ll(&["astronauts"], &pairs).await
    }

    pub async fn humans_in_space(&self) -> Result<Paginated<Astronaut>, GatewayError> {
        let pairs = vec![
            ("in_space", "true".to_string()),
            ("is_human", "true".to_string()),
        ];
        self.ll(&["astronauts"], &pairs).await
    }

    pub async fn astronaut(&self, id: u32) -> Result<Astronaut, GatewayError> {
        self.ll(&["astronauts", &id.to_string()], &[]).await
    }

    pub async fn astronaut_statuses(&self) -> Result<Paginated<Status>, GatewayError> {
        self.ll(&["config", "astronaut_statuses"], &[]).await
    }

    pub async fn locations(&self, page: &PageQuery) -> Result<Paginated<Location>, GatewayError> {
        self.ll(&["locations"], &page.pairs(DEFAULT_PAGE_LIMIT)).await
    }

    pub async fn location(&self, id: u32) -> Result<Location, GatewayError> {
        self.ll(&["locations", &id.to_string()], &[]).await
    }

    pub async fn launcher_configs(&self, query: &VehicleQuery) -> Result<Paginated<LauncherConfig>, GatewayError> {
        let page = PageQuery {
            offset: query.offset,
            limit: query.limit,
        };
        let mut pairs = page.pairs(DEFAULT_PAGE_LIMIT);
        if let Some(family) = query.families.as_deref().and_then(|f| f.trim().parse::<u32>().ok()) {
            pairs.push(("families", family.to_string()));
        }
        match query.active.as_deref() {
            None | Some("All") | Some("all") | Some("") => {}
            Some(active) => pairs.push(("active", (active == "true").to_string())),
        }
        self.ll(&["launcher_configurations"], &pairs).await
    }

    pub async fn launcher_config_families(&self) -> Result<Paginated<LauncherConfigFamily>, GatewayError> {
        let page = PageQuery::new(0, MAX_PAGE_LIMIT);
        self.ll(&["launcher_configuration_families"], &page.pairs(MAX_PAGE_LIMIT)).await
    }

    pub async fn starship_dashboard(&self) -> Result<StarshipDashboard, GatewayError> {
        self.ll(&["dashboard", "starship"], &[]).await
    }

    pub async fn articles(&self, page: &PageQuery) -> Result<Paginated<Article>, GatewayError> {
        let mut pairs = page.pairs(DEFAULT_PAGE_LIMIT);
        pairs.push(("ordering", "-published_at".to_string()));
        let url = build_url(&self.urls.news, &["articles"], &pairs)?;
        self.fetcher.fetch_json(&url).await
    }

    /// Live station position. The ISS API is unmetered and changes every
    /// second, so this read skips both the budget and the cache.
    pub async fn iss_location(&self) -> Result<IssLocation, GatewayError> {
        let url = build_url(&self.urls.iss, &["iss-now.json"], &[])?;
        self.fetcher.fetch_live(&url).await
    }

    pub async fn home(&self, now: DateTime<Utc>) -> HomeSummary {
        let latest = PageQuery::new(0, HOME_LIST_LIMIT);
        let (articles, launches, this_week, astronauts) = futures::join!(
            self.articles(&latest),
            self.upcoming_launches(&latest, None),
            self.launches_this_week(now),
            self.humans_in_space(),
        );

        HomeSummary {
            articles: articles.ok().map(|page| page.results),
            launches: launches.ok().map(|page| page.results),
            launches_this_week: this_week.ok().map(|page| page.count),
            astronauts: astronauts.ok().map(|page| page.results),
        }
    }

    async fn ll<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        pairs: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = build_url(&self.urls.launch_library, segments, pairs)?;
        self.fetcher.fetch_json(&url).await
    }
}

/// Unknown orderings fall back to `net` rather than reaching the upstream.
pub fn sanitize_ordering(ordering: Option<&str>) -> &'static str {
    ordering
        .and_then(|o| LAUNCH_ORDERINGS.iter().copied().find(|valid| *valid == o))
        .unwrap_or("net")
}

/// Appends percent-encoded path segments and query pairs to `base`.
pub fn build_url(base: &str, segments: &[&str], pairs: &[(&str, String)]) -> Result<String, GatewayError> {
    let mut url = Url::parse(base).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| GatewayError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (name, value) in pairs {
            query.append_pair(name, value);
        }
    }
    Ok(url.to_string())
}
