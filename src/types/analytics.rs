//! Traffic report rows and the typed records decoded from them

use serde::{Deserialize, Serialize};

/// A single positional value in a report row (`{"value": "..."}`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RowValue {
    #[serde(default)]
    pub value: Option<String>,
}

impl RowValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

/// One row from the traffic source: dimension and metric values in
/// request order. Values are untyped; see `services::decode`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(default)]
    pub dimension_values: Vec<RowValue>,
    #[serde(default)]
    pub metric_values: Vec<RowValue>,
}

impl ReportRow {
    pub fn new<D, M>(dimensions: D, metrics: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            dimension_values: dimensions.into_iter().map(RowValue::new).collect(),
            metric_values: metrics.into_iter().map(RowValue::new).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub sessions: u64,
    pub total_users: u64,
    pub screen_page_views: u64,
    pub engaged_sessions: u64,
    pub average_session_duration: f64,
    pub engagement_rate: f64,
    pub sessions_per_user: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesPoint {
    /// Fixed-width `YYYYMMDD`, so lexical order is chronological
    pub date: String,
    pub sessions: u64,
    pub users: u64,
    pub pageviews: u64,
    pub engaged_sessions: u64,
}

/// Sessions keyed by a channel group or a source/medium pair
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NamedSessions {
    pub name: String,
    pub sessions: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountrySessions {
    pub country: String,
    pub sessions: u64,
    pub total_users: u64,
}

/// Raw region/city row before the region merge
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCityRow {
    pub region: String,
    pub city: String,
    pub sessions: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CitySessions {
    pub city: String,
    pub region: String,
    pub sessions: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageViews {
    pub path: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandingRow {
    pub path: String,
    pub sessions: u64,
    pub engaged: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LandingPage {
    pub path: String,
    pub sessions: u64,
    pub engaged: u64,
    /// engaged / sessions * 100; 0 when there are no sessions. Not clamped.
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Acquisition {
    pub channels: Vec<NamedSessions>,
    pub sources: Vec<NamedSessions>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct GeoBreakdown {
    pub countries: Vec<CountrySessions>,
    pub regions: Vec<NamedSessions>,
    pub cities: Vec<CitySessions>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct PagesBreakdown {
    pub pages: Vec<PageViews>,
    pub landings: Vec<LandingPage>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MinuteBucket {
    pub min_ago: u64,
    pub users: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub country: String,
    pub city: String,
    pub active_users: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeData {
    pub total_active: u64,
    /// Oldest bucket first, "0 minutes ago" last
    pub chart_data: Vec<MinuteBucket>,
    pub top_countries: Vec<LocationCount>,
    pub top_cities: Vec<LocationCount>,
}

/// `{ items, meta }` response produced for each logical view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ViewResponse<I, M> {
    pub items: Vec<I>,
    pub meta: M,
}

impl<I, M: Default> Default for ViewResponse<I, M> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: M::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RowCountMeta {
    pub row_count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct TotalMeta {
    pub total: u64,
}
