//! Glossary of the traffic metrics shown on the analytics view

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricInfo {
    pub key: &'static str,
    pub title: &'static str,
    pub definition: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how_measured: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<&'static str>,
}

pub const METRIC_GLOSSARY: &[MetricInfo] = &[
    MetricInfo {
        key: "sessions",
        title: "Sessions",
        definition: "A session starts when a user opens the site and ends after 30 minutes of inactivity.",
        how_measured: Some("Counted from session_start events; later events are grouped into the same session."),
        tip: Some("Sessions are not users. One user can start several sessions."),
    },
    MetricInfo {
        key: "users",
        title: "Users (total)",
        definition: "Number of unique users who visited the site.",
        how_measured: None,
        tip: Some("Includes both new and returning users."),
    },
    MetricInfo {
        key: "pageviews",
        title: "Page views",
        definition: "Total number of pages or screens viewed.",
        how_measured: None,
        tip: Some("Repeated views of the same page are counted."),
    },
    MetricInfo {
        key: "engagementRate",
        title: "Engagement rate",
        definition: "Share of sessions that were engaged.",
        how_measured: Some("A session is engaged when it lasts over 10s, has a conversion event or 2+ page views."),
        tip: Some("Replaces bounce rate. Higher is better."),
    },
    MetricInfo {
        key: "avgSessionDuration",
        title: "Average session duration",
        definition: "Average time users spend engaged with the site.",
        how_measured: Some("Total engagement time divided by the number of active sessions."),
        tip: None,
    },
    MetricInfo {
        key: "activeUsers",
        title: "Active users (30 min)",
        definition: "Distinct users who engaged with the site in the last 30 minutes.",
        how_measured: None,
        tip: Some("Useful for watching traffic in real time."),
    },
    MetricInfo {
        key: "channels",
        title: "Acquisition channels",
        definition: "Default channel group through which users reached the site (e.g. Organic Search, Direct).",
        how_measured: None,
        tip: Some("Shows which marketing strategy brings the most traffic."),
    },
    MetricInfo {
        key: "sources",
        title: "Source / medium",
        definition: "Origin (e.g. google, newsletter) and medium (e.g. organic, email) of the traffic.",
        how_measured: None,
        tip: Some("More granular than channels, e.g. 'google / cpc' vs 'google / organic'."),
    },
    MetricInfo {
        key: "geo",
        title: "Geography",
        definition: "Approximate user location based on IP address.",
        how_measured: None,
        tip: Some("May vary because of VPNs or privacy settings."),
    },
    MetricInfo {
        key: "pages",
        title: "Top pages",
        definition: "Page paths with the highest number of views.",
        how_measured: None,
        tip: Some("Indicates the most popular content."),
    },
    MetricInfo {
        key: "landings",
        title: "Landing pages",
        definition: "The first page a user sees when starting a session.",
        how_measured: None,
        tip: Some("Key for judging first impressions and campaign effectiveness."),
    },
];

/// Look up a glossary entry by key
pub fn metric_info(key: &str) -> Option<&'static MetricInfo> {
    METRIC_GLOSSARY.iter().find(|info| info.key == key)
}
