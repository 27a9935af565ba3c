//! Report definitions issued against the traffic source
//!
//! Each kind fixes its dimension and metric order. The positional decoders
//! in `services::decode` read values back in exactly this order.

use super::{OrderBy, RealtimeRequest, ReportRequest};
use crate::types::ReportDateRange;

/// Date-ranged reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Overview,
    Timeseries,
    Channels,
    SourceMedium,
    Countries,
    /// Region/city rows; callers add the country filter
    RegionCities,
    TopPages,
    LandingPages,
}

impl ReportKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Timeseries => "timeseries",
            Self::Channels => "channels",
            Self::SourceMedium => "source-medium",
            Self::Countries => "countries",
            Self::RegionCities => "region-cities",
            Self::TopPages => "top-pages",
            Self::LandingPages => "landing-pages",
        }
    }

    pub fn dimensions(&self) -> &'static [&'static str] {
        match self {
            Self::Overview => &[],
            Self::Timeseries => &["date"],
            Self::Channels => &["sessionDefaultChannelGroup"],
            Self::SourceMedium => &["sessionSourceMedium"],
            Self::Countries => &["country"],
            Self::RegionCities => &["region", "city"],
            Self::TopPages => &["pagePath"],
            Self::LandingPages => &["landingPage"],
        }
    }

    pub fn metrics(&self) -> &'static [&'static str] {
        match self {
            Self::Overview => &[
                "sessions",
                "totalUsers",
                "screenPageViews",
                "engagedSessions",
                "averageSessionDuration",
                "engagementRate",
                "sessionsPerUser",
            ],
            Self::Timeseries => &["sessions", "totalUsers", "screenPageViews", "engagedSessions"],
            Self::Channels | Self::SourceMedium | Self::RegionCities => &["sessions"],
            Self::Countries => &["sessions", "totalUsers"],
            Self::TopPages => &["screenPageViews"],
            Self::LandingPages => &["sessions", "engagedSessions"],
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Overview | Self::Timeseries => None,
            Self::Channels => Some(10),
            Self::Countries => Some(15),
            Self::SourceMedium | Self::TopPages | Self::LandingPages => Some(20),
            Self::RegionCities => Some(50),
        }
    }

    fn order_by(&self) -> Vec<OrderBy> {
        match self {
            Self::Overview => Vec::new(),
            Self::Timeseries => vec![OrderBy::dimension_asc("date")],
            Self::TopPages => vec![OrderBy::metric_desc("screenPageViews")],
            _ => vec![OrderBy::metric_desc("sessions")],
        }
    }

    pub fn request(&self, date_range: ReportDateRange) -> ReportRequest {
        ReportRequest {
            date_range,
            dimensions: to_owned(self.dimensions()),
            metrics: to_owned(self.metrics()),
            dimension_filter: None,
            order_by: self.order_by(),
            limit: self.limit(),
        }
    }
}

/// Realtime reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeKind {
    TotalActive,
    PerMinute,
    Locations,
}

impl RealtimeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TotalActive => "realtime-total",
            Self::PerMinute => "realtime-minutes",
            Self::Locations => "realtime-locations",
        }
    }

    pub fn request(&self) -> RealtimeRequest {
        let dimensions: &[&str] = match self {
            Self::TotalActive => &[],
            Self::PerMinute => &["minutesAgo"],
            Self::Locations => &["country", "city"],
        };
        let order_by = match self {
            Self::PerMinute => vec![OrderBy::dimension_asc("minutesAgo")],
            _ => Vec::new(),
        };
        RealtimeRequest {
            dimensions: to_owned(dimensions),
            metrics: vec!["activeUsers".to_string()],
            order_by,
            limit: None,
        }
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
