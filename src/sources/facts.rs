//! In-memory traffic report engine
//!
//! Holds per-day traffic facts and a realtime activity snapshot, and
//! answers report requests the way an analytics reporting API does:
//! group by the requested dimensions, sum metrics, derive ratios, filter,
//! order and limit. Values come back as strings in request order.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::{DimensionFilter, OrderBy, RealtimeRequest, ReportRequest, TrafficSource, TRAFFIC};
use crate::types::{ReportRow, Result, StorePulseError};

/// Aggregated traffic for one day and one combination of attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrafficFact {
    pub date: NaiveDate,
    pub channel: String,
    pub source_medium: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub page_path: String,
    pub landing_page: String,
    pub sessions: u64,
    pub users: u64,
    pub pageviews: u64,
    pub engaged_sessions: u64,
    /// Total engagement time in seconds
    pub engagement_seconds: f64,
}

impl TrafficFact {
    fn dimension(&self, name: &str) -> Option<String> {
        let value = match name {
            "date" => return Some(self.date.format("%Y%m%d").to_string()),
            "sessionDefaultChannelGroup" => &self.channel,
            "sessionSourceMedium" => &self.source_medium,
            "country" => &self.country,
            "region" => &self.region,
            "city" => &self.city,
            "pagePath" => &self.page_path,
            "landingPage" => &self.landing_page,
            _ => return None,
        };
        Some(value.clone())
    }
}

/// Active users in one minute bucket for one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveUserFact {
    pub minutes_ago: u32,
    pub country: String,
    pub city: String,
    pub active_users: u64,
}

impl ActiveUserFact {
    fn dimension(&self, name: &str) -> Option<String> {
        match name {
            "minutesAgo" => Some(format!("{:02}", self.minutes_ago)),
            "country" => Some(self.country.clone()),
            "city" => Some(self.city.clone()),
            _ => None,
        }
    }
}

/// Serialized form of a traffic export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrafficDump {
    #[serde(default)]
    pub facts: Vec<TrafficFact>,
    #[serde(default)]
    pub active: Vec<ActiveUserFact>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    sessions: u64,
    users: u64,
    pageviews: u64,
    engaged_sessions: u64,
    engagement_seconds: f64,
    active_users: u64,
}

impl Totals {
    fn add_fact(&mut self, fact: &TrafficFact) {
        self.sessions = self.sessions.saturating_add(fact.sessions);
        self.users = self.users.saturating_add(fact.users);
        self.pageviews = self.pageviews.saturating_add(fact.pageviews);
        self.engaged_sessions = self.engaged_sessions.saturating_add(fact.engaged_sessions);
        self.engagement_seconds += fact.engagement_seconds;
    }

    fn metric(&self, name: &str) -> Option<MetricValue> {
        let ratio = |num: f64, den: u64| if den == 0 { 0.0 } else { num / den as f64 };
        Some(match name {
            "sessions" => MetricValue::Count(self.sessions),
            "totalUsers" => MetricValue::Count(self.users),
            "screenPageViews" => MetricValue::Count(self.pageviews),
            "engagedSessions" => MetricValue::Count(self.engaged_sessions),
            "activeUsers" => MetricValue::Count(self.active_users),
            "averageSessionDuration" => {
                MetricValue::Ratio(ratio(self.engagement_seconds, self.sessions))
            }
            "engagementRate" => MetricValue::Ratio(ratio(self.engaged_sessions as f64, self.sessions)),
            "sessionsPerUser" => MetricValue::Ratio(ratio(self.sessions as f64, self.users)),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum MetricValue {
    Count(u64),
    Ratio(f64),
}

impl MetricValue {
    fn as_f64(&self) -> f64 {
        match self {
            Self::Count(n) => *n as f64,
            Self::Ratio(r) => *r,
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Count(n) => n.to_string(),
            Self::Ratio(r) => r.to_string(),
        }
    }
}

/// Grouped rows keyed by dimension tuple, in first-seen order
struct Groups {
    keys: Vec<Vec<String>>,
    totals: Vec<Totals>,
    index: HashMap<Vec<String>, usize>,
}

impl Groups {
    fn new() -> Self {
        Self {
            keys: Vec::new(),
            totals: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn entry(&mut self, key: Vec<String>) -> &mut Totals {
        let pos = match self.index.get(&key) {
            Some(&pos) => pos,
            None => {
                self.index.insert(key.clone(), self.keys.len());
                self.keys.push(key);
                self.totals.push(Totals::default());
                self.totals.len() - 1
            }
        };
        &mut self.totals[pos]
    }

    fn into_rows(
        self,
        dimensions: &[String],
        metrics: &[String],
        order_by: &[OrderBy],
        limit: Option<usize>,
    ) -> Result<Vec<ReportRow>> {
        let mut rows: Vec<(Vec<String>, Vec<MetricValue>)> = Vec::with_capacity(self.keys.len());
        for (key, totals) in self.keys.into_iter().zip(self.totals) {
            let values = metrics
                .iter()
                .map(|m| totals.metric(m).ok_or_else(|| unknown("metric", m)))
                .collect::<Result<Vec<_>>>()?;
            rows.push((key, values));
        }

        for order in order_by.iter().rev() {
            match order {
                OrderBy::Metric { name, desc } => {
                    let pos = position(metrics, name, "order-by metric")?;
                    rows.sort_by(|a, b| {
                        directed(a.1[pos].as_f64().total_cmp(&b.1[pos].as_f64()), *desc)
                    });
                }
                OrderBy::Dimension { name, desc } => {
                    let pos = position(dimensions, name, "order-by dimension")?;
                    rows.sort_by(|a, b| directed(a.0[pos].cmp(&b.0[pos]), *desc));
                }
            }
        }

        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        Ok(rows
            .into_iter()
            .map(|(key, values)| ReportRow::new(key, values.iter().map(MetricValue::render)))
            .collect())
    }
}

fn directed(ordering: Ordering, desc: bool) -> Ordering {
    if desc {
        ordering.reverse()
    } else {
        ordering
    }
}

fn position(names: &[String], name: &str, what: &str) -> Result<usize> {
    names
        .iter()
        .position(|n| n == name)
        .ok_or_else(|| unknown(what, name))
}

fn unknown(what: &str, name: &str) -> StorePulseError {
    StorePulseError::fetch(TRAFFIC, format!("unsupported {} '{}'", what, name))
}

/// Traffic source backed by in-memory facts
#[derive(Debug, Clone)]
pub struct FactTable {
    facts: Vec<TrafficFact>,
    active: Vec<ActiveUserFact>,
    today: NaiveDate,
}

impl FactTable {
    /// `today` anchors relative date tokens such as `30daysAgo`
    pub fn new(dump: TrafficDump, today: NaiveDate) -> Self {
        Self {
            facts: dump.facts,
            active: dump.active,
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>> {
        let (start, end) = request.date_range.resolve(self.today)?;
        let mut groups = Groups::new();
        let mut matched = false;

        for fact in self.facts.iter().filter(|f| f.date >= start && f.date <= end) {
            if !passes(fact, request.dimension_filter.as_ref(), TrafficFact::dimension)? {
                continue;
            }
            let key = request
                .dimensions
                .iter()
                .map(|d| fact.dimension(d).ok_or_else(|| unknown("dimension", d)))
                .collect::<Result<Vec<_>>>()?;
            groups.entry(key).add_fact(fact);
            matched = true;
        }

        if !matched {
            return Ok(Vec::new());
        }
        groups.into_rows(
            &request.dimensions,
            &request.metrics,
            &request.order_by,
            request.limit,
        )
    }

    pub fn realtime_report(&self, request: &RealtimeRequest) -> Result<Vec<ReportRow>> {
        let mut groups = Groups::new();

        for fact in &self.active {
            let key = request
                .dimensions
                .iter()
                .map(|d| fact.dimension(d).ok_or_else(|| unknown("dimension", d)))
                .collect::<Result<Vec<_>>>()?;
            let totals = groups.entry(key);
            totals.active_users = totals.active_users.saturating_add(fact.active_users);
        }

        if self.active.is_empty() {
            return Ok(Vec::new());
        }
        groups.into_rows(
            &request.dimensions,
            &request.metrics,
            &request.order_by,
            request.limit,
        )
    }
}

fn passes<F>(
    fact: &F,
    filter: Option<&DimensionFilter>,
    dimension: fn(&F, &str) -> Option<String>,
) -> Result<bool> {
    match filter {
        None => Ok(true),
        Some(filter) => dimension(fact, &filter.field)
            .map(|value| value == filter.value)
            .ok_or_else(|| unknown("filter dimension", &filter.field)),
    }
}

#[async_trait]
impl TrafficSource for FactTable {
    async fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>> {
        self.report(request)
    }

    async fn run_realtime_report(&self, request: &RealtimeRequest) -> Result<Vec<ReportRow>> {
        self.realtime_report(request)
    }
}
