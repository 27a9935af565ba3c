//! Source contracts and implementations
//!
//! The core only talks to the outside world through two traits:
//! `CommerceSource` for orders and `TrafficSource` for analytics reports.
//! Implementations here are in-memory engines fed either by a seeded
//! generator or by a JSON export on disk.

mod facts;
mod file;
mod orders;
mod reports;
mod seeded;

pub use facts::{ActiveUserFact, FactTable, TrafficDump, TrafficFact};
pub use file::{load_orders, load_traffic};
pub use orders::OrderStore;
pub use reports::{RealtimeKind, ReportKind};
pub use seeded::{generate_orders, generate_traffic, SeededRng};

use async_trait::async_trait;

use crate::types::{
    AggregationWindow, CatalogProduct, Order, OrderPage, ReportDateRange, ReportRow, Result,
    StatusFilter, StorePulseError,
};

/// Commerce source name used in errors
pub const COMMERCE: &str = "commerce";
/// Traffic source name used in errors
pub const TRAFFIC: &str = "traffic";

/// Order listing query
#[derive(Debug, Clone, PartialEq)]
pub struct OrderQuery {
    pub window: AggregationWindow,
    pub status: StatusFilter,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    /// Matched against order number and customer name only
    pub search: Option<String>,
}

impl OrderQuery {
    pub fn new(window: AggregationWindow, status: StatusFilter) -> Self {
        Self {
            window,
            status,
            page: 1,
            per_page: 10,
            search: None,
        }
    }

    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.trim().is_empty()).then_some(term);
        self
    }
}

/// Exact-match filter on one dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionFilter {
    pub field: String,
    pub value: String,
}

impl DimensionFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    Metric { name: String, desc: bool },
    Dimension { name: String, desc: bool },
}

impl OrderBy {
    pub fn metric_desc(name: &str) -> Self {
        Self::Metric {
            name: name.to_string(),
            desc: true,
        }
    }

    pub fn dimension_asc(name: &str) -> Self {
        Self::Dimension {
            name: name.to_string(),
            desc: false,
        }
    }
}

/// Date-ranged report request
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub date_range: ReportDateRange,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub dimension_filter: Option<DimensionFilter>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl ReportRequest {
    pub fn with_filter(mut self, filter: DimensionFilter) -> Self {
        self.dimension_filter = Some(filter);
        self
    }
}

/// Realtime report request: always "now", no date range
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeRequest {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

/// Source of commerce orders
#[async_trait]
pub trait CommerceSource: Send + Sync {
    /// List orders matching `query`, with pagination metadata
    async fn list_orders(&self, query: &OrderQuery) -> Result<OrderPage>;

    /// Single order by id; `None` when the source has no such order
    async fn get_order(&self, id: u64) -> Result<Option<Order>>;

    /// Catalog products by popularity, most sold first
    async fn best_sellers(&self, limit: usize) -> Result<Vec<CatalogProduct>>;
}

/// Source of analytics reports
#[async_trait]
pub trait TrafficSource: Send + Sync {
    /// Run a date-ranged report
    async fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>>;

    /// Run a report over current activity
    async fn run_realtime_report(&self, request: &RealtimeRequest) -> Result<Vec<ReportRow>>;
}

/// Stand-in for a source with no data location. Every call fails with
/// `Misconfigured`, so callers can tell "not set up" from "down".
#[derive(Debug, Clone)]
pub struct Unconfigured {
    source_name: &'static str,
    reason: String,
}

impl Unconfigured {
    pub fn new(source_name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            source_name,
            reason: reason.into(),
        }
    }

    fn error(&self) -> StorePulseError {
        StorePulseError::misconfigured(self.source_name, self.reason.clone())
    }
}

#[async_trait]
impl CommerceSource for Unconfigured {
    async fn list_orders(&self, _query: &OrderQuery) -> Result<OrderPage> {
        Err(self.error())
    }

    async fn get_order(&self, _id: u64) -> Result<Option<Order>> {
        Err(self.error())
    }

    async fn best_sellers(&self, _limit: usize) -> Result<Vec<CatalogProduct>> {
        Err(self.error())
    }
}

#[async_trait]
impl TrafficSource for Unconfigured {
    async fn run_report(&self, _request: &ReportRequest) -> Result<Vec<ReportRow>> {
        Err(self.error())
    }

    async fn run_realtime_report(&self, _request: &RealtimeRequest) -> Result<Vec<ReportRow>> {
        Err(self.error())
    }
}
