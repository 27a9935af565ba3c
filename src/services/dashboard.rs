//! View orchestration
//!
//! Issues source fetches (concurrently where they are independent), feeds
//! the raw results to the aggregators and assembles one response per
//! logical view. Aggregators stay pure; all I/O happens here.

use serde::Serialize;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::realtime::RealtimeAggregator;
use crate::services::sales::SalesAggregator;
use crate::services::traffic::TrafficAggregator;
use crate::services::window::DateWindowResolver;
use crate::sources::{
    CommerceSource, DimensionFilter, OrderQuery, RealtimeKind, ReportKind, TrafficSource,
};
use crate::types::{
    Acquisition, AnalyticsOverview, CatalogProduct, CustomRange, GeoBreakdown, Order, OrderPage,
    PagesBreakdown, Period, RealtimeData, ReportDateRange, ReportRow, Result, RowCountMeta,
    SalesReport, StatusFilter, StorePulseError, TimeseriesPoint, TotalMeta, ViewResponse,
};

/// Catalog entries shown next to the sales KPIs
pub const BEST_SELLERS: usize = 6;

/// Response for grouped views, where everything lives in `meta`
pub type GroupedResponse<M> = ViewResponse<(), M>;

pub type OverviewResponse = ViewResponse<AnalyticsOverview, RowCountMeta>;
pub type TimeseriesResponse = ViewResponse<TimeseriesPoint, TotalMeta>;

/// Paginated order listing parameters
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrdersRequest {
    pub period: Period,
    pub range: CustomRange,
    pub status: StatusFilter,
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
}

impl OrdersRequest {
    pub fn new(period: Period, status: StatusFilter) -> Self {
        Self {
            period,
            status,
            page: 1,
            per_page: 10,
            ..Self::default()
        }
    }
}

/// Sales KPIs plus the catalog's best sellers. An unavailable catalog
/// leaves `best_sellers` empty.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SalesView {
    #[serde(flatten)]
    pub report: SalesReport,
    pub best_sellers: Vec<CatalogProduct>,
}

/// A section of the analytics view that could not be fetched
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectionFailure {
    pub section: &'static str,
    pub error: String,
}

/// All five analytics sections. Failed sections hold their empty value
/// and are listed in `failures`.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub overview: OverviewResponse,
    pub timeseries: TimeseriesResponse,
    pub acquisition: GroupedResponse<Acquisition>,
    pub geo: GroupedResponse<GeoBreakdown>,
    pub pages: GroupedResponse<PagesBreakdown>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SectionFailure>,
}

impl AnalyticsView {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

fn grouped<M>(meta: M) -> GroupedResponse<M> {
    ViewResponse {
        items: Vec::new(),
        meta,
    }
}

/// Dashboard backend over one commerce and one traffic source
pub struct DashboardService {
    commerce: Arc<dyn CommerceSource>,
    traffic: Arc<dyn TrafficSource>,
    settings: Settings,
}

impl DashboardService {
    pub fn new(
        commerce: Arc<dyn CommerceSource>,
        traffic: Arc<dyn TrafficSource>,
        settings: Settings,
    ) -> Self {
        Self {
            commerce,
            traffic,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ---- commerce ----

    /// KPIs, daily series and top products over every order in the window,
    /// with the catalog's best sellers fetched alongside
    pub async fn sales_view(
        &self,
        period: Period,
        range: CustomRange,
        status: StatusFilter,
    ) -> Result<SalesView> {
        let window = DateWindowResolver::resolve_now(period, range);
        let (orders, catalog) = tokio::join!(
            self.fetch_all_orders(OrderQuery::new(window, status)),
            self.commerce.best_sellers(BEST_SELLERS),
        );
        let orders = orders?;
        log::debug!("aggregating {} orders for {}", orders.len(), period);

        let best_sellers = catalog.unwrap_or_else(|e| {
            log::warn!("best sellers unavailable: {}", e);
            Vec::new()
        });
        Ok(SalesView {
            report: SalesAggregator::aggregate(&orders, status),
            best_sellers,
        })
    }

    /// Single order by id
    pub async fn order(&self, id: u64) -> Result<Option<Order>> {
        self.commerce.get_order(id).await
    }

    /// Walk pages until `total_pages` or the configured cap
    async fn fetch_all_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let per_page = self.settings.sales_page_size;
        let first = self
            .commerce
            .list_orders(&query.clone().page(1, per_page))
            .await?;

        let max_pages = self.settings.max_sales_pages;
        let last_page = first.total_pages.min(max_pages);
        if first.total_pages > max_pages {
            log::warn!(
                "sales window has {} orders over {} pages; aggregating the first {} pages only",
                first.total_count,
                first.total_pages,
                max_pages
            );
        }

        let mut orders = first.orders;
        for page in 2..=last_page {
            let next = self
                .commerce
                .list_orders(&query.clone().page(page, per_page))
                .await?;
            if next.orders.is_empty() {
                break;
            }
            orders.extend(next.orders);
        }
        Ok(orders)
    }

    /// One page of the order listing
    pub async fn orders_page(&self, request: &OrdersRequest) -> Result<OrderPage> {
        let window = DateWindowResolver::resolve_now(request.period, request.range);
        let mut query =
            OrderQuery::new(window, request.status).page(request.page, request.per_page);
        if let Some(term) = &request.search {
            query = query.search(term.as_str());
        }
        self.commerce.list_orders(&query).await
    }

    // ---- traffic sections ----

    async fn report(&self, kind: ReportKind, range: &ReportDateRange) -> Result<Vec<ReportRow>> {
        let rows = self.traffic.run_report(&kind.request(*range)).await?;
        log::debug!("{} report returned {} rows", kind.name(), rows.len());
        Ok(rows)
    }

    pub async fn overview(&self, range: ReportDateRange) -> Result<OverviewResponse> {
        let rows = self.report(ReportKind::Overview, &range).await?;
        Ok(ViewResponse {
            items: TrafficAggregator::overview(&rows),
            meta: RowCountMeta {
                row_count: rows.len() as u64,
            },
        })
    }

    pub async fn timeseries(&self, range: ReportDateRange) -> Result<TimeseriesResponse> {
        let rows = self.report(ReportKind::Timeseries, &range).await?;
        let items = TrafficAggregator::timeseries(&rows);
        let total = items.len() as u64;
        Ok(ViewResponse {
            items,
            meta: TotalMeta { total },
        })
    }

    pub async fn acquisition(&self, range: ReportDateRange) -> Result<GroupedResponse<Acquisition>> {
        let (channels, sources) = tokio::try_join!(
            self.report(ReportKind::Channels, &range),
            self.report(ReportKind::SourceMedium, &range),
        )?;
        Ok(grouped(TrafficAggregator::acquisition(&channels, &sources)))
    }

    pub async fn geo(&self, range: ReportDateRange) -> Result<GroupedResponse<GeoBreakdown>> {
        let region_request = ReportKind::RegionCities
            .request(range)
            .with_filter(DimensionFilter::eq("country", &self.settings.geo_country));
        let (countries, region_cities) = tokio::try_join!(
            self.report(ReportKind::Countries, &range),
            self.traffic.run_report(&region_request),
        )?;
        Ok(grouped(TrafficAggregator::geo(&countries, &region_cities)))
    }

    pub async fn pages(&self, range: ReportDateRange) -> Result<GroupedResponse<PagesBreakdown>> {
        let (pages, landings) = tokio::try_join!(
            self.report(ReportKind::TopPages, &range),
            self.report(ReportKind::LandingPages, &range),
        )?;
        Ok(grouped(TrafficAggregator::pages(&pages, &landings)))
    }

    /// All five sections fetched concurrently. A failed section degrades
    /// to its empty value; the rest of the view is unaffected.
    pub async fn analytics_view(&self, range: ReportDateRange) -> AnalyticsView {
        let (overview, timeseries, acquisition, geo, pages) = tokio::join!(
            self.overview(range),
            self.timeseries(range),
            self.acquisition(range),
            self.geo(range),
            self.pages(range),
        );

        let mut failures = Vec::new();
        AnalyticsView {
            overview: settle("overview", overview, &mut failures)
                .unwrap_or_else(|| ViewResponse {
                    items: TrafficAggregator::overview(&[]),
                    meta: RowCountMeta::default(),
                }),
            timeseries: settle("timeseries", timeseries, &mut failures).unwrap_or_default(),
            acquisition: settle("acquisition", acquisition, &mut failures).unwrap_or_default(),
            geo: settle("geo", geo, &mut failures).unwrap_or_default(),
            pages: settle("pages", pages, &mut failures).unwrap_or_default(),
            failures,
        }
    }

    // ---- realtime ----

    /// Current activity from three concurrent realtime reports
    pub async fn realtime_view(&self) -> Result<RealtimeData> {
        let (total, minutes, locations) = tokio::try_join!(
            self.realtime(RealtimeKind::TotalActive),
            self.realtime(RealtimeKind::PerMinute),
            self.realtime(RealtimeKind::Locations),
        )?;
        Ok(RealtimeAggregator::aggregate(&total, &minutes, &locations))
    }

    async fn realtime(&self, kind: RealtimeKind) -> Result<Vec<ReportRow>> {
        let rows = self.traffic.run_realtime_report(&kind.request()).await?;
        log::debug!("{} report returned {} rows", kind.name(), rows.len());
        Ok(rows)
    }
}

fn settle<T>(
    section: &'static str,
    result: Result<T>,
    failures: &mut Vec<SectionFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("analytics section '{}' unavailable: {}", section, e);
            failures.push(SectionFailure {
                section,
                error: describe(&e),
            });
            None
        }
    }
}

fn describe(error: &StorePulseError) -> String {
    if error.is_misconfiguration() {
        format!("not configured: {}", error)
    } else {
        error.to_string()
    }
}
