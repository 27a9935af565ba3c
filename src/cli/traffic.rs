//! `storepulse analytics` and `storepulse realtime`

use chrono::Local;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Notify;

use super::{lines, print_json};
use crate::services::dashboard::{OverviewResponse, TimeseriesResponse};
use crate::services::{AnalyticsView, DashboardService, RealtimePoller};
use crate::types::{
    metric_info, Acquisition, CustomRange, GeoBreakdown, MetricInfo, PagesBreakdown, Period,
    RealtimeData, ReportDateRange, Result, StorePulseError, METRIC_GLOSSARY,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Section {
    All,
    Overview,
    Timeseries,
    Acquisition,
    Geo,
    Pages,
}

/// Traffic report over a date range
#[derive(Args, Debug)]
pub struct AnalyticsArgs {
    /// Named period instead of explicit dates: today, 7d, 30d or 90d
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub period: Option<Period>,

    /// Start date: today, yesterday, NdaysAgo or YYYY-MM-DD [default: 30daysAgo]
    #[arg(long)]
    pub from: Option<String>,

    /// End date, same formats as --from [default: today]
    #[arg(long)]
    pub to: Option<String>,

    /// Report a single section
    #[arg(long, value_enum, default_value_t = Section::All)]
    pub section: Section,

    /// Explain each metric instead of reporting
    #[arg(long)]
    pub explain: bool,

    /// Explain a single metric by key (implies --explain)
    #[arg(long, value_name = "KEY")]
    pub metric: Option<String>,
}

impl AnalyticsArgs {
    fn range(&self) -> Result<ReportDateRange> {
        match self.period {
            Some(period) => Ok(ReportDateRange::for_period(period, CustomRange::default())),
            None => ReportDateRange::from_tokens(self.from.as_deref(), self.to.as_deref()),
        }
    }

    fn glossary(&self) -> Result<&'static [MetricInfo]> {
        match self.metric.as_deref() {
            None => Ok(METRIC_GLOSSARY),
            Some(key) => metric_info(key)
                .map(std::slice::from_ref)
                .ok_or_else(|| StorePulseError::Parse(format!("unknown metric: {}", key))),
        }
    }

    pub async fn run(self, dashboard: &DashboardService, json: bool) -> Result<()> {
        if self.explain || self.metric.is_some() {
            let glossary = self.glossary()?;
            return if json {
                print_json(&glossary)
            } else {
                print!("{}", render_glossary(glossary));
                Ok(())
            };
        }

        let range = self.range()?;
        match self.section {
            Section::All => {
                let view = dashboard.analytics_view(range).await;
                for failure in &view.failures {
                    eprintln!(
                        "[storepulse] Warning: {} unavailable: {}",
                        failure.section, failure.error
                    );
                }
                if json {
                    print_json(&view)
                } else {
                    print!("{}", render_analytics(&view));
                    Ok(())
                }
            }
            Section::Overview => {
                let overview = dashboard.overview(range).await?;
                emit(json, &overview, || render_overview(&overview))
            }
            Section::Timeseries => {
                let series = dashboard.timeseries(range).await?;
                emit(json, &series, || render_timeseries(&series))
            }
            Section::Acquisition => {
                let acquisition = dashboard.acquisition(range).await?;
                emit(json, &acquisition, || render_acquisition(&acquisition.meta))
            }
            Section::Geo => {
                let geo = dashboard.geo(range).await?;
                emit(json, &geo, || render_geo(&geo.meta))
            }
            Section::Pages => {
                let pages = dashboard.pages(range).await?;
                emit(json, &pages, || render_pages(&pages.meta))
            }
        }
    }
}

fn emit<T, F>(json: bool, value: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    if json {
        print_json(value)
    } else {
        print!("{}", text());
        Ok(())
    }
}

/// Current activity, once or on an interval
#[derive(Args, Debug)]
pub struct RealtimeArgs {
    /// Keep polling until Ctrl-C
    #[arg(long)]
    pub watch: bool,
}

impl RealtimeArgs {
    pub async fn run(self, dashboard: Arc<DashboardService>, json: bool) -> Result<()> {
        if !self.watch {
            let data = dashboard.realtime_view().await?;
            return if json {
                print_json(&data)
            } else {
                print!("{}", render_realtime(&data));
                Ok(())
            };
        }

        let interval = dashboard.settings().realtime_interval;
        let poller = RealtimePoller::new(dashboard, interval);

        // A misconfigured source fails every poll; stop on the first one
        let misconfigured = Arc::new(Notify::new());
        let stop = {
            let misconfigured = misconfigured.clone();
            async move {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = misconfigured.notified() => {}
                }
            }
        };

        let mut fatal = None;
        poller
            .run(
                |outcome| match outcome {
                    Ok(data) if json => match serde_json::to_string(&data) {
                        Ok(line) => println!("{}", line),
                        Err(e) => eprintln!("[storepulse] Warning: {}", e),
                    },
                    Ok(data) => {
                        println!("-- {} --", Local::now().format("%H:%M:%S"));
                        print!("{}", render_realtime(&data));
                    }
                    Err(e) if e.is_misconfiguration() => {
                        misconfigured.notify_one();
                        if fatal.is_none() {
                            fatal = Some(e);
                        }
                    }
                    Err(e) => eprintln!("[storepulse] Warning: realtime poll failed: {}", e),
                },
                stop,
            )
            .await;

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn render_glossary(glossary: &[MetricInfo]) -> String {
    let mut out = Vec::new();
    for info in glossary {
        out.push(format!("{} ({})", info.title, info.key));
        out.push(format!("  {}", info.definition));
        if let Some(how) = info.how_measured {
            out.push(format!("  How it is measured: {}", how));
        }
        if let Some(tip) = info.tip {
            out.push(format!("  Tip: {}", tip));
        }
    }
    lines(out)
}

fn render_analytics(view: &AnalyticsView) -> String {
    [
        render_overview(&view.overview),
        render_timeseries(&view.timeseries),
        render_acquisition(&view.acquisition.meta),
        render_geo(&view.geo.meta),
        render_pages(&view.pages.meta),
    ]
    .join("\n")
}

fn render_overview(overview: &OverviewResponse) -> String {
    let mut out = vec!["Overview".to_string()];
    if let Some(o) = overview.items.first() {
        out.extend([
            format!("  Sessions           {:>10}", o.sessions),
            format!("  Users              {:>10}", o.total_users),
            format!("  Page views         {:>10}", o.screen_page_views),
            format!("  Engaged sessions   {:>10}", o.engaged_sessions),
            format!("  Avg. duration      {:>9.0}s", o.average_session_duration),
            format!("  Engagement rate    {:>9.1}%", o.engagement_rate * 100.0),
            format!("  Sessions per user  {:>10.2}", o.sessions_per_user),
        ]);
    }
    lines(out)
}

fn render_timeseries(series: &TimeseriesResponse) -> String {
    let mut out = vec![format!("Daily traffic ({} days)", series.meta.total)];
    out.extend(series.items.iter().map(|point| {
        format!(
            "  {}  {:>6} sessions  {:>6} users  {:>6} views",
            point.date, point.sessions, point.users, point.pageviews
        )
    }));
    lines(out)
}

fn render_acquisition(acquisition: &Acquisition) -> String {
    let mut out = vec!["Channels".to_string()];
    out.extend(
        acquisition
            .channels
            .iter()
            .map(|row| format!("  {:<32} {:>8}", row.name, row.sessions)),
    );
    out.push("Source / medium".to_string());
    out.extend(
        acquisition
            .sources
            .iter()
            .map(|row| format!("  {:<32} {:>8}", row.name, row.sessions)),
    );
    lines(out)
}

fn render_geo(geo: &GeoBreakdown) -> String {
    let mut out = vec!["Countries".to_string()];
    out.extend(geo.countries.iter().map(|row| {
        format!(
            "  {:<24} {:>8} sessions {:>8} users",
            row.country, row.sessions, row.total_users
        )
    }));
    out.push("Regions".to_string());
    out.extend(
        geo.regions
            .iter()
            .map(|row| format!("  {:<24} {:>8}", row.name, row.sessions)),
    );
    out.push("Cities".to_string());
    out.extend(
        geo.cities
            .iter()
            .map(|row| format!("  {:<24} {:<20} {:>8}", row.city, row.region, row.sessions)),
    );
    lines(out)
}

fn render_pages(pages: &PagesBreakdown) -> String {
    let mut out = vec!["Top pages".to_string()];
    out.extend(
        pages
            .pages
            .iter()
            .map(|row| format!("  {:<40} {:>8}", row.path, row.views)),
    );
    out.push("Landing pages".to_string());
    out.extend(pages.landings.iter().map(|row| {
        format!(
            "  {:<40} {:>8} {:>8} {:>6.1}%",
            row.path, row.sessions, row.engaged, row.rate
        )
    }));
    lines(out)
}

fn render_realtime(data: &RealtimeData) -> String {
    let mut out = vec![format!("Active users: {}", data.total_active)];
    if !data.chart_data.is_empty() {
        out.push("Per minute".to_string());
        out.extend(
            data.chart_data
                .iter()
                .map(|bucket| format!("  -{:>2} min  {:>4}", bucket.min_ago, bucket.users)),
        );
    }
    for (title, rows) in [
        ("Top countries", &data.top_countries),
        ("Top cities", &data.top_cities),
    ] {
        if !rows.is_empty() {
            out.push(title.to_string());
            out.extend(
                rows.iter()
                    .map(|row| format!("  {:<24} {:>4}", row.name, row.count)),
            );
        }
    }
    lines(out)
}
