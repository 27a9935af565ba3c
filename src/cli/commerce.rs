//! `storepulse sales` and `storepulse orders`

use chrono::NaiveDate;
use clap::Args;

use super::{lines, money, print_json};
use crate::services::decode::parse_measure;
use crate::services::{DashboardService, OrdersRequest, SalesView};
use crate::types::{CustomRange, Order, OrderPage, Period, Result, StatusFilter, StorePulseError};

/// Date window and status shared by the commerce views
#[derive(Args, Debug)]
pub struct WindowArgs {
    /// Period: today, 7d, 30d, 90d or custom [default: 30d, or custom
    /// when --from/--to is given]
    #[arg(long)]
    pub period: Option<Period>,

    /// First day of a custom period (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of a custom period (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Order status, or "all"
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
}

impl WindowArgs {
    pub fn period(&self) -> Period {
        match self.period {
            Some(period) => period,
            None if self.from.is_some() || self.to.is_some() => Period::Custom,
            None => Period::default(),
        }
    }

    pub fn range(&self) -> CustomRange {
        CustomRange {
            from: self.from,
            to: self.to,
        }
    }
}

/// Sales KPIs over a period
#[derive(Args, Debug)]
pub struct SalesArgs {
    #[command(flatten)]
    pub window: WindowArgs,
}

impl SalesArgs {
    pub async fn run(self, dashboard: &DashboardService, json: bool) -> Result<()> {
        let period = self.window.period();
        if period == Period::Custom && self.window.range().bounds().is_none() {
            eprintln!("[storepulse] Warning: custom period needs --from and --to; showing today");
        }

        let report = dashboard
            .sales_view(period, self.window.range(), self.window.status)
            .await?;

        if json {
            print_json(&report)
        } else {
            print!("{}", render_sales(&report, period, self.window.status));
            Ok(())
        }
    }
}

/// Orders listing
#[derive(Args, Debug)]
pub struct OrdersArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Orders per page
    #[arg(long, default_value_t = 10)]
    pub per_page: u32,

    /// Match order number or customer name
    #[arg(long)]
    pub search: Option<String>,

    /// Show a single order by id instead of a listing
    #[arg(long, conflicts_with_all = ["page", "per_page", "search"])]
    pub id: Option<u64>,
}

impl OrdersArgs {
    pub async fn run(self, dashboard: &DashboardService, json: bool) -> Result<()> {
        if let Some(id) = self.id {
            let order = dashboard
                .order(id)
                .await?
                .ok_or(StorePulseError::OrderNotFound(id))?;
            return if json {
                print_json(&order)
            } else {
                print!("{}", render_order(&order));
                Ok(())
            };
        }

        let request = OrdersRequest {
            period: self.window.period(),
            range: self.window.range(),
            status: self.window.status,
            page: self.page,
            per_page: self.per_page,
            search: self.search,
        };
        let page = dashboard.orders_page(&request).await?;

        if json {
            print_json(&page)
        } else {
            print!("{}", render_orders(&page, request.page));
            Ok(())
        }
    }
}

fn render_sales(view: &SalesView, period: Period, status: StatusFilter) -> String {
    let report = &view.report;
    let stats = &report.stats;
    let mut out = vec![
        format!("Sales ({}, status {})", period, status),
        format!("  Revenue         {:>12}", money(stats.total_revenue)),
        format!(
            "  Orders          {:>12}  ({} count toward revenue)",
            stats.total_orders, stats.revenue_order_count
        ),
        format!("  Average ticket  {:>12}", money(stats.average_ticket)),
        format!("  Items sold      {:>12}", stats.total_items),
    ];

    if !report.chart_data.is_empty() {
        out.push("\nDaily".to_string());
        out.extend(report.chart_data.iter().map(|day| {
            format!(
                "  {}  {:>12}  {:>4} orders",
                day.date,
                money(day.revenue),
                day.orders
            )
        }));
    }

    if !report.top_products.is_empty() {
        out.push("\nTop products".to_string());
        out.extend(report.top_products.iter().enumerate().map(|(rank, product)| {
            format!(
                "  {:>2}. {:<36} {:>12}  {:>4} units",
                rank + 1,
                product.name,
                money(product.revenue),
                product.units
            )
        }));
    }

    if !view.best_sellers.is_empty() {
        out.push("\nBest sellers (all time)".to_string());
        out.extend(view.best_sellers.iter().map(|product| {
            format!(
                "  {:<40} {:>6} sold  {:>12}",
                product.name,
                product.total_sales,
                money(product.revenue)
            )
        }));
    }
    lines(out)
}

fn render_orders(page: &OrderPage, current: u32) -> String {
    let mut out = vec![format!(
        "Page {}/{} ({} orders)",
        current.max(1),
        page.total_pages.max(1),
        page.total_count
    )];
    out.extend(page.orders.iter().map(|order| {
        format!(
            "  #{:<8} {}  {:<10} {:>10}  {}",
            order.number,
            order.date_created.format("%Y-%m-%d %H:%M"),
            order.status.as_str(),
            money(parse_measure(&order.total)),
            order.customer_name
        )
    }));
    lines(out)
}

fn render_order(order: &Order) -> String {
    let mut out = vec![
        format!("Order #{} (id {})", order.number, order.id),
        format!("  Customer  {}", order.customer_name),
        format!("  Status    {}", order.status.as_str()),
        format!("  Created   {}", order.date_created.format("%Y-%m-%d %H:%M")),
        format!("  Total     {}", money(parse_measure(&order.total))),
    ];
    if !order.line_items.is_empty() {
        out.push("  Items".to_string());
        out.extend(order.line_items.iter().map(|item| {
            format!(
                "    {:>3} x {:<36} {:>10}",
                item.quantity,
                item.name,
                money(parse_measure(&item.total))
            )
        }));
    }
    lines(out)
}
