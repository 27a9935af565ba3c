//! Order revenue aggregation for the sales view

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::services::decode::parse_measure;
use crate::types::{DailySales, Order, ProductSales, SalesReport, SalesStats, StatusFilter};

/// Number of entries kept in the product ranking
pub const TOP_PRODUCTS: usize = 10;

/// Aggregator for order batches
pub struct SalesAggregator;

impl SalesAggregator {
    /// KPIs, per-day series and top products for one batch of orders.
    ///
    /// `filter` is the status filter the batch was fetched with; it decides
    /// which orders are revenue-valid (see `StatusFilter::is_revenue_valid`).
    pub fn aggregate(orders: &[Order], filter: StatusFilter) -> SalesReport {
        SalesReport {
            stats: Self::stats(orders, filter),
            chart_data: Self::daily(orders, filter),
            top_products: Self::top_products(orders, filter, TOP_PRODUCTS),
        }
    }

    /// Revenue, order, ticket and item KPIs
    pub fn stats(orders: &[Order], filter: StatusFilter) -> SalesStats {
        let mut stats = SalesStats::default();

        for order in orders {
            stats.total_orders = stats.total_orders.saturating_add(1);

            if filter.is_revenue_valid(order.status) {
                stats.total_revenue += parse_measure(&order.total);
                stats.revenue_order_count = stats.revenue_order_count.saturating_add(1);
            }

            // Items count regardless of revenue validity
            for item in &order.line_items {
                stats.total_items = stats.total_items.saturating_add(u64::from(item.quantity));
            }
        }

        stats.average_ticket = if stats.revenue_order_count > 0 {
            stats.total_revenue / stats.revenue_order_count as f64
        } else {
            0.0
        };
        stats
    }

    /// Per-day revenue and order counts (sorted by date ascending)
    pub fn daily(orders: &[Order], filter: StatusFilter) -> Vec<DailySales> {
        let mut by_date: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();

        for order in orders {
            let date = order.created_date();
            let day = by_date.entry(date).or_insert_with(|| DailySales {
                date,
                revenue: 0.0,
                orders: 0,
            });

            if filter.is_revenue_valid(order.status) {
                day.revenue += parse_measure(&order.total);
            }
            day.orders = day.orders.saturating_add(1);
        }

        by_date.into_values().collect()
    }

    /// Products ranked by revenue, descending, truncated to `limit`.
    ///
    /// Units count every line item; revenue only counts line items of
    /// revenue-valid orders. Ties keep first-seen order.
    pub fn top_products(orders: &[Order], filter: StatusFilter, limit: usize) -> Vec<ProductSales> {
        let mut ranking: Vec<ProductSales> = Vec::new();
        let mut index: HashMap<u64, usize> = HashMap::new();

        for order in orders {
            let revenue_valid = filter.is_revenue_valid(order.status);

            for item in &order.line_items {
                let pos = *index.entry(item.product_id).or_insert_with(|| {
                    ranking.push(ProductSales {
                        product_id: item.product_id,
                        name: item.name.clone(),
                        revenue: 0.0,
                        units: 0,
                    });
                    ranking.len() - 1
                });

                let product = &mut ranking[pos];
                if revenue_valid {
                    product.revenue += parse_measure(&item.total);
                }
                product.units = product.units.saturating_add(u64::from(item.quantity));
            }
        }

        // Stable: equal revenue keeps insertion order
        ranking.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        ranking.truncate(limit);
        ranking
    }
}
