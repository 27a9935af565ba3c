//! In-memory order store implementing the commerce source contract

use async_trait::async_trait;
use std::collections::HashMap;

use super::{CommerceSource, OrderQuery};
use crate::services::decode::parse_measure;
use crate::types::{CatalogProduct, Order, OrderPage, Result};

/// Orders held in memory, queried like the commerce REST listing:
/// newest first, filtered by window, status and search term, paginated.
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    orders: Vec<Order>,
}

impl OrderStore {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Run `query` synchronously
    pub fn query(&self, query: &OrderQuery) -> OrderPage {
        let needle = query.search.as_deref().map(|s| s.trim().to_lowercase());

        let mut matched: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| query.window.contains(&o.date_created))
            .filter(|o| query.status.admits(o.status))
            .filter(|o| match &needle {
                Some(term) => matches_search(o, term),
                None => true,
            })
            .collect();
        matched.sort_by(|a, b| b.date_created.cmp(&a.date_created).then(b.id.cmp(&a.id)));

        let per_page = query.per_page.max(1) as usize;
        let page = query.page.max(1) as usize;
        let total_count = matched.len();
        let total_pages = total_count.div_ceil(per_page);

        let orders = matched
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect();

        OrderPage {
            orders,
            total_count: total_count as u64,
            total_pages: total_pages as u32,
        }
    }

    pub fn get(&self, id: u64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Products ranked by units sold in paid (completed or processing)
    /// orders, descending, truncated to `limit`. Ties keep first-seen order.
    pub fn best_sellers(&self, limit: usize) -> Vec<CatalogProduct> {
        let mut paid: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| o.status.is_revenue_status())
            .collect();
        paid.sort_by_key(|o| o.date_created);

        let mut ranking: Vec<CatalogProduct> = Vec::new();
        let mut index: HashMap<u64, usize> = HashMap::new();
        for item in paid.iter().flat_map(|o| &o.line_items) {
            let pos = *index.entry(item.product_id).or_insert_with(|| {
                ranking.push(CatalogProduct {
                    id: item.product_id,
                    name: item.name.clone(),
                    total_sales: 0,
                    price: 0.0,
                    revenue: 0.0,
                });
                ranking.len() - 1
            });

            let product = &mut ranking[pos];
            product.total_sales = product.total_sales.saturating_add(u64::from(item.quantity));
            if item.quantity > 0 {
                product.price = parse_measure(&item.total) / f64::from(item.quantity);
            }
        }

        for product in &mut ranking {
            product.revenue = product.price * product.total_sales as f64;
        }
        ranking.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
        ranking.truncate(limit);
        ranking
    }
}

/// Case-insensitive match on order number and customer name
fn matches_search(order: &Order, term: &str) -> bool {
    order.number.to_lowercase().contains(term) || order.customer_name.to_lowercase().contains(term)
}

#[async_trait]
impl CommerceSource for OrderStore {
    async fn list_orders(&self, query: &OrderQuery) -> Result<OrderPage> {
        Ok(self.query(query))
    }

    async fn get_order(&self, id: u64) -> Result<Option<Order>> {
        Ok(self.get(id).cloned())
    }

    async fn best_sellers(&self, limit: usize) -> Result<Vec<CatalogProduct>> {
        Ok(self.best_sellers(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AggregationWindow, LineItem, OrderStatus, StatusFilter};
    use chrono::{TimeZone, Utc};

    fn order(id: u64, status: OrderStatus, day: u32, customer: &str) -> Order {
        Order {
            id,
            number: format!("{}", 1000 + id),
            customer_name: customer.to_string(),
            status,
            total: "10.00".into(),
            date_created: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            line_items: vec![LineItem {
                product_id: 1,
                name: "Course".into(),
                quantity: 1,
                total: "10.00".into(),
            }],
        }
    }

    fn may() -> AggregationWindow {
        AggregationWindow {
            after: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            before: Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap(),
        }
    }

    fn store() -> OrderStore {
        OrderStore::new(vec![
            order(1, OrderStatus::Completed, 1, "Ana Souza"),
            order(2, OrderStatus::Pending, 2, "Bruno Lima"),
            order(3, OrderStatus::Completed, 3, "Carla Souza"),
            order(4, OrderStatus::Cancelled, 4, "Diego Alves"),
            order(5, OrderStatus::Completed, 5, "Elisa Rocha"),
        ])
    }

    #[test]
    fn test_query_all_statuses_newest_first() {
        let page = store().query(&OrderQuery::new(may(), StatusFilter::All));
        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages, 1);
        let ids: Vec<u64> = page.orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_query_status_filter() {
        let query = OrderQuery::new(may(), StatusFilter::Only(OrderStatus::Completed));
        let page = store().query(&query);
        assert_eq!(page.total_count, 3);
        assert!(page.orders.iter().all(|o| o.status == OrderStatus::Completed));
    }

    #[test]
    fn test_query_window_excludes_outside() {
        let window = AggregationWindow {
            after: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
            before: Utc.with_ymd_and_hms(2024, 5, 3, 23, 59, 59).unwrap(),
        };
        let page = store().query(&OrderQuery::new(window, StatusFilter::All));
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn test_query_search_customer_and_number() {
        let by_name = store().query(&OrderQuery::new(may(), StatusFilter::All).search("souza"));
        assert_eq!(by_name.total_count, 2);

        let by_number = store().query(&OrderQuery::new(may(), StatusFilter::All).search("1004"));
        assert_eq!(by_number.total_count, 1);
        assert_eq!(by_number.orders[0].id, 4);
    }

    #[test]
    fn test_query_search_ignores_other_fields() {
        // Status and product names are not searchable
        let page = store().query(&OrderQuery::new(may(), StatusFilter::All).search("course"));
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn test_query_pagination() {
        let query = OrderQuery::new(may(), StatusFilter::All).page(2, 2);
        let page = store().query(&query);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages, 3);
        let ids: Vec<u64> = page.orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 2]);

        let past_end = store().query(&OrderQuery::new(may(), StatusFilter::All).page(9, 2));
        assert!(past_end.orders.is_empty());
        assert_eq!(past_end.total_pages, 3);
    }

    #[test]
    fn test_query_zero_page_values_are_clamped() {
        let page = store().query(&OrderQuery::new(may(), StatusFilter::All).page(0, 0));
        assert_eq!(page.orders.len(), 1);
        assert_eq!(page.total_pages, 5);
    }

    #[test]
    fn test_get_by_id() {
        let store = store();
        assert_eq!(store.get(3).map(|o| o.customer_name.as_str()), Some("Carla Souza"));
        assert!(store.get(42).is_none());
    }

    fn sale(
        id: u64,
        status: OrderStatus,
        day: u32,
        product_id: u64,
        quantity: u32,
        total: &str,
    ) -> Order {
        let mut o = order(id, status, day, "Buyer");
        o.line_items = vec![LineItem {
            product_id,
            name: format!("Product {}", product_id),
            quantity,
            total: total.into(),
        }];
        o
    }

    #[test]
    fn test_best_sellers_ranked_by_paid_units() {
        let store = OrderStore::new(vec![
            sale(1, OrderStatus::Completed, 1, 10, 1, "50.00"),
            sale(2, OrderStatus::Processing, 2, 20, 3, "90.00"),
            sale(3, OrderStatus::Cancelled, 3, 10, 9, "450.00"),
            sale(4, OrderStatus::Completed, 4, 10, 1, "60.00"),
            sale(5, OrderStatus::Completed, 5, 30, 2, "20.00"),
        ]);

        let top = store.best_sellers(10);

        let ids: Vec<u64> = top.iter().map(|p| p.id).collect();
        // 10 and 30 tie on two units; 10 was seen first
        assert_eq!(ids, vec![20, 10, 30]);
        assert_eq!(top[0].total_sales, 3);
        assert_eq!(top[0].price, 30.0);
        assert_eq!(top[0].revenue, 90.0);
        // Latest price wins; cancelled units are not sales
        assert_eq!(top[1].total_sales, 2);
        assert_eq!(top[1].price, 60.0);
        assert_eq!(top[1].revenue, 120.0);
    }

    #[test]
    fn test_best_sellers_limit_and_empty() {
        assert!(OrderStore::default().best_sellers(6).is_empty());
        assert_eq!(store().best_sellers(0).len(), 0);
        assert_eq!(store().best_sellers(6).len(), 1);
    }

    #[tokio::test]
    async fn test_get_order_via_trait() {
        let source: &dyn CommerceSource = &store();
        assert_eq!(source.get_order(5).await.unwrap().map(|o| o.id), Some(5));
        assert_eq!(source.get_order(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_orders_via_trait() {
        let source: &dyn CommerceSource = &store();
        let page = source
            .list_orders(&OrderQuery::new(may(), StatusFilter::All))
            .await
            .unwrap();
        assert_eq!(page.total_count, 5);
    }
}
