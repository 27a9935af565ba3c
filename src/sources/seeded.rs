//! Deterministic demo data
//!
//! Every value is drawn from a seeded PCG stream, so the same seed and
//! anchor date always produce the same store. Orders and traffic use
//! separate streams; changing one generator never shifts the other.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use super::facts::{ActiveUserFact, TrafficDump, TrafficFact};
use crate::types::{LineItem, Order, OrderStatus};

const ORDER_STREAM: u64 = 1;
const TRAFFIC_STREAM: u64 = 2;

/// Days of history generated before the anchor date
pub const HISTORY_DAYS: i64 = 90;

/// A named, reproducible random stream
pub struct SeededRng {
    inner: Pcg64Mcg,
}

impl SeededRng {
    pub fn new(seed: u64, stream: u64) -> Self {
        let derived = seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived),
        }
    }

    /// Float in [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Integer in [0, n); 0 when `n` is 0
    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.below(items.len() as u64) as usize)
    }

    /// Pick by cumulative weight
    fn weighted<'a, T>(&mut self, items: &'a [(T, f64)]) -> Option<&'a T> {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for (item, weight) in items {
            if roll < *weight {
                return Some(item);
            }
            roll -= weight;
        }
        items.last().map(|(item, _)| item)
    }
}

struct Product {
    id: u64,
    name: &'static str,
    price: f64,
}

const CATALOG: &[Product] = &[
    Product { id: 101, name: "Online Course: Sourdough Basics", price: 197.0 },
    Product { id: 102, name: "Masterclass: Laminated Doughs", price: 347.0 },
    Product { id: 103, name: "Starter Kit", price: 89.9 },
    Product { id: 104, name: "Recipe eBook", price: 39.9 },
    Product { id: 105, name: "Proofing Basket", price: 59.0 },
    Product { id: 106, name: "Bench Scraper", price: 24.5 },
    Product { id: 107, name: "Mentorship Session", price: 450.0 },
    Product { id: 108, name: "Flour Sampler", price: 72.0 },
];

const STATUS_WEIGHTS: &[(OrderStatus, f64)] = &[
    (OrderStatus::Completed, 0.55),
    (OrderStatus::Processing, 0.15),
    (OrderStatus::OnHold, 0.08),
    (OrderStatus::Pending, 0.08),
    (OrderStatus::Cancelled, 0.07),
    (OrderStatus::Refunded, 0.04),
    (OrderStatus::Failed, 0.03),
];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elisa", "Fábio", "Gabriela", "Heitor", "Isabela", "João",
];
const LAST_NAMES: &[&str] = &[
    "Souza", "Lima", "Alves", "Rocha", "Costa", "Pereira", "Martins", "Ribeiro",
];

/// Generate `count` orders spread over the `HISTORY_DAYS` days ending at `anchor`.
/// Ids and numbers grow with creation time.
pub fn generate_orders(seed: u64, anchor: DateTime<Utc>, count: usize) -> Vec<Order> {
    let mut rng = SeededRng::new(seed, ORDER_STREAM);
    let span_secs = HISTORY_DAYS * 24 * 60 * 60;

    let mut offsets: Vec<i64> = (0..count)
        .map(|_| rng.below(span_secs as u64) as i64)
        .collect();
    // Largest offset first, so ids increase with time
    offsets.sort_unstable_by(|a, b| b.cmp(a));

    offsets
        .into_iter()
        .enumerate()
        .map(|(i, offset)| {
            let id = 5000 + i as u64;
            let status = rng
                .weighted(STATUS_WEIGHTS)
                .copied()
                .unwrap_or(OrderStatus::Completed);

            let item_count = 1 + rng.below(3) as usize;
            let mut line_items = Vec::with_capacity(item_count);
            let mut total = 0.0;
            for _ in 0..item_count {
                let Some(product) = rng.pick(CATALOG) else {
                    continue;
                };
                let quantity = if rng.chance(0.2) { 2 } else { 1 };
                let line_total = product.price * quantity as f64;
                total += line_total;
                line_items.push(LineItem {
                    product_id: product.id,
                    name: product.name.to_string(),
                    quantity,
                    total: format!("{:.2}", line_total),
                });
            }

            let first = rng.pick(FIRST_NAMES).copied().unwrap_or("Ana");
            let last = rng.pick(LAST_NAMES).copied().unwrap_or("Souza");

            Order {
                id,
                number: id.to_string(),
                customer_name: format!("{} {}", first, last),
                status,
                total: format!("{:.2}", total),
                date_created: anchor - Duration::seconds(offset),
                line_items,
            }
        })
        .collect()
}

const CHANNELS: &[(&str, &str, f64)] = &[
    ("Organic Search", "google / organic", 0.38),
    ("Direct", "(direct) / (none)", 0.24),
    ("Organic Social", "instagram.com / referral", 0.16),
    ("Paid Search", "google / cpc", 0.12),
    ("Email", "newsletter / email", 0.06),
    ("Referral", "blog.example.com / referral", 0.04),
];

const LOCATIONS: &[(&str, &str, &str, f64)] = &[
    ("Brazil", "São Paulo", "São Paulo", 0.30),
    ("Brazil", "São Paulo", "Campinas", 0.08),
    ("Brazil", "Rio de Janeiro", "Rio de Janeiro", 0.15),
    ("Brazil", "Minas Gerais", "Belo Horizonte", 0.09),
    ("Brazil", "Paraná", "Curitiba", 0.07),
    ("Brazil", "Rio Grande do Sul", "Porto Alegre", 0.05),
    ("Brazil", "Pernambuco", "Recife", 0.04),
    ("Brazil", "Bahia", "(not set)", 0.03),
    ("Portugal", "Lisbon", "Lisbon", 0.07),
    ("Portugal", "Porto", "Porto", 0.03),
    ("United States", "Florida", "Miami", 0.05),
    ("Argentina", "Buenos Aires", "Buenos Aires", 0.04),
];

const PAGES: &[(&str, f64)] = &[
    ("/", 0.30),
    ("/courses/sourdough-basics", 0.18),
    ("/shop", 0.14),
    ("/blog/starter-guide", 0.12),
    ("/courses/laminated-doughs", 0.10),
    ("/cart", 0.08),
    ("/checkout", 0.05),
    ("/about", 0.03),
];

/// Realtime window in minutes
const REALTIME_MINUTES: u32 = 30;

/// Generate `HISTORY_DAYS` days of traffic ending at `today`, plus a
/// realtime snapshot
pub fn generate_traffic(seed: u64, today: NaiveDate) -> TrafficDump {
    let mut rng = SeededRng::new(seed, TRAFFIC_STREAM);
    let mut facts = Vec::new();

    for back in (0..HISTORY_DAYS).rev() {
        let date = today - Duration::days(back);
        // Weekly rhythm plus noise
        let weekday_boost = if back % 7 < 2 { 0.8 } else { 1.0 };
        let daily = (140.0 + rng.next_f64() * 80.0) * weekday_boost;

        for _ in 0..12 {
            let channel = rng.weighted_triplet(CHANNELS);
            let location = rng.weighted_location(LOCATIONS);
            let landing = rng.weighted(PAGES).copied().unwrap_or("/");
            let page = rng.weighted(PAGES).copied().unwrap_or("/");

            let sessions = ((daily / 12.0) * (0.5 + rng.next_f64())).round() as u64;
            if sessions == 0 {
                continue;
            }
            let users = (sessions as f64 * (0.75 + rng.next_f64() * 0.2)).round() as u64;
            let engaged = (sessions as f64 * (0.45 + rng.next_f64() * 0.3)).round() as u64;
            let pageviews = sessions + rng.below(sessions * 2 + 1);

            facts.push(TrafficFact {
                date,
                channel: channel.0.to_string(),
                source_medium: channel.1.to_string(),
                country: location.0.to_string(),
                region: location.1.to_string(),
                city: location.2.to_string(),
                page_path: page.to_string(),
                landing_page: landing.to_string(),
                sessions,
                users: users.max(1),
                pageviews,
                engaged_sessions: engaged,
                engagement_seconds: sessions as f64 * (40.0 + rng.next_f64() * 120.0),
            });
        }
    }

    let mut active = Vec::new();
    for minutes_ago in 0..REALTIME_MINUTES {
        if !rng.chance(0.7) {
            continue;
        }
        let location = rng.weighted_location(LOCATIONS);
        active.push(ActiveUserFact {
            minutes_ago,
            country: location.0.to_string(),
            city: location.2.to_string(),
            active_users: 1 + rng.below(4),
        });
    }

    TrafficDump { facts, active }
}

impl SeededRng {
    fn weighted_triplet(&mut self, items: &[(&'static str, &'static str, f64)]) -> (&'static str, &'static str) {
        let mut roll = self.next_f64() * items.iter().map(|i| i.2).sum::<f64>();
        for &(a, b, weight) in items {
            if roll < weight {
                return (a, b);
            }
            roll -= weight;
        }
        items.last().map(|&(a, b, _)| (a, b)).unwrap_or(("Direct", "(direct) / (none)"))
    }

    fn weighted_location(
        &mut self,
        items: &[(&'static str, &'static str, &'static str, f64)],
    ) -> (&'static str, &'static str, &'static str) {
        let mut roll = self.next_f64() * items.iter().map(|i| i.3).sum::<f64>();
        for &(country, region, city, weight) in items {
            if roll < weight {
                return (country, region, city);
            }
            roll -= weight;
        }
        items
            .last()
            .map(|&(country, region, city, _)| (country, region, city))
            .unwrap_or(("Brazil", "São Paulo", "São Paulo"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    // ========== SeededRng ==========

    #[test]
    fn test_rng_is_deterministic() {
        let mut a = SeededRng::new(42, 1);
        let mut b = SeededRng::new(42, 1);
        for _ in 0..100 {
            assert_eq!(a.below(1000), b.below(1000));
        }
    }

    #[test]
    fn test_rng_streams_differ() {
        let mut a = SeededRng::new(42, 1);
        let mut b = SeededRng::new(42, 2);
        let xs: Vec<u64> = (0..10).map(|_| a.below(u64::MAX)).collect();
        let ys: Vec<u64> = (0..10).map(|_| b.below(u64::MAX)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_rng_float_range_and_edge_cases() {
        let mut rng = SeededRng::new(7, 0);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
        assert_eq!(rng.below(0), 0);
        assert!(rng.pick::<u8>(&[]).is_none());
    }

    // ========== generate_orders ==========

    #[test]
    fn test_generate_orders_deterministic() {
        assert_eq!(
            generate_orders(9, anchor(), 50),
            generate_orders(9, anchor(), 50)
        );
        assert_ne!(
            generate_orders(9, anchor(), 50),
            generate_orders(10, anchor(), 50)
        );
    }

    #[test]
    fn test_generate_orders_within_history() {
        let orders = generate_orders(1, anchor(), 200);
        assert_eq!(orders.len(), 200);
        let earliest = anchor() - Duration::days(HISTORY_DAYS);
        for order in &orders {
            assert!(order.date_created <= anchor());
            assert!(order.date_created > earliest);
            assert!(!order.line_items.is_empty() && order.line_items.len() <= 3);
        }
    }

    #[test]
    fn test_generate_orders_totals_match_line_items() {
        for order in generate_orders(3, anchor(), 30) {
            let sum: f64 = order
                .line_items
                .iter()
                .map(|i| i.total.parse::<f64>().unwrap())
                .sum();
            let total: f64 = order.total.parse().unwrap();
            assert!((sum - total).abs() < 0.01);
        }
    }

    #[test]
    fn test_generate_orders_ids_follow_time() {
        let orders = generate_orders(5, anchor(), 40);
        for pair in orders.windows(2) {
            assert!(pair[0].id < pair[1].id);
            assert!(pair[0].date_created <= pair[1].date_created);
        }
    }

    // ========== generate_traffic ==========

    #[test]
    fn test_generate_traffic_deterministic() {
        assert_eq!(generate_traffic(4, today()), generate_traffic(4, today()));
    }

    #[test]
    fn test_generate_traffic_covers_history() {
        let dump = generate_traffic(4, today());
        let first = dump.facts.iter().map(|f| f.date).min().unwrap();
        let last = dump.facts.iter().map(|f| f.date).max().unwrap();
        assert_eq!(last, today());
        assert_eq!(first, today() - Duration::days(HISTORY_DAYS - 1));
        assert!(dump.facts.iter().all(|f| f.engaged_sessions <= f.sessions));
        assert!(dump.active.iter().all(|a| a.minutes_ago < REALTIME_MINUTES));
    }
}
