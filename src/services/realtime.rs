//! Realtime snapshot aggregation

use std::collections::HashMap;

use crate::services::decode::{decode_rows, RowReader};
use crate::types::{LocationCount, LocationRow, MinuteBucket, RealtimeData, ReportRow};

/// Countries and cities kept in the location breakdown
pub const TOP_LOCATIONS: usize = 5;

/// City placeholder emitted when the source could not attribute a city
pub const NOT_SET: &str = "(not set)";

/// Aggregator for realtime snapshots
pub struct RealtimeAggregator;

impl RealtimeAggregator {
    /// Combine the three realtime snapshots into one view
    pub fn aggregate(
        total_rows: &[ReportRow],
        minute_rows: &[ReportRow],
        location_rows: &[ReportRow],
    ) -> RealtimeData {
        let (top_countries, top_cities) = Self::locations(location_rows);
        RealtimeData {
            total_active: Self::total_active(total_rows),
            chart_data: Self::per_minute(minute_rows),
            top_countries,
            top_cities,
        }
    }

    /// First row's single metric, 0 when absent
    pub fn total_active(rows: &[ReportRow]) -> u64 {
        rows.first()
            .map(|row| RowReader::new(row).count(0))
            .unwrap_or(0)
    }

    /// Buckets sorted oldest first (largest "minutes ago" first)
    pub fn per_minute(rows: &[ReportRow]) -> Vec<MinuteBucket> {
        let mut buckets = decode_rows::<MinuteBucket>(rows);
        buckets.sort_by(|a, b| b.min_ago.cmp(&a.min_ago));
        buckets
    }

    /// Top countries and top cities by active users.
    ///
    /// A country appears once per city and is summed. `(not set)` cities
    /// are left out of the city ranking but still count for their country.
    pub fn locations(rows: &[ReportRow]) -> (Vec<LocationCount>, Vec<LocationCount>) {
        let mut countries = Tally::default();
        let mut cities = Tally::default();

        for row in decode_rows::<LocationRow>(rows) {
            countries.add(&row.country, row.active_users);
            if row.city != NOT_SET {
                cities.add(&row.city, row.active_users);
            }
        }

        (countries.top(TOP_LOCATIONS), cities.top(TOP_LOCATIONS))
    }
}

/// Insertion-ordered counter; ties rank by first appearance
#[derive(Default)]
struct Tally {
    counts: Vec<LocationCount>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, name: &str, count: u64) {
        match self.index.get(name) {
            Some(&pos) => {
                self.counts[pos].count = self.counts[pos].count.saturating_add(count);
            }
            None => {
                self.index.insert(name.to_string(), self.counts.len());
                self.counts.push(LocationCount {
                    name: name.to_string(),
                    count,
                });
            }
        }
    }

    fn top(mut self, limit: usize) -> Vec<LocationCount> {
        self.counts.sort_by(|a, b| b.count.cmp(&a.count));
        self.counts.truncate(limit);
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(country: &str, city: &str, users: &str) -> ReportRow {
        ReportRow::new([country, city], [users])
    }

    // ========== total_active ==========

    #[test]
    fn test_total_active_first_row() {
        let rows = vec![ReportRow::new(Vec::<String>::new(), ["17"])];
        assert_eq!(RealtimeAggregator::total_active(&rows), 17);
    }

    #[test]
    fn test_total_active_empty_is_zero() {
        assert_eq!(RealtimeAggregator::total_active(&[]), 0);
        assert_eq!(RealtimeAggregator::total_active(&[ReportRow::default()]), 0);
    }

    // ========== per_minute ==========

    #[test]
    fn test_per_minute_oldest_first() {
        let rows = vec![
            ReportRow::new(["00"], ["4"]),
            ReportRow::new(["29"], ["1"]),
            ReportRow::new(["05"], ["2"]),
        ];

        let buckets = RealtimeAggregator::per_minute(&rows);

        let minutes: Vec<u64> = buckets.iter().map(|b| b.min_ago).collect();
        assert_eq!(minutes, vec![29, 5, 0]);
        assert_eq!(buckets.last().unwrap().users, 4);
    }

    // ========== locations ==========

    #[test]
    fn test_locations_not_set_city_counts_for_country_only() {
        let rows = vec![
            location("Brazil", "São Paulo", "3"),
            location("Brazil", NOT_SET, "2"),
            location("Portugal", "Lisbon", "1"),
        ];

        let (countries, cities) = RealtimeAggregator::locations(&rows);

        assert_eq!(countries[0].name, "Brazil");
        assert_eq!(countries[0].count, 5);
        assert_eq!(countries[1].count, 1);
        assert!(cities.iter().all(|c| c.name != NOT_SET));
        assert_eq!(cities.len(), 2);
    }

    #[test]
    fn test_locations_cities_summed_across_countries_by_name() {
        let rows = vec![
            location("Brazil", "Valencia", "1"),
            location("Spain", "Valencia", "2"),
        ];
        let (_, cities) = RealtimeAggregator::locations(&rows);
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].count, 3);
    }

    #[test]
    fn test_locations_truncated_to_five() {
        let counts: Vec<String> = (1..=8).map(|i| i.to_string()).collect();
        let rows: Vec<ReportRow> = counts
            .iter()
            .enumerate()
            .map(|(i, c)| location(&format!("C{}", i), &format!("City{}", i), c))
            .collect();

        let (countries, cities) = RealtimeAggregator::locations(&rows);

        assert_eq!(countries.len(), TOP_LOCATIONS);
        assert_eq!(cities.len(), TOP_LOCATIONS);
        assert_eq!(countries[0].count, 8);
        assert_eq!(countries[4].count, 4);
    }

    #[test]
    fn test_aggregate_empty_snapshots() {
        let data = RealtimeAggregator::aggregate(&[], &[], &[]);
        assert_eq!(data, RealtimeData::default());
    }
}
