//! Traffic report reducers: overview, timeseries, acquisition, geo, pages

use std::collections::HashMap;

use crate::services::decode::decode_rows;
use crate::types::{
    Acquisition, AnalyticsOverview, CitySessions, CountrySessions, GeoBreakdown, LandingPage,
    LandingRow, NamedSessions, PageViews, PagesBreakdown, RegionCityRow, ReportRow,
    TimeseriesPoint,
};

/// Regions kept after merging city rows
pub const TOP_REGIONS: usize = 10;
/// City rows kept (cities are not merged across regions)
pub const TOP_CITIES: usize = 20;

/// Reducers over traffic source rows
pub struct TrafficAggregator;

impl TrafficAggregator {
    /// Single-row totals. Always exactly one record: zero rows from the
    /// source yield an all-zero overview, extra rows are ignored.
    pub fn overview(rows: &[ReportRow]) -> Vec<AnalyticsOverview> {
        let first = decode_rows::<AnalyticsOverview>(&rows[..rows.len().min(1)])
            .pop()
            .unwrap_or_default();
        vec![first]
    }

    /// Daily points sorted by the raw `YYYYMMDD` date string
    pub fn timeseries(rows: &[ReportRow]) -> Vec<TimeseriesPoint> {
        let mut items = decode_rows::<TimeseriesPoint>(rows);
        items.sort_by(|a, b| a.date.cmp(&b.date));
        items
    }

    /// Channel groups and source/medium pairs, in source order
    pub fn acquisition(channel_rows: &[ReportRow], source_rows: &[ReportRow]) -> Acquisition {
        Acquisition {
            channels: decode_rows(channel_rows),
            sources: decode_rows(source_rows),
        }
    }

    /// Countries in source order; regions merged from the region/city rows,
    /// re-sorted and truncated; cities sorted independently.
    pub fn geo(country_rows: &[ReportRow], region_city_rows: &[ReportRow]) -> GeoBreakdown {
        let countries: Vec<CountrySessions> = decode_rows(country_rows);
        let region_cities: Vec<RegionCityRow> = decode_rows(region_city_rows);

        let mut regions: Vec<NamedSessions> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in &region_cities {
            match index.get(&row.region) {
                Some(&pos) => {
                    regions[pos].sessions = regions[pos].sessions.saturating_add(row.sessions);
                }
                None => {
                    index.insert(row.region.clone(), regions.len());
                    regions.push(NamedSessions {
                        name: row.region.clone(),
                        sessions: row.sessions,
                    });
                }
            }
        }
        regions.sort_by(|a, b| b.sessions.cmp(&a.sessions));
        regions.truncate(TOP_REGIONS);

        let mut cities: Vec<CitySessions> = region_cities
            .into_iter()
            .map(|row| CitySessions {
                city: row.city,
                region: row.region,
                sessions: row.sessions,
            })
            .collect();
        cities.sort_by(|a, b| b.sessions.cmp(&a.sessions));
        cities.truncate(TOP_CITIES);

        GeoBreakdown {
            countries,
            regions,
            cities,
        }
    }

    /// Top pages and landing pages with their engagement rate
    pub fn pages(page_rows: &[ReportRow], landing_rows: &[ReportRow]) -> PagesBreakdown {
        let pages: Vec<PageViews> = decode_rows(page_rows);
        let landings = decode_rows::<LandingRow>(landing_rows)
            .into_iter()
            .map(|row| LandingPage {
                rate: engagement_rate(row.engaged, row.sessions),
                path: row.path,
                sessions: row.sessions,
                engaged: row.engaged,
            })
            .collect();

        PagesBreakdown { pages, landings }
    }
}

/// `engaged / sessions * 100`, 0 when there are no sessions
pub fn engagement_rate(engaged: u64, sessions: u64) -> f64 {
    if sessions == 0 {
        return 0.0;
    }
    engaged as f64 / sessions as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[(&[&str], &[&str])]) -> Vec<ReportRow> {
        data.iter()
            .map(|(dims, metrics)| ReportRow::new(dims.iter().copied(), metrics.iter().copied()))
            .collect()
    }

    // ========== overview ==========

    #[test]
    fn test_overview_empty_is_one_zero_record() {
        let items = TrafficAggregator::overview(&[]);
        assert_eq!(items, vec![AnalyticsOverview::default()]);
    }

    #[test]
    fn test_overview_single_row() {
        let input = rows(&[(&[], &["10", "8", "30", "6", "61.2", "0.6", "1.25"])]);
        let items = TrafficAggregator::overview(&input);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sessions, 10);
        assert_eq!(items[0].engaged_sessions, 6);
    }

    #[test]
    fn test_overview_keeps_first_row_only() {
        let input = rows(&[
            (&[], &["10", "8", "30", "6", "61.2", "0.6", "1.25"]),
            (&[], &["99", "99", "99", "99", "1", "1", "1"]),
        ]);
        let items = TrafficAggregator::overview(&input);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sessions, 10);
    }

    // ========== timeseries ==========

    #[test]
    fn test_timeseries_sorted_by_date_string() {
        let input = rows(&[
            (&["20240103"], &["3", "3", "3", "3"]),
            (&["20231231"], &["1", "1", "1", "1"]),
            (&["20240101"], &["2", "2", "2", "2"]),
        ]);
        let items = TrafficAggregator::timeseries(&input);
        let dates: Vec<&str> = items.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["20231231", "20240101", "20240103"]);
    }

    #[test]
    fn test_timeseries_empty() {
        assert!(TrafficAggregator::timeseries(&[]).is_empty());
    }

    // ========== acquisition ==========

    #[test]
    fn test_acquisition_keeps_source_order() {
        let channels = rows(&[(&["Direct"], &["5"]), (&["Organic Search"], &["9"])]);
        let sources = rows(&[(&["google / organic"], &["9"]), (&[], &["x"])]);

        let acq = TrafficAggregator::acquisition(&channels, &sources);

        assert_eq!(acq.channels[0].name, "Direct");
        assert_eq!(acq.channels[1].sessions, 9);
        assert_eq!(acq.sources[1].name, "Unknown");
        assert_eq!(acq.sources[1].sessions, 0);
    }

    // ========== geo ==========

    #[test]
    fn test_geo_scenario_d_regions_merged_cities_not() {
        let region_cities = rows(&[(&["SP", "A"], &["5"]), (&["SP", "B"], &["3"])]);

        let geo = TrafficAggregator::geo(&[], &region_cities);

        assert_eq!(
            geo.regions,
            vec![NamedSessions {
                name: "SP".into(),
                sessions: 8
            }]
        );
        assert_eq!(geo.cities.len(), 2);
        assert_eq!(geo.cities[0].city, "A");
        assert_eq!(geo.cities[0].sessions, 5);
        assert_eq!(geo.cities[1].city, "B");
        assert_eq!(geo.cities[1].sessions, 3);
    }

    #[test]
    fn test_geo_same_city_in_two_regions_stays_separate() {
        let region_cities = rows(&[(&["MG", "Vitória"], &["2"]), (&["ES", "Vitória"], &["4"])]);
        let geo = TrafficAggregator::geo(&[], &region_cities);
        assert_eq!(geo.cities.len(), 2);
        assert_eq!(geo.cities[0].region, "ES");
    }

    #[test]
    fn test_geo_regions_sorted_and_truncated() {
        let data: Vec<(String, String)> = (0..12)
            .map(|i| (format!("R{:02}", i), i.to_string()))
            .collect();
        let input: Vec<ReportRow> = data
            .iter()
            .map(|(region, sessions)| ReportRow::new([region.as_str(), "City"], [sessions.as_str()]))
            .collect();

        let geo = TrafficAggregator::geo(&[], &input);

        assert_eq!(geo.regions.len(), TOP_REGIONS);
        assert_eq!(geo.regions[0].name, "R11");
        assert_eq!(geo.regions[9].name, "R02");
    }

    #[test]
    fn test_geo_cities_truncated_to_twenty() {
        let sessions: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        let input: Vec<ReportRow> = sessions
            .iter()
            .map(|s| ReportRow::new(["SP", "City"], [s.as_str()]))
            .collect();

        let geo = TrafficAggregator::geo(&[], &input);

        assert_eq!(geo.cities.len(), TOP_CITIES);
        assert_eq!(geo.cities[0].sessions, 24);
        assert_eq!(geo.regions[0].sessions, (0..25).sum::<u64>());
    }

    #[test]
    fn test_geo_countries_decoded_with_users() {
        let countries = rows(&[(&["Brazil"], &["100", "70"]), (&["Portugal"], &["10"])]);
        let geo = TrafficAggregator::geo(&countries, &[]);
        assert_eq!(geo.countries[0].total_users, 70);
        assert_eq!(geo.countries[1].total_users, 0);
        assert!(geo.regions.is_empty());
        assert!(geo.cities.is_empty());
    }

    // ========== pages ==========

    #[test]
    fn test_landing_rate() {
        let landings = rows(&[
            (&["/"], &["200", "150"]),
            (&["/empty"], &["0", "0"]),
            (&["/odd"], &["2", "3"]),
        ]);

        let pages = TrafficAggregator::pages(&[], &landings);

        assert!((pages.landings[0].rate - 75.0).abs() < f64::EPSILON);
        assert_eq!(pages.landings[1].rate, 0.0);
        // Engaged above sessions is a data artifact and is not clamped
        assert!((pages.landings[2].rate - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pages_in_source_order() {
        let input = rows(&[(&["/a"], &["9"]), (&["/b"], &["4"])]);
        let pages = TrafficAggregator::pages(&input, &[]);
        assert_eq!(pages.pages[0].path, "/a");
        assert_eq!(pages.pages[1].views, 4);
        assert!(pages.landings.is_empty());
    }

    #[test]
    fn test_engagement_rate_zero_sessions() {
        assert_eq!(engagement_rate(5, 0), 0.0);
    }
}
