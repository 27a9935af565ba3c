//! Report row decoding
//!
//! This is the only place that reads positional, untyped report values.
//! Every default applied to dirty upstream data lives here:
//!
//! - a missing or empty dimension value becomes `"Unknown"`
//! - a count is the leading integer of the value (`"12.7"` → 12); missing,
//!   unparseable or negative counts become 0
//! - a measure is parsed as a float; missing, unparseable or non-finite
//!   measures become 0.0
//!
//! Positions match the request definitions in `sources::ReportKind`.

use crate::types::{
    AnalyticsOverview, CountrySessions, LandingRow, LocationRow, MinuteBucket, NamedSessions,
    PageViews, RegionCityRow, ReportRow, TimeseriesPoint,
};

/// Placeholder for a missing dimension value
pub const UNKNOWN: &str = "Unknown";

/// Positional accessor over one report row
pub struct RowReader<'a> {
    row: &'a ReportRow,
}

impl<'a> RowReader<'a> {
    pub fn new(row: &'a ReportRow) -> Self {
        Self { row }
    }

    /// Dimension at `pos`, or `"Unknown"`
    pub fn dimension(&self, pos: usize) -> String {
        self.row
            .dimension_values
            .get(pos)
            .and_then(|v| v.value.as_deref())
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    }

    /// Integer metric at `pos`, or 0
    pub fn count(&self, pos: usize) -> u64 {
        self.metric(pos).map(parse_count).unwrap_or(0)
    }

    /// Integer dimension at `pos` (e.g. `minutesAgo`), or 0
    pub fn dimension_count(&self, pos: usize) -> u64 {
        self.row
            .dimension_values
            .get(pos)
            .and_then(|v| v.value.as_deref())
            .map(parse_count)
            .unwrap_or(0)
    }

    /// Float metric at `pos`, or 0.0
    pub fn measure(&self, pos: usize) -> f64 {
        self.metric(pos).map(parse_measure).unwrap_or(0.0)
    }

    fn metric(&self, pos: usize) -> Option<&'a str> {
        self.row
            .metric_values
            .get(pos)
            .and_then(|v| v.value.as_deref())
    }
}

/// Parse the leading integer of `raw`, 0 on failure or negative values
pub fn parse_count(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..digits_end].parse().unwrap_or(0)
}

/// Parse a float, 0.0 on failure or non-finite values
pub fn parse_measure(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Typed record decoded from one report row
pub trait DecodeRow: Sized {
    fn decode(row: &RowReader<'_>) -> Self;
}

/// Decode every row of a report
pub fn decode_rows<T: DecodeRow>(rows: &[ReportRow]) -> Vec<T> {
    rows.iter().map(|row| T::decode(&RowReader::new(row))).collect()
}

impl DecodeRow for AnalyticsOverview {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            sessions: row.count(0),
            total_users: row.count(1),
            screen_page_views: row.count(2),
            engaged_sessions: row.count(3),
            average_session_duration: row.measure(4),
            engagement_rate: row.measure(5),
            sessions_per_user: row.measure(6),
        }
    }
}

impl DecodeRow for TimeseriesPoint {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            date: row.dimension(0),
            sessions: row.count(0),
            users: row.count(1),
            pageviews: row.count(2),
            engaged_sessions: row.count(3),
        }
    }
}

impl DecodeRow for NamedSessions {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            name: row.dimension(0),
            sessions: row.count(0),
        }
    }
}

impl DecodeRow for CountrySessions {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            country: row.dimension(0),
            sessions: row.count(0),
            total_users: row.count(1),
        }
    }
}

impl DecodeRow for RegionCityRow {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            region: row.dimension(0),
            city: row.dimension(1),
            sessions: row.count(0),
        }
    }
}

impl DecodeRow for PageViews {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            path: row.dimension(0),
            views: row.count(0),
        }
    }
}

impl DecodeRow for LandingRow {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            path: row.dimension(0),
            sessions: row.count(0),
            engaged: row.count(1),
        }
    }
}

impl DecodeRow for MinuteBucket {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            min_ago: row.dimension_count(0),
            users: row.count(0),
        }
    }
}

impl DecodeRow for LocationRow {
    fn decode(row: &RowReader<'_>) -> Self {
        Self {
            country: row.dimension(0),
            city: row.dimension(1),
            active_users: row.count(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowValue;

    // ========== parse_count ==========

    #[test]
    fn test_parse_count_plain() {
        assert_eq!(parse_count("42"), 42);
    }

    #[test]
    fn test_parse_count_takes_integer_prefix() {
        assert_eq!(parse_count("12.7"), 12);
        assert_eq!(parse_count("7abc"), 7);
    }

    #[test]
    fn test_parse_count_garbage_is_zero() {
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("-5"), 0);
    }

    // ========== parse_measure ==========

    #[test]
    fn test_parse_measure() {
        assert!((parse_measure("0.6543") - 0.6543).abs() < f64::EPSILON);
        assert_eq!(parse_measure("n/a"), 0.0);
        assert_eq!(parse_measure("NaN"), 0.0);
        assert_eq!(parse_measure("inf"), 0.0);
    }

    // ========== RowReader ==========

    #[test]
    fn test_missing_dimension_is_unknown() {
        let row = ReportRow {
            dimension_values: vec![RowValue { value: None }, RowValue::new("")],
            metric_values: vec![],
        };
        let reader = RowReader::new(&row);
        assert_eq!(reader.dimension(0), UNKNOWN);
        assert_eq!(reader.dimension(1), UNKNOWN);
        assert_eq!(reader.dimension(5), UNKNOWN);
    }

    #[test]
    fn test_missing_metric_is_zero() {
        let row = ReportRow::new(["x"], ["3"]);
        let reader = RowReader::new(&row);
        assert_eq!(reader.count(0), 3);
        assert_eq!(reader.count(1), 0);
        assert_eq!(reader.measure(1), 0.0);
    }

    // ========== DecodeRow ==========

    #[test]
    fn test_decode_overview_positions() {
        let row = ReportRow::new(
            Vec::<String>::new(),
            ["100", "80", "300", "60", "125.5", "0.6", "1.25"],
        );
        let rows = decode_rows::<AnalyticsOverview>(&[row]);
        assert_eq!(rows[0].sessions, 100);
        assert_eq!(rows[0].total_users, 80);
        assert_eq!(rows[0].screen_page_views, 300);
        assert_eq!(rows[0].engaged_sessions, 60);
        assert!((rows[0].average_session_duration - 125.5).abs() < f64::EPSILON);
        assert!((rows[0].engagement_rate - 0.6).abs() < f64::EPSILON);
        assert!((rows[0].sessions_per_user - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decode_region_city() {
        let row = ReportRow::new(["São Paulo", "Campinas"], ["9"]);
        let decoded = decode_rows::<RegionCityRow>(&[row]);
        assert_eq!(
            decoded[0],
            RegionCityRow {
                region: "São Paulo".into(),
                city: "Campinas".into(),
                sessions: 9,
            }
        );
    }

    #[test]
    fn test_decode_minute_bucket_from_dimension() {
        let row = ReportRow::new(["07"], ["4"]);
        let decoded = decode_rows::<MinuteBucket>(&[row]);
        assert_eq!(decoded[0], MinuteBucket { min_ago: 7, users: 4 });
    }
}
