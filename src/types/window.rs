//! Period selectors, aggregation windows and report date tokens

use chrono::{DateTime, Days, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::{Result, StorePulseError};

/// Period selector offered to dashboard users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Today,
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    Custom,
}

impl Period {
    /// Days subtracted from the start of today, for the named periods
    pub fn days_back(&self) -> Option<i64> {
        match self {
            Self::Today => Some(0),
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::Custom => None,
        }
    }
}

impl FromStr for Period {
    type Err = StorePulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "today" => Ok(Self::Today),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            "custom" => Ok(Self::Custom),
            other => Err(StorePulseError::Parse(format!("unknown period '{}'", other))),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Today => "today",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::Custom => "custom",
        })
    }
}

/// Explicit calendar range supplied with `Period::Custom`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CustomRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CustomRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.from.zip(self.to)
    }
}

/// Concrete instant pair orders are restricted to (both ends inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregationWindow {
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

impl AggregationWindow {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.after && *instant <= self.before
    }
}

/// Largest accepted `NdaysAgo` count (about a century)
pub const MAX_DAYS_AGO: u32 = 36_500;

fn days_ago_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)daysAgo$").expect("valid regex"))
}

/// Date token accepted by the traffic source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDate {
    Today,
    Yesterday,
    DaysAgo(u32),
    Date(NaiveDate),
}

impl ReportDate {
    /// Resolve against the source's notion of "today".
    /// Fails when the offset falls outside the calendar.
    pub fn resolve(&self, today: NaiveDate) -> Result<NaiveDate> {
        let back = match self {
            Self::Today => return Ok(today),
            Self::Date(date) => return Ok(*date),
            Self::Yesterday => 1,
            Self::DaysAgo(n) => u64::from(*n),
        };
        today
            .checked_sub_days(Days::new(back))
            .ok_or_else(|| StorePulseError::Parse(format!("'{}' is out of range", self)))
    }
}

impl FromStr for ReportDate {
    type Err = StorePulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "today" => return Ok(Self::Today),
            "yesterday" => return Ok(Self::Yesterday),
            _ => {}
        }
        if let Some(caps) = days_ago_pattern().captures(s) {
            let n = caps[1]
                .parse::<u32>()
                .ok()
                .filter(|n| *n <= MAX_DAYS_AGO)
                .ok_or_else(|| StorePulseError::Parse(format!("day count out of range in '{}'", s)))?;
            return Ok(Self::DaysAgo(n));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| StorePulseError::Parse(format!("invalid report date '{}'", s)))
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::Yesterday => f.write_str("yesterday"),
            Self::DaysAgo(n) => write!(f, "{}daysAgo", n),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Date range sent with every non-realtime traffic report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDateRange {
    pub start: ReportDate,
    pub end: ReportDate,
}

impl Default for ReportDateRange {
    /// `30daysAgo` through `today`
    fn default() -> Self {
        Self {
            start: ReportDate::DaysAgo(30),
            end: ReportDate::Today,
        }
    }
}

impl ReportDateRange {
    /// Build from optional `from`/`to` query tokens, defaulting each side
    pub fn from_tokens(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            start: from.map(str::parse).transpose()?.unwrap_or(defaults.start),
            end: to.map(str::parse).transpose()?.unwrap_or(defaults.end),
        })
    }

    /// Map a dashboard period onto report tokens.
    /// An incomplete custom range falls back to today, like the order window.
    pub fn for_period(period: Period, range: CustomRange) -> Self {
        match (period, range.bounds()) {
            (Period::Custom, Some((from, to))) => Self {
                start: ReportDate::Date(from),
                end: ReportDate::Date(to),
            },
            (Period::Custom, None) | (Period::Today, _) => Self {
                start: ReportDate::Today,
                end: ReportDate::Today,
            },
            (named, _) => Self {
                start: ReportDate::DaysAgo(named.days_back().unwrap_or(0) as u32),
                end: ReportDate::Today,
            },
        }
    }

    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        Ok((self.start.resolve(today)?, self.end.resolve(today)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_tokens() {
        assert_eq!("today".parse::<Period>().unwrap(), Period::Today);
        assert_eq!("7d".parse::<Period>().unwrap(), Period::Last7Days);
        assert_eq!("30d".parse::<Period>().unwrap(), Period::Last30Days);
        assert_eq!("90d".parse::<Period>().unwrap(), Period::Last90Days);
        assert_eq!("custom".parse::<Period>().unwrap(), Period::Custom);
        assert!("1y".parse::<Period>().is_err());
    }

    #[test]
    fn test_report_date_tokens() {
        assert_eq!("today".parse::<ReportDate>().unwrap(), ReportDate::Today);
        assert_eq!(
            "yesterday".parse::<ReportDate>().unwrap(),
            ReportDate::Yesterday
        );
        assert_eq!(
            "30daysAgo".parse::<ReportDate>().unwrap(),
            ReportDate::DaysAgo(30)
        );
        assert_eq!(
            "2024-02-29".parse::<ReportDate>().unwrap(),
            ReportDate::Date(date(2024, 2, 29))
        );
    }

    #[test]
    fn test_report_date_rejects_garbage() {
        assert!("daysAgo".parse::<ReportDate>().is_err());
        assert!("-3daysAgo".parse::<ReportDate>().is_err());
        assert!("2024-13-01".parse::<ReportDate>().is_err());
    }

    #[test]
    fn test_report_date_display_matches_token() {
        assert_eq!(ReportDate::DaysAgo(7).to_string(), "7daysAgo");
        assert_eq!(ReportDate::Date(date(2024, 1, 5)).to_string(), "2024-01-05");
    }

    #[test]
    fn test_report_date_resolve() {
        let today = date(2024, 3, 10);
        assert_eq!(ReportDate::Today.resolve(today).unwrap(), today);
        assert_eq!(ReportDate::Yesterday.resolve(today).unwrap(), date(2024, 3, 9));
        assert_eq!(ReportDate::DaysAgo(10).resolve(today).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_days_ago_beyond_limit_is_parse_error() {
        assert_eq!(
            "36500daysAgo".parse::<ReportDate>().unwrap(),
            ReportDate::DaysAgo(MAX_DAYS_AGO)
        );
        for token in ["36501daysAgo", "100000000daysAgo", "99999999999daysAgo"] {
            assert!(matches!(
                token.parse::<ReportDate>(),
                Err(StorePulseError::Parse(_))
            ));
            assert!(ReportDateRange::from_tokens(Some(token), None).is_err());
        }
    }

    #[test]
    fn test_resolve_off_the_calendar_is_parse_error() {
        let range = ReportDateRange {
            start: ReportDate::DaysAgo(100_000_000),
            end: ReportDate::Yesterday,
        };
        assert!(matches!(
            range.resolve(NaiveDate::MIN),
            Err(StorePulseError::Parse(_))
        ));
        assert!(ReportDate::Yesterday.resolve(NaiveDate::MIN).is_err());
        assert_eq!(ReportDate::Today.resolve(NaiveDate::MIN).unwrap(), NaiveDate::MIN);
    }

    #[test]
    fn test_range_defaults() {
        let range = ReportDateRange::from_tokens(None, None).unwrap();
        assert_eq!(range.start, ReportDate::DaysAgo(30));
        assert_eq!(range.end, ReportDate::Today);

        let range = ReportDateRange::from_tokens(Some("7daysAgo"), None).unwrap();
        assert_eq!(range.start, ReportDate::DaysAgo(7));
    }

    #[test]
    fn test_range_for_period() {
        let none = CustomRange::default();
        assert_eq!(
            ReportDateRange::for_period(Period::Last90Days, none).start,
            ReportDate::DaysAgo(90)
        );
        assert_eq!(
            ReportDateRange::for_period(Period::Today, none).start,
            ReportDate::Today
        );
        let incomplete = CustomRange {
            from: Some(date(2024, 1, 1)),
            to: None,
        };
        assert_eq!(
            ReportDateRange::for_period(Period::Custom, incomplete),
            ReportDateRange::for_period(Period::Today, none)
        );
        let full = CustomRange::new(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(
            ReportDateRange::for_period(Period::Custom, full).end,
            ReportDate::Date(date(2024, 1, 31))
        );
    }
}
