//! Date window resolution for order fetches
//!
//! Turns a period selector (plus an optional custom range) into the
//! concrete `[after, before]` instants used to restrict commerce queries.
//! Day boundaries are taken in the caller's timezone.

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

use crate::types::{AggregationWindow, CustomRange, Period};

/// Resolver for period selectors
pub struct DateWindowResolver;

impl DateWindowResolver {
    /// Resolve a window relative to `now`.
    ///
    /// - `before` is the end of today (23:59:59.999), or the end of `to`
    ///   for a complete custom range
    /// - `after` is the start of today minus N days for the named periods
    /// - an incomplete custom range resolves to the `today` window
    pub fn resolve<Tz: TimeZone>(
        period: Period,
        range: CustomRange,
        now: &DateTime<Tz>,
    ) -> AggregationWindow {
        let tz = now.timezone();
        let today = now.date_naive();

        if let (Period::Custom, Some((from, to))) = (period, range.bounds()) {
            return AggregationWindow {
                after: start_of_day(&tz, from),
                before: end_of_day(&tz, to),
            };
        }

        let days_back = period.days_back().unwrap_or(0);
        AggregationWindow {
            after: start_of_day(&tz, today - Duration::days(days_back)),
            before: end_of_day(&tz, today),
        }
    }

    /// Resolve against the current local time
    pub fn resolve_now(period: Period, range: CustomRange) -> AggregationWindow {
        Self::resolve(period, range, &Local::now())
    }
}

/// First instant of `date` (00:00:00.000) in `tz`
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    to_utc(tz, date.and_time(NaiveTime::MIN), true)
}

/// Last instant of `date` (23:59:59.999) in `tz`
fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let last = date.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1);
    to_utc(tz, last, false)
}

/// Map a wall-clock time to UTC. Ambiguous times pick the earlier (start)
/// or later (end) instant; times inside a DST gap move one hour toward
/// the middle of the day.
fn to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime, start: bool) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, later) => {
            if start {
                earlier.with_timezone(&Utc)
            } else {
                later.with_timezone(&Utc)
            }
        }
        LocalResult::None => {
            let shifted = if start {
                naive + Duration::hours(1)
            } else {
                naive - Duration::hours(1)
            };
            let resolved = tz.from_local_datetime(&shifted);
            let picked = if start {
                resolved.earliest()
            } else {
                resolved.latest()
            };
            picked
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| naive.and_utc())
        }
    }
}
