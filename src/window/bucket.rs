//! Day-granularity dates used for every window comparison

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::fmt;

/// A calendar day.
///
/// Server timestamps are bucketed by the date in their own offset, which is
/// the leading `YYYY-MM-DD` of the timestamp as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateBucket(NaiveDate);

impl DateBucket {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses the compact `YYYYMMDD` form used in configuration
    pub fn parse_compact(s: &str) -> Option<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(s, "%Y%m%d").ok().map(Self)
    }

    /// Buckets a server timestamp
    pub fn of(timestamp: &DateTime<FixedOffset>) -> Self {
        Self(timestamp.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Midnight UTC of this day, in nanoseconds since the epoch
    pub fn start_of_day_nanos(&self) -> Option<i64> {
        self.0
            .and_hms_opt(0, 0, 0)
            .and_then(|dt| dt.and_utc().timestamp_nanos_opt())
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}
