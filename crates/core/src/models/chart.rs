use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single (instant, value) pair belonging to exactly one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Value-history point as the server sends it: the timestamp is a string
/// whose format varies by data source.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSeriesPoint {
    pub timestamp: String,
    pub value: f64,
}

impl RawSeriesPoint {
    /// Parse into a typed point, or `None` when the timestamp is garbage.
    /// Unparseable points are dropped by callers, not fatal.
    pub fn parse(&self) -> Option<ChartSeriesPoint> {
        parse_instant(&self.timestamp).map(|timestamp| ChartSeriesPoint {
            timestamp,
            value: self.value,
        })
    }
}

/// Parse a timestamp string to an absolute instant.
///
/// The backend mixes formats (RFC 3339 with offset, naive ISO with and
/// without a `T`, bare dates), so the axis must be built from parsed
/// instants — lexical string order is not chronological across formats.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// Convert a raw wire series into typed points, dropping unparseable entries.
pub fn parse_series(raw: &[RawSeriesPoint]) -> Vec<ChartSeriesPoint> {
    raw.iter().filter_map(RawSeriesPoint::parse).collect()
}
