//! Wall-clock identifiers and timestamps

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Hands out record ids derived from the current time in milliseconds.
///
/// Ids are strictly increasing for the lifetime of the clock, so two
/// records created within the same millisecond still get distinct keys.
#[derive(Debug, Default)]
pub struct IdClock {
    last: AtomicI64,
}

impl IdClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id: the current epoch millisecond, or one past the previous id
    pub fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }
}

/// Current time as an ISO-8601 string with millisecond precision (`...T12:00:00.000Z`)
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse the timestamp formats a session `date` may carry.
///
/// Accepts RFC 3339, a naive date-time (read as UTC) and a bare `YYYY-MM-DD`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let clock = IdClock::new();
        let before = Utc::now().timestamp_millis();

        let ids: Vec<i64> = (0..100).map(|_| clock.next_id()).collect();

        assert!(ids[0] >= before);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_now_iso_round_trips() {
        let now = now_iso();
        assert!(now.ends_with('Z'));
        assert!(parse_timestamp(&now).is_some());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let full = parse_timestamp("2024-06-01T10:30:00.000Z").unwrap();
        let naive = parse_timestamp("2024-06-01T10:30:00").unwrap();
        let date = parse_timestamp("2024-06-01").unwrap();

        assert_eq!(full, naive);
        assert!(date < full);
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
