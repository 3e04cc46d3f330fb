//! Reporting date ranges with end-of-day inclusive upper bounds.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Errors that can occur when building a [`DateRange`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("End date cannot be earlier than start date")]
    EndBeforeStart,
    #[error("invalid date '{0}', expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),
}

/// An optional `[start, end]` window over article creation timestamps.
///
/// `end` is day-granular: every timestamp on the end date is inside the range,
/// so the exclusive upper bound is midnight of the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Build a range from optional bounds.
    ///
    /// # Errors
    ///
    /// Returns `DateRangeError::EndBeforeStart` when both bounds are present
    /// and `end < start`.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, DateRangeError> {
        if matches!((start, end), (Some(start), Some(end)) if end < start) {
            return Err(DateRangeError::EndBeforeStart);
        }
        Ok(Self {
            start_date: start,
            end_date: end,
        })
    }

    /// Parse optional query-string bounds (see [`parse_bound`]) and build a range.
    ///
    /// # Errors
    ///
    /// Returns `DateRangeError::InvalidDate` for unparseable input or
    /// `DateRangeError::EndBeforeStart` for an inverted range.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, DateRangeError> {
        let start = start.map(parse_bound).transpose()?;
        let end = end.map(parse_bound).transpose()?;
        Self::new(start, end)
    }

    /// A range with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start_date: None,
            end_date: None,
        }
    }

    #[must_use]
    pub const fn start(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    #[must_use]
    pub const fn end(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Inclusive lower bound for queries.
    #[must_use]
    pub const fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Exclusive upper bound for queries: midnight after the end date.
    #[must_use]
    pub fn upper_bound_exclusive(&self) -> Option<DateTime<Utc>> {
        self.end_date.map(|end| {
            let next_day = end
                .date_naive()
                .checked_add_days(Days::new(1))
                .unwrap_or(NaiveDate::MAX);
            next_day.and_time(NaiveTime::MIN).and_utc()
        })
    }

    /// Whether a timestamp falls inside the range.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let after_start = self.lower_bound().is_none_or(|start| at >= start);
        let before_end = self.upper_bound_exclusive().is_none_or(|end| at < end);
        after_start && before_end
    }
}

/// Parse a single bound: `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
///
/// # Errors
///
/// Returns `DateRangeError::InvalidDate` if neither form matches.
pub fn parse_bound(raw: &str) -> Result<DateTime<Utc>, DateRangeError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DateRangeError::InvalidDate(raw.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let result = DateRange::parse(Some("2024-06-01"), Some("2024-05-01"));
        assert_eq!(result, Err(DateRangeError::EndBeforeStart));
    }

    #[test]
    fn test_same_day_range_is_valid() {
        assert!(DateRange::parse(Some("2024-06-01"), Some("2024-06-01")).is_ok());
    }

    #[test]
    fn test_end_of_day_is_inclusive() {
        let late = at(2024, 6, 1, 23, 59);

        let includes = DateRange::parse(None, Some("2024-06-01")).unwrap();
        assert!(includes.contains(late));

        let excludes = DateRange::parse(None, Some("2024-05-31")).unwrap();
        assert!(!excludes.contains(late));
    }

    #[test]
    fn test_upper_bound_is_next_midnight() {
        let range = DateRange::parse(None, Some("2024-02-29")).unwrap();
        assert_eq!(range.upper_bound_exclusive(), Some(at(2024, 3, 1, 0, 0)));
    }

    #[test]
    fn test_start_bound_is_inclusive() {
        let range = DateRange::parse(Some("2024-06-01"), None).unwrap();
        assert!(range.contains(at(2024, 6, 1, 0, 0)));
        assert!(!range.contains(at(2024, 5, 31, 23, 59)));
    }

    #[test]
    fn test_unbounded_contains_everything() {
        assert!(DateRange::unbounded().contains(at(1970, 1, 1, 0, 0)));
    }

    #[test]
    fn test_parse_accepts_rfc3339() {
        let parsed = parse_bound("2024-06-01T10:30:00+02:00").unwrap();
        assert_eq!(parsed, at(2024, 6, 1, 8, 30));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_bound("yesterday"),
            Err(DateRangeError::InvalidDate(_))
        ));
    }
}
