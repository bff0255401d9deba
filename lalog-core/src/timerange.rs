// Copyright 2025 lalog contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Time-window resolution for range queries.
//!
//! Bounds are rendered to the datastore's UTC text representation
//! (`YYYY-MM-DD hh:mm:ss`) before filtering, so string comparison in SQL
//! orders the same way the timestamps do.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Text layout of timestamps as persisted by the datastore.
pub const STORAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeRangeError {
    #[error("unparsable timestamp: {0:?}")]
    Unparsable(String),
}

/// An inclusive `[since, until]` query window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub since: NaiveDateTime,
    pub until: NaiveDateTime,
}

impl TimeRange {
    /// Resolves optional request bounds against `now`.
    ///
    /// A missing `until` defaults to `now`; a missing `since` defaults to
    /// one hour before the resolved `until`. Either bound failing to parse
    /// is a [`TimeRangeError`].
    pub fn resolve(
        since: Option<&str>,
        until: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, TimeRangeError> {
        let until = match until {
            Some(raw) => parse_bound(raw)?,
            None => now.naive_utc(),
        };
        let since = match since {
            Some(raw) => parse_bound(raw)?,
            None => until - Duration::hours(1),
        };
        Ok(Self { since, until })
    }

    /// Both bounds in the datastore's text layout, ready to bind into a
    /// `BETWEEN` filter.
    pub fn storage_bounds(&self) -> (String, String) {
        (
            self.since.format(STORAGE_TIME_FORMAT).to_string(),
            self.until.format(STORAGE_TIME_FORMAT).to_string(),
        )
    }
}

/// Parses one user-supplied bound.
///
/// Accepts RFC 3339, the datastore layout itself, the `T`-separated
/// variant, and a bare date (interpreted as midnight UTC).
fn parse_bound(raw: &str) -> Result<NaiveDateTime, TimeRangeError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc).naive_utc());
    }
    for format in [STORAGE_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts);
        }
    }
    Err(TimeRangeError::Unparsable(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, STORAGE_TIME_FORMAT).unwrap()
    }

    #[test]
    fn defaults_to_one_hour_before_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let range = TimeRange::resolve(None, None, now).unwrap();
        assert_eq!(range.until, at("2025-06-01 12:00:00"));
        assert_eq!(range.since, at("2025-06-01 11:00:00"));
    }

    #[test]
    fn since_defaults_relative_to_supplied_until() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let range = TimeRange::resolve(None, Some("2025-05-01 08:30:00"), now).unwrap();
        assert_eq!(range.until, at("2025-05-01 08:30:00"));
        assert_eq!(range.since, at("2025-05-01 07:30:00"));
    }

    #[test]
    fn accepts_rfc3339_with_offset() {
        let now = Utc::now();
        let range =
            TimeRange::resolve(Some("2025-06-01T10:00:00+02:00"), Some("2025-06-01"), now).unwrap();
        assert_eq!(range.since, at("2025-06-01 08:00:00"));
        assert_eq!(range.until, at("2025-06-01 00:00:00"));
    }

    #[test]
    fn rejects_garbage() {
        let err = TimeRange::resolve(Some("not-a-date"), None, Utc::now()).unwrap_err();
        assert_eq!(err, TimeRangeError::Unparsable("not-a-date".to_string()));
    }

    #[test]
    fn storage_bounds_use_the_datastore_layout() {
        let range = TimeRange {
            since: at("2025-06-01 08:00:00"),
            until: at("2025-06-01 09:00:00"),
        };
        let (since, until) = range.storage_bounds();
        assert_eq!(since, "2025-06-01 08:00:00");
        assert_eq!(until, "2025-06-01 09:00:00");
    }
}
