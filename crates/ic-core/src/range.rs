//! Resolution of the raw start/end inputs into a query range.
//!
//! Users enter the first and last day they care about. The last day is
//! inclusive for them, so the resolved range runs until one calendar day
//! after the end input: `[start, end + 1 day)`.

use chrono::{DateTime, Days, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::sheet::CellValue;

/// Naive date-time layouts accepted for range inputs.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Date-only layouts accepted for range inputs (midnight is implied).
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Errors resolving the date range inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// The input cell was empty.
    #[error("{field} date is missing")]
    Missing { field: &'static str },

    /// The input could not be read as a date.
    #[error("{field} date is not a valid date: {value:?}")]
    Unparsable { field: &'static str, value: String },

    /// The wall-clock time does not exist in the configured timezone.
    #[error("{field} date {value:?} does not exist in the local timezone")]
    NonexistentLocalTime { field: &'static str, value: String },

    /// The end date falls before the start date.
    #[error("end date must not be before start date (start {start}, end {end})")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A half-open `[start, end)` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Returns whether `instant` falls inside the range.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Resolves raw start/end inputs into `[start, end + 1 day)`.
///
/// Naive values are read as wall-clock time in `tz`. The one-day advance
/// is applied to the wall clock as well, so it stays a calendar day across
/// DST changes.
pub fn resolve_range<Tz: TimeZone>(
    start: &CellValue,
    end: &CellValue,
    tz: &Tz,
) -> Result<DateRange, RangeError> {
    let start_at = parse_input(start, "start", tz)?;
    let end_at = parse_input(end, "end", tz)?;

    let value = end.to_string();
    let next_day = end_at
        .naive_local()
        .checked_add_days(Days::new(1))
        .ok_or_else(|| RangeError::Unparsable {
            field: "end",
            value: value.clone(),
        })?;
    let end_exclusive = localize(tz, next_day, "end", &value)?;

    let range = DateRange {
        start: start_at.with_timezone(&Utc),
        end: end_exclusive.with_timezone(&Utc),
    };
    if range.end <= range.start {
        return Err(RangeError::Inverted {
            start: range.start,
            end: range.end,
        });
    }
    tracing::debug!(start = %range.start, end = %range.end, "resolved date range");
    Ok(range)
}

fn parse_input<Tz: TimeZone>(
    value: &CellValue,
    field: &'static str,
    tz: &Tz,
) -> Result<DateTime<Tz>, RangeError> {
    let raw = match value {
        CellValue::Empty => return Err(RangeError::Missing { field }),
        CellValue::Text(s) if s.trim().is_empty() => return Err(RangeError::Missing { field }),
        CellValue::Text(s) => s.trim(),
        CellValue::Int(_) => {
            return Err(RangeError::Unparsable {
                field,
                value: value.to_string(),
            });
        }
    };

    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(tz));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .ok_or_else(|| RangeError::Unparsable {
            field,
            value: raw.to_string(),
        })?;

    localize(tz, naive, field, raw)
}

/// Places a wall-clock time in `tz`, taking the earlier instant when ambiguous.
fn localize<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
    field: &'static str,
    raw: &str,
) -> Result<DateTime<Tz>, RangeError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => Err(RangeError::NonexistentLocalTime {
            field,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let range = resolve_range(&text("2025-01-01"), &text("2025-01-31"), &Utc).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_same_day_covers_one_full_day() {
        let range = resolve_range(&text("2025/03/10"), &text("2025/03/10"), &Utc).unwrap();
        assert_eq!(range.end - range.start, chrono::Duration::days(1));
        assert!(range.contains(Utc.with_ymd_and_hms(2025, 3, 10, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_naive_values_use_the_given_timezone() {
        let range = resolve_range(&text("2025-04-01"), &text("2025-04-01"), &jst()).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 3, 31, 15, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 4, 1, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_nonexistent_local_time_is_an_error() {
        // Clocks jump from 02:00 to 03:00 on this day
        let err = resolve_range(
            &text("2025-03-09 02:30"),
            &text("2025-03-10"),
            &chrono_tz::America::New_York,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RangeError::NonexistentLocalTime {
                field: "start",
                value: "2025-03-09 02:30".to_string(),
            }
        );
    }

    #[test]
    fn test_ambiguous_local_time_takes_earlier_instant() {
        // 01:30 happens twice; the EDT reading comes first
        let range = resolve_range(
            &text("2025-11-02 01:30"),
            &text("2025-11-02"),
            &chrono_tz::America::New_York,
        )
        .unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 11, 2, 5, 30, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 11, 3, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_end_advance_follows_wall_clock_across_dst() {
        let range = resolve_range(
            &text("2025-03-09"),
            &text("2025-03-09"),
            &chrono_tz::America::New_York,
        )
        .unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 3, 9, 5, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 3, 10, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_start_keeps_its_time_of_day() {
        let range = resolve_range(&text("2025-04-01 09:30"), &text("2025-04-02"), &Utc).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 4, 1, 9, 30, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 4, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_values_keep_their_offset() {
        let range = resolve_range(
            &text("2025-04-01T00:00:00+09:00"),
            &text("2025-04-01T00:00:00+09:00"),
            &jst(),
        )
        .unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 3, 31, 15, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 4, 1, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_inputs_are_errors() {
        assert_eq!(
            resolve_range(&CellValue::Empty, &text("2025-01-01"), &Utc),
            Err(RangeError::Missing { field: "start" })
        );
        assert_eq!(
            resolve_range(&text("2025-01-01"), &text("   "), &Utc),
            Err(RangeError::Missing { field: "end" })
        );
    }

    #[test]
    fn test_garbage_inputs_are_errors() {
        let err = resolve_range(&text("next tuesday"), &text("2025-01-01"), &Utc).unwrap_err();
        assert!(matches!(err, RangeError::Unparsable { field: "start", .. }));

        let err = resolve_range(&text("2025-01-01"), &text("2025-02-30"), &Utc).unwrap_err();
        assert!(matches!(err, RangeError::Unparsable { field: "end", .. }));

        let err = resolve_range(&CellValue::Int(45_000), &text("2025-01-01"), &Utc).unwrap_err();
        assert!(matches!(err, RangeError::Unparsable { field: "start", .. }));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let err = resolve_range(&text("2025-02-01"), &text("2025-01-01"), &Utc).unwrap_err();
        assert!(matches!(err, RangeError::Inverted { .. }));
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = resolve_range(&text("nope"), &text("2025-01-01"), &Utc).unwrap_err();
        assert_eq!(err.to_string(), r#"start date is not a valid date: "nope""#);
    }
}
