//! Time-of-day overlap, midnight-span composition, and timezone primitives.
//!
//! This is component A: the low-level arithmetic every other component
//! builds on. Functions here are pure and fail safe (`false`/`Err`) rather
//! than panic, since callers (the rule resolver, the block filter) treat a
//! malformed interval as "no overlap" rather than propagate a panic through
//! a per-slot pipeline.

use crate::error::{AvailabilityError, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike};
use chrono_tz::Tz;

/// Validate an IANA timezone identifier.
///
/// # Examples
///
/// ```
/// use availkit::time::validate_timezone;
///
/// assert!(validate_timezone("America/New_York"));
/// assert!(!validate_timezone("Not/AZone"));
/// ```
pub fn validate_timezone(tz_str: &str) -> bool {
    !tz_str.is_empty() && tz_str.parse::<Tz>().is_ok()
}

/// Parse a timezone string into a `Tz` object
///
/// # Examples
///
/// ```
/// use availkit::time::parse_timezone;
///
/// let tz = parse_timezone("America/New_York").unwrap();
/// let tz2 = parse_timezone("UTC").unwrap();
/// ```
pub fn parse_timezone(tz_str: &str) -> Result<Tz> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| AvailabilityError::InvalidTimezone(tz_str.to_string()))
}

/// Parse a date/time string with timezone
///
/// Accepts formats like:
/// - "2025-11-01 10:00:00"
/// - "2025-11-01T10:00:00"
pub fn parse_datetime_with_tz(datetime_str: &str, tz: Tz) -> Result<DateTime<Tz>> {
    let naive = if let Ok(dt) = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        dt
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%dT%H:%M:%S") {
        dt
    } else {
        return Err(AvailabilityError::DateTimeParse(format!(
            "Could not parse '{}'. Expected format: 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DDTHH:MM:SS'",
            datetime_str
        )));
    };

    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        AvailabilityError::DateTimeParse(format!(
            "Invalid datetime '{}' for timezone '{}'",
            datetime_str, tz
        ))
    })
}

/// Convert a datetime from one timezone to another
pub fn convert_timezone(dt: &DateTime<Tz>, target_tz: Tz) -> DateTime<Tz> {
    dt.with_timezone(&target_tz)
}

/// Check if a datetime falls within Daylight Saving Time.
///
/// True iff the instant's actual UTC offset differs from the timezone's
/// standard-time offset on that UTC date.
pub fn is_dst(dt: &DateTime<Tz>) -> bool {
    let offset = dt.offset().fix();
    let std_offset = dt.timezone().offset_from_utc_date(&dt.naive_utc().date()).fix();
    offset != std_offset
}

/// Check whether two time-of-day intervals overlap, honoring midnight-span
/// (end-of-day wraparound) intervals.
///
/// `allow_adjacency` controls whether touching boundaries count as overlap:
/// `true` is used at write time to force rule consolidation (spec: two
/// active rules must not even be adjacent); `false` is used at read time
/// for block/booking conflict checks, where touching boundaries are fine.
/// This asymmetry is intentional — see DESIGN.md.
///
/// # Examples
///
/// ```
/// use availkit::time::intervals_overlap;
/// use chrono::NaiveTime;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
///
/// // A midnight-spanning interval 22:00 -> 02:00 overlaps 23:30 -> 00:30.
/// assert!(intervals_overlap(t(22, 0), t(2, 0), t(23, 30), t(0, 30), false));
/// ```
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
    allow_adjacency: bool,
) -> bool {
    let to_minutes = |t: NaiveTime| -> i64 { t.num_seconds_from_midnight() as i64 / 60 };

    let a_start_m = to_minutes(a_start);
    let mut a_end_m = to_minutes(a_end);
    let b_start_m = to_minutes(b_start);
    let mut b_end_m = to_minutes(b_end);

    if a_end_m <= a_start_m {
        a_end_m += 24 * 60;
    }
    if b_end_m <= b_start_m {
        b_end_m += 24 * 60;
    }

    if allow_adjacency {
        a_start_m <= b_end_m && a_end_m >= b_start_m
    } else {
        a_start_m < b_end_m && a_end_m > b_start_m
    }
}

/// Compose an absolute instant from a calendar date, a time-of-day, and an
/// IANA zone. For midnight-spanning windows (`is_end_of_span = true`), the
/// time is attached to `date + 1 day`.
///
/// Ambiguous local times (DST fall-back) resolve to the *earliest* valid
/// instant, matching [`parse_datetime_with_tz`]'s documented behavior.
pub fn compose_local_datetime(
    date: NaiveDate,
    time: NaiveTime,
    tz: Tz,
    is_end_of_span: bool,
) -> Result<DateTime<Tz>> {
    let effective_date = if is_end_of_span {
        date.checked_add_days(Days::new(1))
            .ok_or_else(|| AvailabilityError::DateTimeParse("date overflow".to_string()))?
    } else {
        date
    };

    let naive = NaiveDateTime::new(effective_date, time);
    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        AvailabilityError::DateTimeParse(format!(
            "Invalid local datetime '{}' for timezone '{}'",
            naive, tz
        ))
    })
}

/// Difference in UTC offsets between two zones at noon of `reference_date`,
/// in fractional hours (positive when `to_tz` is ahead of `from_tz`).
pub fn tz_offset_hours(from_tz: Tz, to_tz: Tz, reference_date: NaiveDate) -> f64 {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    let naive = NaiveDateTime::new(reference_date, noon);

    let from_dt = match from_tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt,
        None => return 0.0,
    };
    let to_dt = from_dt.with_timezone(&to_tz);

    let from_offset = from_dt.offset().fix().local_minus_utc();
    let to_offset = to_dt.offset().fix().local_minus_utc();

    (to_offset - from_offset) as f64 / 3600.0
}
