//! Component B: rule resolver.
//!
//! `daily_available_intervals` turns the layered rule sources (date
//! overrides, recurring weekly rules) into a merged list of organizer-local
//! absolute intervals for one day. A pure function over caller-supplied
//! slices — the orchestrator fetches rows via `RuleRepository` first and
//! hands them here, matching the teacher's preference for pure functions
//! over owned data (`RecurrenceFilter::filter_occurrences`) rather than
//! threading a database handle through.

use chrono::{DateTime, NaiveDate, Weekday};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{AvailabilityRule, DateOverrideRule};
use crate::time::compose_local_datetime;

/// Resolve the effective available intervals for `(organizer, event_type,
/// date)`, honoring override precedence over recurring rules.
///
/// If any active, scope-applicable `DateOverrideRule` exists for `date`,
/// overrides are used exclusively — recurring rules are not consulted at
/// all for that date (override rows with `is_available = false` contribute
/// no intervals). Otherwise the day's active, scope-applicable recurring
/// rules are composed and merged.
pub fn daily_available_intervals(
    event_type_id: Uuid,
    date: NaiveDate,
    organizer_tz: Tz,
    rules: &[AvailabilityRule],
    overrides: &[DateOverrideRule],
) -> Result<Vec<(DateTime<Tz>, DateTime<Tz>)>> {
    let applicable_overrides: Vec<&DateOverrideRule> = overrides
        .iter()
        .filter(|o| o.is_active && o.date == date && o.event_types.matches(event_type_id))
        .collect();

    if !applicable_overrides.is_empty() {
        let mut intervals = Vec::new();
        for o in applicable_overrides {
            if !o.is_available {
                continue;
            }
            if let (Some(start), Some(end)) = (o.start_time, o.end_time) {
                let spans_midnight = o.spans_midnight();
                let start_dt = compose_local_datetime(date, start, organizer_tz, false)?;
                let end_dt = compose_local_datetime(date, end, organizer_tz, spans_midnight)?;
                intervals.push((start_dt, end_dt));
            }
        }
        return Ok(merge_overlapping_intervals(intervals));
    }

    let weekday: Weekday = date.weekday();
    let mut intervals = Vec::new();
    for rule in rules {
        if !rule.is_active || rule.day_of_week != weekday || !rule.event_types.matches(event_type_id) {
            continue;
        }
        let spans_midnight = rule.spans_midnight();
        let start_dt = compose_local_datetime(date, rule.start_time, organizer_tz, false)?;
        let end_dt = compose_local_datetime(date, rule.end_time, organizer_tz, spans_midnight)?;
        intervals.push((start_dt, end_dt));
    }

    Ok(merge_overlapping_intervals(intervals))
}

/// Merge overlapping or adjacent intervals: sort by start, fold the
/// sequence extending the current run's end whenever the next interval's
/// start falls at or before it.
pub fn merge_overlapping_intervals<Tz2: chrono::TimeZone>(
    mut intervals: Vec<(DateTime<Tz2>, DateTime<Tz2>)>,
) -> Vec<(DateTime<Tz2>, DateTime<Tz2>)> {
    if intervals.is_empty() {
        return intervals;
    }
    intervals.sort_by_key(|(start, _)| start.clone());

    let mut merged = vec![intervals[0].clone()];
    for (start, end) in intervals.into_iter().skip(1) {
        let last = merged.last_mut().expect("merged is never empty after the first push");
        if start <= last.1 {
            if end > last.1 {
                last.1 = end;
            }
        } else {
            merged.push((start, end));
        }
    }
    merged
}
