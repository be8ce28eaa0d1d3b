//! Component C: block filter.
//!
//! `is_slot_blocked` answers whether a candidate slot is unavailable
//! because of a one-time block, a recurring block, or a date-override
//! exclusion — independent of existing bookings (that's component D).

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::model::{BlockedTime, DateOverrideRule, RecurringBlockedTime, Slot};
use crate::time::compose_local_datetime;
use uuid::Uuid;

/// True if any one-time block, recurring block, or override exclusion
/// covers `slot` on `date`.
pub fn is_slot_blocked(
    slot: &Slot,
    date: NaiveDate,
    slot_tz: Tz,
    event_type_id: Uuid,
    one_time_blocks: &[BlockedTime],
    recurring_blocks: &[RecurringBlockedTime],
    overrides: &[DateOverrideRule],
) -> bool {
    is_slot_blocked_by_one_time(slot, one_time_blocks)
        || is_slot_blocked_by_recurring(slot, date, slot_tz, recurring_blocks)
        || is_slot_blocked_by_override(slot, date, slot_tz, event_type_id, overrides)
}

/// One-time blocks: any active `BlockedTime` whose absolute window
/// strictly overlaps the slot.
pub fn is_slot_blocked_by_one_time(slot: &Slot, one_time_blocks: &[BlockedTime]) -> bool {
    one_time_blocks
        .iter()
        .any(|b| b.is_active && b.start < slot.end && b.end > slot.start)
}

/// Recurring blocks: composed in `slot_tz` (the slot's own zone, not a
/// stored one — preserved intentionally, see DESIGN.md open question 2),
/// applicable to the slot's weekday and date range, strictly overlapping.
pub fn is_slot_blocked_by_recurring(
    slot: &Slot,
    date: NaiveDate,
    slot_tz: Tz,
    recurring_blocks: &[RecurringBlockedTime],
) -> bool {
    let weekday = date.weekday();
    for block in recurring_blocks {
        if !block.is_active || block.day_of_week != weekday {
            continue;
        }
        if !block.applies_to_date(date) {
            continue;
        }
        let spans_midnight = block.spans_midnight();
        let (block_start, block_end) = match compose_block_window(
            date,
            block.start_time,
            block.end_time,
            spans_midnight,
            slot_tz,
        ) {
            Some(window) => window,
            None => {
                log::warn!("skipping malformed recurring block {}", block.id);
                continue;
            }
        };
        if block_start < slot.end && block_end > slot.start {
            return true;
        }
    }
    false
}

fn compose_block_window(
    date: NaiveDate,
    start_time: chrono::NaiveTime,
    end_time: chrono::NaiveTime,
    spans_midnight: bool,
    tz: Tz,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = compose_local_datetime(date, start_time, tz, false).ok()?;
    let end = compose_local_datetime(date, end_time, tz, spans_midnight).ok()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Date-override exclusion: a `is_available = false` override blocks the
/// entire day; an `is_available = true` override blocks any slot not
/// fully contained within its window.
pub fn is_slot_blocked_by_override(
    slot: &Slot,
    date: NaiveDate,
    slot_tz: Tz,
    event_type_id: Uuid,
    overrides: &[DateOverrideRule],
) -> bool {
    let applicable: Vec<&DateOverrideRule> = overrides
        .iter()
        .filter(|o| o.is_active && o.date == date && o.event_types.matches(event_type_id))
        .collect();

    for o in applicable {
        if !o.is_available {
            return true;
        }
        if let (Some(start), Some(end)) = (o.start_time, o.end_time) {
            let spans_midnight = o.spans_midnight();
            let window = compose_block_window(date, start, end, spans_midnight, slot_tz);
            match window {
                Some((override_start, override_end)) => {
                    if !(override_start <= slot.start && slot.end <= override_end) {
                        return true;
                    }
                }
                None => {
                    log::warn!("skipping malformed override {} for slot block check", o.id);
                    return true;
                }
            }
        }
    }
    false
}
