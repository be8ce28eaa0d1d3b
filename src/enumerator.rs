//! Component E: slot enumerator.
//!
//! Emits candidate slots at a fixed cadence within one available interval,
//! converted to UTC so downstream filtering (blocks, bookings) stays
//! zone-agnostic. Cursor/stride shape grounded on the booking-slot
//! generator in the retrieved scheduling-domain crate.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::model::Slot;

/// Enumerate slots of `duration_minutes` at `slot_interval_minutes` cadence
/// within `[interval_start, interval_end)`, both in the organizer's zone.
/// Returned slots are converted to UTC.
pub fn enumerate_slots(
    interval_start: DateTime<Tz>,
    interval_end: DateTime<Tz>,
    duration_minutes: i64,
    slot_interval_minutes: i64,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    if duration_minutes <= 0 || slot_interval_minutes <= 0 {
        return slots;
    }

    let duration = Duration::minutes(duration_minutes);
    let stride = Duration::minutes(slot_interval_minutes);

    let mut cursor = interval_start;
    while cursor + duration <= interval_end {
        slots.push(Slot::new(cursor.with_timezone(&chrono::Utc), duration_minutes));
        cursor += stride;
    }

    slots
}
