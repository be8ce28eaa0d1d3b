//! Component D: booking conflict filter.
//!
//! `is_slot_conflicting` decides whether a candidate slot collides with
//! existing confirmed bookings, honoring buffer zones around the candidate,
//! a minimum idle gap around every existing booking, and group-event
//! capacity.

use chrono::Duration;
use uuid::Uuid;

use crate::model::{Booking, EventType, Slot};

/// True if `slot` conflicts with any booking in `confirmed_bookings`
/// (expected pre-filtered to `status = confirmed` by the repository layer —
/// see `BookingRepository::confirmed_bookings_in`).
///
/// Buffers pad the *candidate*; `minimum_gap` pads every *existing*
/// booking. A group event tolerates overlap up to `max_attendees`, summing
/// `attendee_count` across confirmed bookings of the same event type that
/// overlap the raw (unbuffered) slot.
pub fn is_slot_conflicting(
    slot: &Slot,
    event_type: &EventType,
    requested_attendee_count: u32,
    buffer_before_minutes: i64,
    buffer_after_minutes: i64,
    minimum_gap_minutes: i64,
    confirmed_bookings: &[Booking],
) -> bool {
    let protected_start = slot.start - Duration::minutes(buffer_before_minutes);
    let protected_end = slot.end + Duration::minutes(buffer_after_minutes);

    for booking in confirmed_bookings {
        if booking.start >= protected_end || booking.end <= protected_start {
            continue;
        }

        let booking_protected_start = booking.start - Duration::minutes(minimum_gap_minutes);
        let booking_protected_end = booking.end + Duration::minutes(minimum_gap_minutes);

        let protected_zones_overlap =
            booking_protected_start < protected_end && booking_protected_end > protected_start;
        if !protected_zones_overlap {
            continue;
        }

        if event_type.is_group_event() && booking.event_type_id == event_type.id {
            let max_attendees = event_type.group.map(|g| g.max_attendees).unwrap_or(0);
            let total: u32 = confirmed_bookings
                .iter()
                .filter(|b| {
                    b.event_type_id == event_type.id && b.start < slot.end && b.end > slot.start
                })
                .map(|b| b.attendee_count)
                .sum();
            if total + requested_attendee_count > max_attendees {
                return true;
            }
        } else {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookingStatus, GroupEventConfig};
    use chrono::Utc;

    fn booking(
        event_type_id: Uuid,
        start_offset_min: i64,
        duration_min: i64,
        attendee_count: u32,
    ) -> Booking {
        let base = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            event_type_id,
            start: base + Duration::minutes(start_offset_min),
            end: base + Duration::minutes(start_offset_min + duration_min),
            status: BookingStatus::Confirmed,
            attendee_count,
        }
    }

    fn individual_event_type() -> EventType {
        EventType {
            id: Uuid::new_v4(),
            slug: "demo".into(),
            duration_minutes: 30,
            buffer_before_minutes: None,
            buffer_after_minutes: None,
            slot_interval_minutes: None,
            group: None,
        }
    }

    #[test]
    fn buffer_conflict_blocks_neighboring_slot() {
        let event_type = individual_event_type();
        let existing = booking(event_type.id, 60, 30, 1); // 10:00-10:30 relative
        let base = Utc::now();
        let slot = Slot::new(base + Duration::minutes(30), 30); // 09:30-10:00

        // buffer_before=15, buffer_after=15 -> protected end 10:15, overlaps [10:00,10:30]
        assert!(is_slot_conflicting(&slot, &event_type, 1, 15, 15, 0, &[existing]));
    }

    #[test]
    fn different_event_type_booking_still_conflicts() {
        // A confirmed booking of a different event type still occupies the
        // organizer's calendar — the repository fetch is organizer-scoped,
        // not event-type-scoped (spec §4.D), so this must still block.
        let event_type = individual_event_type();
        let other_event_type_id = Uuid::new_v4();
        let existing = booking(other_event_type_id, 0, 30, 1);
        let base = Utc::now();
        let slot = Slot::new(base, 30);
        assert!(is_slot_conflicting(&slot, &event_type, 1, 0, 0, 0, &[existing]));
    }

    #[test]
    fn no_buffer_no_overlap_is_fine() {
        let event_type = individual_event_type();
        let existing = booking(event_type.id, 120, 30, 1);
        let base = Utc::now();
        let slot = Slot::new(base, 30);
        assert!(!is_slot_conflicting(&slot, &event_type, 1, 0, 0, 0, &[existing]));
    }

    #[test]
    fn group_capacity_blocks_when_exceeded() {
        let mut event_type = individual_event_type();
        event_type.group = Some(GroupEventConfig { max_attendees: 3 });
        let base = Utc::now();
        let existing = Booking {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            event_type_id: event_type.id,
            start: base,
            end: base + Duration::minutes(30),
            status: BookingStatus::Confirmed,
            attendee_count: 2,
        };
        let slot = Slot::new(base, 30);
        // requested 2 + existing 2 = 4 > 3
        assert!(is_slot_conflicting(&slot, &event_type, 2, 0, 0, 0, &[existing]));
    }

    #[test]
    fn group_capacity_allows_when_no_overlap_with_raw_slot() {
        let mut event_type = individual_event_type();
        event_type.group = Some(GroupEventConfig { max_attendees: 3 });
        let base = Utc::now();
        let existing = Booking {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            event_type_id: event_type.id,
            start: base,
            end: base + Duration::minutes(30),
            status: BookingStatus::Confirmed,
            attendee_count: 2,
        };
        let slot = Slot::new(base + Duration::minutes(30), 30);
        assert!(!is_slot_conflicting(&slot, &event_type, 2, 0, 0, 0, &[existing]));
    }
}
