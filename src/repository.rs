//! Read-only collaborator traits the orchestrator depends on.
//!
//! Each method corresponds 1:1 to one of the original's Django ORM
//! queries (`AvailabilityRule.objects.filter(...)`, `Booking.objects.filter(...)`,
//! etc.), typed instead of dynamically queried. Plain sync traits — the
//! teacher crate carries no async runtime and spec §5 describes a
//! synchronous-per-request orchestrator called from a multi-threaded
//! server, not an async one.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{AvailabilityRule, Booking, BufferTime, DateOverrideRule, EventType, RecurringBlockedTime};

/// Availability rules and date overrides for an organizer.
pub trait RuleRepository: Send + Sync {
    fn active_rules_for_weekday(
        &self,
        organizer_id: Uuid,
        weekday: chrono::Weekday,
    ) -> Result<Vec<AvailabilityRule>>;

    fn active_overrides_for_date(
        &self,
        organizer_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DateOverrideRule>>;
}

/// One-time and recurring blocked times for an organizer.
pub trait BlockRepository: Send + Sync {
    fn active_one_time_blocks(&self, organizer_id: Uuid) -> Result<Vec<crate::model::BlockedTime>>;

    fn active_recurring_blocks_for_weekday(
        &self,
        organizer_id: Uuid,
        weekday: chrono::Weekday,
    ) -> Result<Vec<RecurringBlockedTime>>;
}

/// Confirmed bookings for an organizer, across every event type. The
/// repository is expected to pre-filter to `status = confirmed` — the
/// method name documents this contract so `bookings::is_slot_conflicting`
/// never needs to re-check it. Not scoped to a single event type: a
/// confirmed booking of a *different* event type still occupies the
/// organizer's calendar and must be observable as a conflict (spec §4.D);
/// only the group-capacity sum inside `is_slot_conflicting` narrows to the
/// candidate's own event type.
pub trait BookingRepository: Send + Sync {
    fn confirmed_bookings_in(&self, organizer_id: Uuid) -> Result<Vec<Booking>>;
}

/// Per-organizer buffer/gap/cadence defaults, lazily created.
pub trait BufferTimeRepository: Send + Sync {
    fn get_or_default(&self, organizer_id: Uuid) -> Result<BufferTime>;
}

/// Organizer profile lookups the orchestrator needs: timezone and
/// reasonable-hours window.
pub trait OrganizerProfileRepository: Send + Sync {
    fn timezone_name(&self, organizer_id: Uuid) -> Result<String>;
    fn reasonable_hours(&self, organizer_id: Uuid) -> Result<(u32, u32)>;
}

/// Event-type lookups. Read-only, external to this crate's write surface.
/// Looked up by slug — the external query interface (spec §6) identifies
/// an event type by `event_type_slug`, not its internal id.
pub trait EventTypeRepository: Send + Sync {
    fn find_by_slug(&self, event_type_slug: &str) -> Result<EventType>;
}
