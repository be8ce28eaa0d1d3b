//! In-memory repository doubles used by the integration test suite.
//! Mirrors the teacher's preference for exercising the public API end to
//! end rather than mocking internals.

use availkit::model::{
    AvailabilityRule, Booking, BufferTime, DateOverrideRule, EventType, RecurringBlockedTime,
};
use availkit::repository::{
    BlockRepository, BookingRepository, BufferTimeRepository, EventTypeRepository, OrganizerProfileRepository,
    RuleRepository,
};
use availkit::Result;
use chrono::{NaiveDate, Weekday};
use uuid::Uuid;

#[derive(Default)]
pub struct FakeRepositories {
    pub rules: Vec<AvailabilityRule>,
    pub overrides: Vec<DateOverrideRule>,
    pub one_time_blocks: Vec<availkit::model::BlockedTime>,
    pub recurring_blocks: Vec<RecurringBlockedTime>,
    pub bookings: Vec<Booking>,
    pub buffer: Option<BufferTime>,
    pub organizer_timezone: String,
    pub reasonable_hours: (u32, u32),
    pub event_type: Option<EventType>,
    /// When set, `active_rules_for_weekday` fails with a `Persistence`
    /// error for this weekday, simulating a required read going down
    /// partway through a multi-day range.
    pub fail_rules_on_weekday: Option<Weekday>,
}

impl FakeRepositories {
    pub fn new(organizer_timezone: &str) -> Self {
        FakeRepositories {
            organizer_timezone: organizer_timezone.to_string(),
            reasonable_hours: (9, 18),
            ..Default::default()
        }
    }
}

impl RuleRepository for FakeRepositories {
    fn active_rules_for_weekday(&self, organizer_id: Uuid, weekday: Weekday) -> Result<Vec<AvailabilityRule>> {
        if self.fail_rules_on_weekday == Some(weekday) {
            return Err(availkit::AvailabilityError::Persistence("rules table unreachable".to_string()));
        }
        Ok(self
            .rules
            .iter()
            .filter(|r| r.organizer_id == organizer_id && r.day_of_week == weekday && r.is_active)
            .cloned()
            .collect())
    }

    fn active_overrides_for_date(&self, organizer_id: Uuid, date: NaiveDate) -> Result<Vec<DateOverrideRule>> {
        Ok(self
            .overrides
            .iter()
            .filter(|o| o.organizer_id == organizer_id && o.date == date && o.is_active)
            .cloned()
            .collect())
    }
}

impl BlockRepository for FakeRepositories {
    fn active_one_time_blocks(&self, organizer_id: Uuid) -> Result<Vec<availkit::model::BlockedTime>> {
        Ok(self
            .one_time_blocks
            .iter()
            .filter(|b| b.organizer_id == organizer_id && b.is_active)
            .cloned()
            .collect())
    }

    fn active_recurring_blocks_for_weekday(
        &self,
        organizer_id: Uuid,
        weekday: Weekday,
    ) -> Result<Vec<RecurringBlockedTime>> {
        Ok(self
            .recurring_blocks
            .iter()
            .filter(|b| b.organizer_id == organizer_id && b.day_of_week == weekday && b.is_active)
            .cloned()
            .collect())
    }
}

impl BookingRepository for FakeRepositories {
    fn confirmed_bookings_in(&self, organizer_id: Uuid) -> Result<Vec<Booking>> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| b.organizer_id == organizer_id && b.status == availkit::model::BookingStatus::Confirmed)
            .cloned()
            .collect())
    }
}

impl BufferTimeRepository for FakeRepositories {
    fn get_or_default(&self, organizer_id: Uuid) -> Result<BufferTime> {
        Ok(self.buffer.unwrap_or_else(|| BufferTime::default_for(organizer_id)))
    }
}

impl OrganizerProfileRepository for FakeRepositories {
    fn timezone_name(&self, _organizer_id: Uuid) -> Result<String> {
        Ok(self.organizer_timezone.clone())
    }

    fn reasonable_hours(&self, _organizer_id: Uuid) -> Result<(u32, u32)> {
        Ok(self.reasonable_hours)
    }
}

impl EventTypeRepository for FakeRepositories {
    fn find_by_slug(&self, event_type_slug: &str) -> Result<EventType> {
        self.event_type
            .clone()
            .filter(|e| e.slug == event_type_slug)
            .ok_or_else(|| availkit::AvailabilityError::Persistence("unknown event type".to_string()))
    }
}
