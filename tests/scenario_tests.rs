//! End-to-end scenarios, one per worked example in the availability design
//! notes: a basic weekday, an override replacing a rule, an override
//! closing the day, a buffer conflict, group capacity, and multi-invitee
//! fairness.

mod support;

use availkit::model::{
    AvailabilityRule, Booking, BookingStatus, BufferTime, DateOverrideRule, EventType, EventTypeScope,
    GroupEventConfig,
};
use availkit::orchestrator::{calculate_available_slots, AvailabilitySlots, AvailabilityQuery, Collaborators};
use chrono::{NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use support::FakeRepositories;
use uuid::Uuid;

fn event_type(id: Uuid, duration_minutes: i64) -> EventType {
    EventType {
        id,
        slug: "demo".to_string(),
        duration_minutes,
        buffer_before_minutes: None,
        buffer_after_minutes: None,
        slot_interval_minutes: None,
        group: None,
    }
}

fn run(repos: &FakeRepositories, query: &AvailabilityQuery) -> availkit::AvailabilityResponse {
    let collaborators = Collaborators {
        rules: repos,
        blocks: repos,
        bookings: repos,
        buffers: repos,
        profiles: repos,
        event_types: repos,
    };
    calculate_available_slots(query, &collaborators, None).expect("calculation should not fail shape validation")
}

#[test]
fn basic_weekday_produces_four_slots() {
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    repos.event_type = Some(event_type(event_type_id, 30));
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );

    let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // Monday
    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: date,
        end_date: date,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 1,
        invitee_timezones: vec![],
    };

    let response = run(&repos, &query);
    match response.slots {
        AvailabilitySlots::SingleZone(slots) => {
            assert_eq!(slots.len(), 4);
            for s in &slots {
                assert_eq!(s.slot.duration_minutes, 30);
            }
        }
        _ => panic!("expected single-zone enrichment"),
    }
}

#[test]
fn override_replaces_rule() {
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    repos.event_type = Some(event_type(event_type_id, 30));
    let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );
    repos.overrides.push(
        DateOverrideRule::new(
            organizer,
            date,
            true,
            Some(NaiveTime::from_hms_opt(13, 0, 0).unwrap()),
            Some(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
            EventTypeScope::all(),
            String::new(),
        )
        .unwrap(),
    );

    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: date,
        end_date: date,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 1,
        invitee_timezones: vec![],
    };

    let response = run(&repos, &query);
    match response.slots {
        AvailabilitySlots::SingleZone(slots) => assert_eq!(slots.len(), 2),
        _ => panic!("expected single-zone enrichment"),
    }
}

#[test]
fn override_closes_day() {
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    repos.event_type = Some(event_type(event_type_id, 30));
    let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );
    repos.overrides.push(
        DateOverrideRule::new(organizer, date, false, None, None, EventTypeScope::all(), "holiday".into())
            .unwrap(),
    );

    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: date,
        end_date: date,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 1,
        invitee_timezones: vec![],
    };

    let response = run(&repos, &query);
    assert!(response.slots.is_empty());
}

#[test]
fn buffer_conflict_removes_overlapping_slots() {
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    repos.event_type = Some(event_type(event_type_id, 30));
    repos.buffer = Some(BufferTime {
        organizer_id: organizer,
        default_buffer_before_minutes: 15,
        default_buffer_after_minutes: 15,
        minimum_gap_minutes: 0,
        slot_interval_minutes: 30,
    });
    let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );

    let tz: Tz = "America/New_York".parse().unwrap();
    let naive = chrono::NaiveDateTime::new(date, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    let local_start = {
        use chrono::TimeZone;
        tz.from_local_datetime(&naive).earliest().unwrap()
    };
    repos.bookings.push(Booking {
        id: Uuid::new_v4(),
        organizer_id: organizer,
        event_type_id,
        start: local_start.with_timezone(&chrono::Utc),
        end: local_start.with_timezone(&chrono::Utc) + chrono::Duration::minutes(30),
        status: BookingStatus::Confirmed,
        attendee_count: 1,
    });

    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: date,
        end_date: date,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 1,
        invitee_timezones: vec![],
    };

    let response = run(&repos, &query);
    match response.slots {
        AvailabilitySlots::SingleZone(slots) => assert_eq!(slots.len(), 1),
        _ => panic!("expected single-zone enrichment"),
    }
}

#[test]
fn group_capacity_blocks_when_exceeded_allows_when_not() {
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    let mut et = event_type(event_type_id, 30);
    et.group = Some(GroupEventConfig { max_attendees: 3 });
    repos.event_type = Some(et);
    let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );

    let tz: Tz = "America/New_York".parse().unwrap();
    let naive = chrono::NaiveDateTime::new(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    let local_start = {
        use chrono::TimeZone;
        tz.from_local_datetime(&naive).earliest().unwrap()
    };
    repos.bookings.push(Booking {
        id: Uuid::new_v4(),
        organizer_id: organizer,
        event_type_id,
        start: local_start.with_timezone(&chrono::Utc),
        end: local_start.with_timezone(&chrono::Utc) + chrono::Duration::minutes(30),
        status: BookingStatus::Confirmed,
        attendee_count: 2,
    });

    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: date,
        end_date: date,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 2,
        invitee_timezones: vec![],
    };

    let response = run(&repos, &query);
    match response.slots {
        AvailabilitySlots::SingleZone(slots) => {
            // 09:00 sums to 2+2=4 > 3 -> blocked; 09:30 has no raw overlap -> available.
            assert_eq!(slots.len(), 1);
        }
        _ => panic!("expected single-zone enrichment"),
    }
}

#[test]
fn multi_invitee_fairness_orders_by_reasonableness() {
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    repos.event_type = Some(event_type(event_type_id, 30));
    let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );

    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: date,
        end_date: date,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 1,
        invitee_timezones: vec!["America/New_York".to_string(), "Asia/Tokyo".to_string()],
    };

    let response = run(&repos, &query);
    match response.slots {
        AvailabilitySlots::MultiInvitee(slots) => {
            assert!(!slots.is_empty());
            for window in slots.windows(2) {
                assert!(window[0].fairness_score >= window[1].fairness_score);
            }
        }
        _ => panic!("expected multi-invitee intersection"),
    }
}

#[test]
fn cross_event_type_booking_still_blocks_the_slot() {
    // A confirmed booking of a *different* event type still occupies the
    // organizer's calendar; the booking fetch is organizer-scoped, not
    // event-type-scoped (spec §4.D), so it must still remove the slot.
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let other_event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    repos.event_type = Some(event_type(event_type_id, 30));
    let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );

    let tz: Tz = "America/New_York".parse().unwrap();
    let naive = chrono::NaiveDateTime::new(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    let local_start = {
        use chrono::TimeZone;
        tz.from_local_datetime(&naive).earliest().unwrap()
    };
    repos.bookings.push(Booking {
        id: Uuid::new_v4(),
        organizer_id: organizer,
        event_type_id: other_event_type_id,
        start: local_start.with_timezone(&chrono::Utc),
        end: local_start.with_timezone(&chrono::Utc) + chrono::Duration::minutes(30),
        status: BookingStatus::Confirmed,
        attendee_count: 1,
    });

    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: date,
        end_date: date,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 1,
        invitee_timezones: vec![],
    };

    let response = run(&repos, &query);
    match response.slots {
        // 09:00 overlaps the other event type's 09:00-09:30 booking; 09:30 is free.
        AvailabilitySlots::SingleZone(slots) => assert_eq!(slots.len(), 1),
        _ => panic!("expected single-zone enrichment"),
    }
}

#[test]
fn persistence_failure_mid_range_propagates_instead_of_being_dropped_as_a_warning() {
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    repos.event_type = Some(event_type(event_type_id, 30));
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );
    // Wednesday sits in the middle of the Monday..Sunday range queried below.
    repos.fail_rules_on_weekday = Some(Weekday::Wed);

    let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // Monday
    let end = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(); // Sunday
    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: start,
        end_date: end,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 1,
        invitee_timezones: vec![],
    };

    let collaborators = Collaborators {
        rules: &repos,
        blocks: &repos,
        bookings: &repos,
        buffers: &repos,
        profiles: &repos,
        event_types: &repos,
    };
    let result = calculate_available_slots(&query, &collaborators, None);
    assert!(
        matches!(result, Err(availkit::AvailabilityError::Persistence(_))),
        "a required read failing on one day of the range must fail the whole request, not just that day"
    );
}

#[test]
fn deadline_in_the_past_returns_partial_results_with_timeout_warning() {
    let organizer = Uuid::new_v4();
    let event_type_id = Uuid::new_v4();
    let mut repos = FakeRepositories::new("America/New_York");
    repos.event_type = Some(event_type(event_type_id, 30));
    repos.rules.push(
        AvailabilityRule::new(
            organizer,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            EventTypeScope::all(),
        )
        .unwrap(),
    );

    let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // Monday
    let end = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(); // following Monday
    let query = AvailabilityQuery {
        organizer_id: organizer,
        event_type_slug: "demo".to_string(),
        start_date: start,
        end_date: end,
        invitee_timezone: "UTC".to_string(),
        attendee_count: 1,
        invitee_timezones: vec![],
    };

    let config_collaborators = Collaborators {
        rules: &repos,
        blocks: &repos,
        bookings: &repos,
        buffers: &repos,
        profiles: &repos,
        event_types: &repos,
    };
    let already_past = std::time::Instant::now();
    let response = calculate_available_slots(&query, &config_collaborators, Some(already_past))
        .expect("shape validation should pass");

    assert!(response.warnings.iter().any(|w| w.contains("timed out")));
    assert!(response.slots.is_empty());
}
