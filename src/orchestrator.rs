//! Component G: query orchestrator.
//!
//! `calculate_available_slots` is the public entry point. It validates the
//! request, resolves organizer context, drives B -> E -> C -> D per day in
//! the requested range, then hands accepted slots to F. Errors from
//! required reads fail the whole request; everything else downgrades to a
//! warning with a safe fallback, matching spec §7's propagation policy.

use std::time::Instant;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::blocks::is_slot_blocked;
use crate::bookings::is_slot_conflicting;
use crate::enumerator::enumerate_slots;
use crate::error::{AvailabilityError, Result};
use crate::intersector::{
    calculate_multi_invitee_intersection, enhance_slots_with_dst_info, DstEnrichedSlot, EnrichedSlot,
    ReasonableHours,
};
use crate::model::Slot;
use crate::repository::{
    BlockRepository, BookingRepository, BufferTimeRepository, EventTypeRepository, OrganizerProfileRepository,
    RuleRepository,
};
use crate::rules::daily_available_intervals;
use crate::time::{parse_timezone, validate_timezone};

/// Maximum span a single query may cover (spec §6: `end_date - start_date
/// <= 90 days`).
pub const MAX_DATE_RANGE_DAYS: i64 = 90;

/// A transport-agnostic availability request.
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    pub organizer_id: Uuid,
    pub event_type_slug: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub invitee_timezone: String,
    pub attendee_count: u32,
    pub invitee_timezones: Vec<String>,
}

impl AvailabilityQuery {
    fn validate_shape(&self) -> Result<()> {
        if self.end_date < self.start_date {
            return Err(AvailabilityError::InvalidDateRange(
                "end_date must be on or after start_date".to_string(),
            ));
        }
        if (self.end_date - self.start_date).num_days() > MAX_DATE_RANGE_DAYS {
            return Err(AvailabilityError::InvalidDateRange(format!(
                "date range exceeds the {MAX_DATE_RANGE_DAYS}-day maximum"
            )));
        }
        if self.attendee_count < 1 {
            return Err(AvailabilityError::InvalidDateRange(
                "attendee_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Either the multi-invitee fairness-scored slots or, when fewer than two
/// invitee zones were requested, the single-zone DST-enriched slots.
#[derive(Debug, Clone)]
pub enum AvailabilitySlots {
    MultiInvitee(Vec<EnrichedSlot>),
    SingleZone(Vec<DstEnrichedSlot>),
}

impl AvailabilitySlots {
    pub fn len(&self) -> usize {
        match self {
            AvailabilitySlots::MultiInvitee(slots) => slots.len(),
            AvailabilitySlots::SingleZone(slots) => slots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Field-for-field match of the original's `performance_metrics` dict.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceMetrics {
    pub duration_seconds: f64,
    pub total_slots_calculated: usize,
    pub date_range_days: i64,
}

#[derive(Debug, Clone)]
pub struct AvailabilityResponse {
    pub slots: AvailabilitySlots,
    pub warnings: Vec<String>,
    pub metrics: PerformanceMetrics,
}

/// Everything the orchestrator needs from the surrounding application:
/// read-only collaborators for rules, blocks, bookings, buffers, event
/// types, and organizer profile lookups.
pub struct Collaborators<'a> {
    pub rules: &'a dyn RuleRepository,
    pub blocks: &'a dyn BlockRepository,
    pub bookings: &'a dyn BookingRepository,
    pub buffers: &'a dyn BufferTimeRepository,
    pub profiles: &'a dyn OrganizerProfileRepository,
    pub event_types: &'a dyn EventTypeRepository,
}

/// Compute available slots for `query`. Never panics. Two categories of
/// failure surface as an `Err` rather than a warning-carrying response:
/// shape-validation failures (§6 constraints on the request itself, checked
/// before any work begins) and `Persistence` errors from a required read
/// (rules, overrides, blocks, bookings, buffers, event type, organizer
/// profile) — per spec §7 these fail the whole request rather than only the
/// day that triggered them. Every other calculation failure is downgraded
/// to a warning with a safe fallback, and on any other unexpected failure
/// this returns an empty-slot response carrying an `Unexpected` warning.
///
/// `deadline`, if given, bounds wall-clock time: the per-day loop checks it
/// before starting each date and, once past, stops walking the range and
/// returns whatever slots were already accepted plus a `timeout` warning
/// (spec §5) rather than erroring — cache writes never start until the
/// whole computation finishes, so there is nothing to leave half-written.
pub fn calculate_available_slots(
    query: &AvailabilityQuery,
    collaborators: &Collaborators,
    deadline: Option<Instant>,
) -> Result<AvailabilityResponse> {
    query.validate_shape()?;

    let start = Instant::now();
    let mut warnings = Vec::new();

    match run(query, collaborators, deadline, &mut warnings) {
        Ok(slots) => Ok(AvailabilityResponse {
            metrics: PerformanceMetrics {
                duration_seconds: start.elapsed().as_secs_f64(),
                total_slots_calculated: slots.len(),
                date_range_days: (query.end_date - query.start_date).num_days() + 1,
            },
            slots,
            warnings,
        }),
        Err(AvailabilityError::Persistence(msg)) => {
            log::error!("required read failed for organizer {}: {msg}", query.organizer_id);
            Err(AvailabilityError::Persistence(msg))
        }
        Err(e) => {
            log::error!("unexpected failure computing availability for {}: {e}", query.organizer_id);
            warnings.push(format!("Calculation error: {e}"));
            Ok(AvailabilityResponse {
                slots: AvailabilitySlots::SingleZone(Vec::new()),
                warnings,
                metrics: PerformanceMetrics {
                    duration_seconds: start.elapsed().as_secs_f64(),
                    total_slots_calculated: 0,
                    date_range_days: 0,
                },
            })
        }
    }
}

fn run(
    query: &AvailabilityQuery,
    collaborators: &Collaborators,
    deadline: Option<Instant>,
    warnings: &mut Vec<String>,
) -> Result<AvailabilitySlots> {
    let invitee_timezone = if validate_timezone(&query.invitee_timezone) {
        query.invitee_timezone.clone()
    } else {
        warnings.push(format!("Invalid invitee timezone: {}", query.invitee_timezone));
        "UTC".to_string()
    };

    let mut valid_invitee_timezones = Vec::new();
    for tz in &query.invitee_timezones {
        if validate_timezone(tz) {
            valid_invitee_timezones.push(tz.clone());
        } else {
            warnings.push(format!("Invalid timezone in list: {tz}"));
        }
    }

    let organizer_tz_name = match collaborators.profiles.timezone_name(query.organizer_id) {
        Ok(name) if validate_timezone(&name) => name,
        Ok(invalid) => {
            warnings.push(format!("Invalid organizer timezone '{invalid}', using UTC"));
            "UTC".to_string()
        }
        Err(_) => {
            warnings.push("Invalid organizer timezone, using UTC".to_string());
            "UTC".to_string()
        }
    };
    let organizer_tz = parse_timezone(&organizer_tz_name)?;

    let buffer_settings = collaborators
        .buffers
        .get_or_default(query.organizer_id)
        .map_err(|e| AvailabilityError::Persistence(e.to_string()))?;

    let event_type = collaborators
        .event_types
        .find_by_slug(&query.event_type_slug)
        .map_err(|e| AvailabilityError::Persistence(e.to_string()))?;
    let event_type_id = event_type.id;

    let buffer_before = event_type.effective_buffer_before(&buffer_settings);
    let buffer_after = event_type.effective_buffer_after(&buffer_settings);
    let slot_interval = event_type.effective_slot_interval(&buffer_settings);
    let minimum_gap = buffer_settings.minimum_gap_minutes;

    let confirmed_bookings = collaborators
        .bookings
        .confirmed_bookings_in(query.organizer_id)
        .map_err(|e| AvailabilityError::Persistence(e.to_string()))?;

    let mut all_slots: Vec<Slot> = Vec::new();
    let mut current_date = query.start_date;
    while current_date <= query.end_date {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            warnings.push(format!(
                "Calculation timed out after {current_date}; returning partial results"
            ));
            break;
        }
        let daily = calculate_daily_slots(
            query.organizer_id,
            event_type_id,
            current_date,
            organizer_tz,
            &event_type,
            query.attendee_count,
            buffer_before,
            buffer_after,
            minimum_gap,
            slot_interval,
            collaborators,
            &confirmed_bookings,
        );
        match daily {
            Ok(mut slots) => all_slots.append(&mut slots),
            Err(e @ AvailabilityError::Persistence(_)) => return Err(e),
            Err(e) => warnings.push(format!("Error computing slots for {current_date}: {e}")),
        }
        current_date = current_date
            .succ_opt()
            .ok_or_else(|| AvailabilityError::InvalidDateRange("date overflow walking range".to_string()))?;
    }

    if valid_invitee_timezones.len() > 1 {
        let parsed: Vec<_> = valid_invitee_timezones
            .iter()
            .filter_map(|tz| match parse_timezone(tz) {
                Ok(tz) => Some(tz),
                Err(_) => {
                    warnings.push(format!("Error processing timezone {tz}"));
                    None
                }
            })
            .collect();
        let reasonable_hours = collaborators
            .profiles
            .reasonable_hours(query.organizer_id)
            .map(|(start, end)| ReasonableHours { start_hour: start, end_hour: end })
            .unwrap_or_default();
        let enriched = calculate_multi_invitee_intersection(&all_slots, &parsed, reasonable_hours);
        Ok(AvailabilitySlots::MultiInvitee(enriched))
    } else {
        let tz = parse_timezone(&invitee_timezone)?;
        Ok(AvailabilitySlots::SingleZone(enhance_slots_with_dst_info(&all_slots, tz)))
    }
}

#[allow(clippy::too_many_arguments)]
fn calculate_daily_slots(
    organizer_id: Uuid,
    event_type_id: Uuid,
    date: NaiveDate,
    organizer_tz: chrono_tz::Tz,
    event_type: &crate::model::EventType,
    attendee_count: u32,
    buffer_before: i64,
    buffer_after: i64,
    minimum_gap: i64,
    slot_interval: i64,
    collaborators: &Collaborators,
    confirmed_bookings: &[crate::model::Booking],
) -> Result<Vec<Slot>> {
    let rules = collaborators
        .rules
        .active_rules_for_weekday(organizer_id, date.weekday())
        .map_err(|e| AvailabilityError::Persistence(e.to_string()))?;
    let overrides = collaborators
        .rules
        .active_overrides_for_date(organizer_id, date)
        .map_err(|e| AvailabilityError::Persistence(e.to_string()))?;

    let intervals = daily_available_intervals(event_type_id, date, organizer_tz, &rules, &overrides)?;
    if intervals.is_empty() {
        return Ok(Vec::new());
    }

    let one_time_blocks = collaborators
        .blocks
        .active_one_time_blocks(organizer_id)
        .map_err(|e| AvailabilityError::Persistence(e.to_string()))?;
    let recurring_blocks = collaborators
        .blocks
        .active_recurring_blocks_for_weekday(organizer_id, date.weekday())
        .map_err(|e| AvailabilityError::Persistence(e.to_string()))?;

    let mut accepted = Vec::new();
    for (interval_start, interval_end) in intervals {
        let candidates = enumerate_slots(interval_start, interval_end, event_type.duration_minutes, slot_interval);
        for slot in candidates {
            if is_slot_blocked(
                &slot,
                date,
                organizer_tz,
                event_type_id,
                &one_time_blocks,
                &recurring_blocks,
                &overrides,
            ) {
                continue;
            }
            if is_slot_conflicting(
                &slot,
                event_type,
                attendee_count,
                buffer_before,
                buffer_after,
                minimum_gap,
                confirmed_bookings,
            ) {
                continue;
            }
            accepted.push(slot);
        }
    }

    Ok(accepted)
}
