//! Data model: the entities the engine reads and the `Slot` value it
//! produces.
//!
//! Validating constructors mirror the teacher's `EventBuilder::build` style —
//! return `Result`, reject invalid states up front — but simplified to a
//! single `new`/`try_new` per type since none of these structs carry the
//! number of optional fields `Event` does.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AvailabilityError, Result};
use crate::time::intervals_overlap;

/// Which event types a rule or override applies to. An empty scope means
/// "all event types" — this is a newtype rather than a bare `Option` so call
/// sites read `scope.matches(event_type_id)` instead of re-deriving the
/// empty-means-all convention at every call site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeScope(pub HashSet<Uuid>);

impl EventTypeScope {
    pub fn all() -> Self {
        EventTypeScope(HashSet::new())
    }

    pub fn only(ids: impl IntoIterator<Item = Uuid>) -> Self {
        EventTypeScope(ids.into_iter().collect())
    }

    pub fn matches(&self, event_type_id: Uuid) -> bool {
        self.0.is_empty() || self.0.contains(&event_type_id)
    }

    /// Two scopes overlap if either is "all" or they share at least one id.
    pub fn overlaps(&self, other: &EventTypeScope) -> bool {
        self.0.is_empty() || other.0.is_empty() || self.0.intersection(&other.0).next().is_some()
    }
}

/// A weekly recurring availability window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub event_types: EventTypeScope,
    pub is_active: bool,
}

impl AvailabilityRule {
    pub fn new(
        organizer_id: Uuid,
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        event_types: EventTypeScope,
    ) -> Result<Self> {
        if start_time == end_time {
            return Err(AvailabilityError::ValidationError(
                "start time and end time cannot be the same".to_string(),
            ));
        }
        Ok(AvailabilityRule {
            id: Uuid::new_v4(),
            organizer_id,
            day_of_week,
            start_time,
            end_time,
            event_types,
            is_active: true,
        })
    }

    pub fn spans_midnight(&self) -> bool {
        self.end_time <= self.start_time
    }
}

/// A per-date exception that replaces recurring rules for that date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateOverrideRule {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub event_types: EventTypeScope,
    pub reason: String,
    pub is_active: bool,
}

impl DateOverrideRule {
    pub fn new(
        organizer_id: Uuid,
        date: NaiveDate,
        is_available: bool,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        event_types: EventTypeScope,
        reason: String,
    ) -> Result<Self> {
        if is_available {
            match (start_time, end_time) {
                (Some(s), Some(e)) if s != e => {}
                (Some(_), Some(_)) => {
                    return Err(AvailabilityError::ValidationError(
                        "start time and end time cannot be the same".to_string(),
                    ));
                }
                _ => {
                    return Err(AvailabilityError::ValidationError(
                        "start_time and end_time are required when is_available is true"
                            .to_string(),
                    ));
                }
            }
        }
        Ok(DateOverrideRule {
            id: Uuid::new_v4(),
            organizer_id,
            date,
            is_available,
            start_time,
            end_time,
            event_types,
            reason,
            is_active: true,
        })
    }

    pub fn spans_midnight(&self) -> bool {
        match (self.start_time, self.end_time) {
            (Some(s), Some(e)) => e <= s,
            _ => false,
        }
    }
}

/// A weekly recurring busy window layered on top of availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringBlockedTime {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl RecurringBlockedTime {
    pub fn new(
        organizer_id: Uuid,
        name: String,
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self> {
        if start_time == end_time {
            return Err(AvailabilityError::ValidationError(
                "start time and end time cannot be the same".to_string(),
            ));
        }
        if let (Some(s), Some(e)) = (start_date, end_date) {
            if s > e {
                return Err(AvailabilityError::ValidationError(
                    "start date must be before or equal to end date".to_string(),
                ));
            }
        }
        Ok(RecurringBlockedTime {
            id: Uuid::new_v4(),
            organizer_id,
            name,
            day_of_week,
            start_time,
            end_time,
            start_date,
            end_date,
            is_active: true,
        })
    }

    pub fn spans_midnight(&self) -> bool {
        self.end_time <= self.start_time
    }

    /// Whether this block's recurrence window covers `date`. Open bounds are
    /// treated as unbounded in that direction.
    pub fn applies_to_date(&self, date: NaiveDate) -> bool {
        let after_start = self.start_date.map(|d| d <= date).unwrap_or(true);
        let before_end = self.end_date.map(|d| date <= d).unwrap_or(true);
        after_start && before_end
    }
}

/// Where a one-off [`BlockedTime`] originated. Records with a non-manual
/// source are created only by sync workers; the engine never writes these,
/// it only reads them — enforcement of "manual API must not set source"
/// belongs to the write-side the engine does not own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockSource {
    Manual,
    ExternalCalendar(String),
}

/// A one-off busy window, absolute instants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedTime {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: String,
    pub source: BlockSource,
    pub is_active: bool,
}

impl BlockedTime {
    pub fn new(
        organizer_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reason: String,
        source: BlockSource,
    ) -> Result<Self> {
        if end <= start {
            return Err(AvailabilityError::ValidationError(
                "end instant must be strictly after start instant".to_string(),
            ));
        }
        Ok(BlockedTime {
            id: Uuid::new_v4(),
            organizer_id,
            start,
            end,
            reason,
            source,
            is_active: true,
        })
    }

    /// Documents the "manual writes must not set/alter source" invariant as
    /// a checkable precondition for the write-side repository; the engine
    /// itself never calls this, it only reads finished records.
    pub fn assert_manual_source(&self) -> Result<()> {
        match self.source {
            BlockSource::Manual => Ok(()),
            BlockSource::ExternalCalendar(ref id) => Err(AvailabilityError::ValidationError(
                format!("block {} is sourced from external calendar {id}, not manual", self.id),
            )),
        }
    }
}

/// Per-organizer global buffer/gap/cadence defaults. Exactly one record per
/// organizer, lazily created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BufferTime {
    pub organizer_id: Uuid,
    pub default_buffer_before_minutes: i64,
    pub default_buffer_after_minutes: i64,
    pub minimum_gap_minutes: i64,
    pub slot_interval_minutes: i64,
}

impl BufferTime {
    /// Sane fallback used when no row exists yet for an organizer.
    pub fn default_for(organizer_id: Uuid) -> Self {
        BufferTime {
            organizer_id,
            default_buffer_before_minutes: 15,
            default_buffer_after_minutes: 15,
            minimum_gap_minutes: 0,
            slot_interval_minutes: 30,
        }
    }
}

/// Group-event capacity configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroupEventConfig {
    pub max_attendees: u32,
}

/// A bookable offering. Read-only from the engine's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventType {
    pub id: Uuid,
    pub slug: String,
    pub duration_minutes: i64,
    pub buffer_before_minutes: Option<i64>,
    pub buffer_after_minutes: Option<i64>,
    pub slot_interval_minutes: Option<i64>,
    pub group: Option<GroupEventConfig>,
}

impl EventType {
    pub fn is_group_event(&self) -> bool {
        self.group.is_some()
    }

    pub fn effective_buffer_before(&self, organizer_default: &BufferTime) -> i64 {
        self.buffer_before_minutes
            .unwrap_or(organizer_default.default_buffer_before_minutes)
    }

    pub fn effective_buffer_after(&self, organizer_default: &BufferTime) -> i64 {
        self.buffer_after_minutes
            .unwrap_or(organizer_default.default_buffer_after_minutes)
    }

    pub fn effective_slot_interval(&self, organizer_default: &BufferTime) -> i64 {
        self.slot_interval_minutes
            .unwrap_or(organizer_default.slot_interval_minutes)
    }
}

/// Status of an existing booking. Only `Confirmed` participates in conflict
/// checks — repositories are expected to pre-filter to confirmed rows before
/// handing them to the engine (see `BookingRepository::confirmed_bookings_in`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    NoShow,
}

/// An existing booking. Read-only from the engine's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub event_type_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub attendee_count: u32,
}

/// A candidate bookable start time, produced by the engine. Kept free of
/// enrichment fields on purpose — `EnrichedSlot`/`InviteeSlot` wrap this
/// rather than bloat it, the same way the teacher keeps `EventOccurrence` a
/// separate wrapper around `Event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl Slot {
    pub fn new(start: DateTime<Utc>, duration_minutes: i64) -> Self {
        Slot {
            start,
            end: start + chrono::Duration::minutes(duration_minutes),
            duration_minutes,
        }
    }
}

/// Validates the write-time invariant from spec §3: within one
/// organizer+day, two active rules with overlapping event-type scope must
/// not overlap in time — adjacency forbidden, to force consolidation. This
/// is the write-side check; the read path (`rules`/`blocks`/`bookings`)
/// always uses the strict, adjacency-permitting variant instead. The two
/// are intentionally not unified — see DESIGN.md.
pub fn validate_no_overlapping_rules(
    organizer_id: Uuid,
    day_of_week: Weekday,
    candidate_start: NaiveTime,
    candidate_end: NaiveTime,
    candidate_scope: &EventTypeScope,
    existing: &[AvailabilityRule],
    excluding: Option<Uuid>,
) -> Result<()> {
    for rule in existing {
        if rule.organizer_id != organizer_id || rule.day_of_week != day_of_week || !rule.is_active {
            continue;
        }
        if excluding == Some(rule.id) {
            continue;
        }
        if !candidate_scope.overlaps(&rule.event_types) {
            continue;
        }
        if intervals_overlap(candidate_start, candidate_end, rule.start_time, rule.end_time, true) {
            return Err(AvailabilityError::ValidationError(format!(
                "time range overlaps with existing availability rule on {} ({} - {})",
                rule.day_of_week, rule.start_time, rule.end_time
            )));
        }
    }
    Ok(())
}
