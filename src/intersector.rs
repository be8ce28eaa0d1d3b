//! Component F: multi-invitee intersector.
//!
//! Projects UTC slots into each invitee's local time, scores fairness
//! across the requested zones, and sorts by fairness. Also provides the
//! single-zone DST enrichment path used when there's one invitee (or none).

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

use crate::model::Slot;
use crate::time::is_dst;

/// One invitee zone's local projection of a slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InviteeSlotTime {
    pub start_time: DateTime<Tz>,
    pub end_time: DateTime<Tz>,
    pub start_hour: u32,
    pub end_hour: u32,
    pub is_reasonable: bool,
}

/// A slot enriched with per-invitee local times and a fairness score.
#[derive(Debug, Clone)]
pub struct EnrichedSlot {
    pub slot: Slot,
    pub invitee_times: BTreeMap<String, InviteeSlotTime>,
    pub fairness_score: f64,
}

/// A slot enriched with a single timezone's local times and DST flag —
/// the path used when there are fewer than two invitee zones.
#[derive(Debug, Clone)]
pub struct DstEnrichedSlot {
    pub slot: Slot,
    pub local_start: DateTime<Tz>,
    pub local_end: DateTime<Tz>,
    pub is_dst: bool,
}

/// Reasonable-hours window, inclusive, used to score fairness. Matches the
/// organizer-profile-configurable default of 9..18.
#[derive(Debug, Clone, Copy)]
pub struct ReasonableHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for ReasonableHours {
    fn default() -> Self {
        ReasonableHours { start_hour: 9, end_hour: 18 }
    }
}

/// Project each slot into every invitee zone, score fairness, then sort by
/// fairness descending (ties preserve the incoming chronological order —
/// `sort_by` is stable).
///
/// Zones that fail to resolve are logged and omitted from that slot's map;
/// the slot itself always survives.
pub fn calculate_multi_invitee_intersection(
    slots: &[Slot],
    invitee_timezones: &[Tz],
    reasonable_hours: ReasonableHours,
) -> Vec<EnrichedSlot> {
    let mut enriched: Vec<EnrichedSlot> = slots
        .iter()
        .map(|slot| enrich_single_slot(slot, invitee_timezones, reasonable_hours))
        .collect();

    enriched.sort_by(|a, b| {
        b.fairness_score
            .partial_cmp(&a.fairness_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    enriched
}

fn enrich_single_slot(slot: &Slot, invitee_timezones: &[Tz], reasonable_hours: ReasonableHours) -> EnrichedSlot {
    let mut invitee_times = BTreeMap::new();
    let mut reasonable_count = 0usize;

    for tz in invitee_timezones {
        let local_start = slot.start.with_timezone(tz);
        let local_end = slot.end.with_timezone(tz);

        let is_reasonable =
            reasonable_hours.start_hour <= local_start.hour() && local_start.hour() <= reasonable_hours.end_hour;
        if is_reasonable {
            reasonable_count += 1;
        }

        invitee_times.insert(
            tz.to_string(),
            InviteeSlotTime {
                start_time: local_start,
                end_time: local_end,
                start_hour: local_start.hour(),
                end_hour: local_end.hour(),
                is_reasonable,
            },
        );
    }

    let fairness_score = if invitee_timezones.is_empty() {
        1.0
    } else {
        reasonable_count as f64 / invitee_timezones.len() as f64
    };

    EnrichedSlot { slot: *slot, invitee_times, fairness_score }
}

/// Attach local start/end and an `is_dst` flag for a single invitee
/// timezone. Used when fewer than two invitee zones are requested, so
/// there's nothing to intersect — just enrich.
pub fn enhance_slots_with_dst_info(slots: &[Slot], invitee_timezone: Tz) -> Vec<DstEnrichedSlot> {
    slots
        .iter()
        .map(|slot| {
            let local_start = slot.start.with_timezone(&invitee_timezone);
            let local_end = slot.end.with_timezone(&invitee_timezone);
            DstEnrichedSlot {
                slot: *slot,
                local_start,
                local_end,
                is_dst: is_dst(&local_start),
            }
        })
        .collect()
}
