//! Component H: cache key derivation and the dirty-set invalidation
//! protocol.
//!
//! This module is close to a direct structural port of the original's
//! "Cache Management Functions" section, typed and made crate-injectable —
//! the orchestrator depends on a `Cache` trait instead of a module-scoped
//! singleton (DESIGN NOTES: "the only process-wide state is the cache; it
//! is accessed through an interface").

use std::collections::HashSet;

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Generic key/value cache backend with TTL and glob pattern delete.
/// Errors from this trait are always swallowed by the orchestrator — cache
/// is an optimization, never a dependency for correctness (spec §7).
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
    /// `pattern` uses `*` as a glob wildcard.
    fn delete_pattern(&self, pattern: &str) -> Result<()>;
}

const DIRTY_TTL_SECONDS: u64 = 3600;

/// One recorded change contributing to an organizer's dirty cache state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirtyChange {
    pub cache_type: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub extras: serde_json::Value,
}

/// The per-organizer dirty-cache envelope. `requires_full_invalidation` is
/// sticky — once set by any change, it stays set until `clear_dirty`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DirtyEntry {
    pub requires_full_invalidation: bool,
    pub changes: Vec<DirtyChange>,
}

fn dirty_key(organizer_id: Uuid) -> String {
    format!("dirty_cache:{organizer_id}")
}

const DIRTY_LIST_KEY: &str = "dirty_cache_list";

/// Canonical cache key for one availability query, per spec §4.H:
/// `availability:{organizer}:{event_type}:{start}:{end}:{tz}:{count}`.
pub fn cache_key_for_availability(
    organizer_id: Uuid,
    event_type_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    invitee_timezone: &str,
    attendee_count: u32,
) -> String {
    format!(
        "availability:{organizer_id}:{event_type_id}:{start_date}:{end_date}:{invitee_timezone}:{attendee_count}"
    )
}

/// Upsert the organizer's dirty-cache envelope: set the sticky
/// full-invalidation flag (if requested) and append a change record, then
/// add the organizer to the dirty-organizers set. Both entries are written
/// with a one-hour TTL.
pub fn mark_dirty(
    cache: &dyn Cache,
    organizer_id: Uuid,
    cache_type: &str,
    requires_full_invalidation: bool,
    extras: serde_json::Value,
) -> Result<()> {
    let key = dirty_key(organizer_id);

    let mut entry: DirtyEntry = cache
        .get(&key)?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();

    if requires_full_invalidation {
        entry.requires_full_invalidation = true;
    }
    entry.changes.push(DirtyChange {
        cache_type: cache_type.to_string(),
        timestamp: Utc::now(),
        extras,
    });

    let serialized = serde_json::to_string(&entry)
        .map_err(|e| crate::error::AvailabilityError::Cache(e.to_string()))?;
    cache.set(&key, &serialized, DIRTY_TTL_SECONDS)?;

    let mut dirty_organizers = list_dirty(cache)?;
    dirty_organizers.insert(organizer_id);
    let list_serialized = serde_json::to_string(
        &dirty_organizers.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
    )
    .map_err(|e| crate::error::AvailabilityError::Cache(e.to_string()))?;
    cache.set(DIRTY_LIST_KEY, &list_serialized, DIRTY_TTL_SECONDS)?;

    Ok(())
}

/// The set of organizers with a pending dirty-cache entry.
pub fn list_dirty(cache: &dyn Cache) -> Result<HashSet<Uuid>> {
    let raw = cache.get(DIRTY_LIST_KEY)?;
    let ids: Vec<String> = match raw {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        None => Vec::new(),
    };
    Ok(ids.into_iter().filter_map(|s| s.parse().ok()).collect())
}

/// Remove both the detailed dirty entry and the organizer's membership in
/// the dirty-organizers set.
pub fn clear_dirty(cache: &dyn Cache, organizer_id: Uuid) -> Result<()> {
    cache.delete(&dirty_key(organizer_id))?;

    let mut dirty_organizers = list_dirty(cache)?;
    dirty_organizers.remove(&organizer_id);
    let serialized = serde_json::to_string(
        &dirty_organizers.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
    )
    .map_err(|e| crate::error::AvailabilityError::Cache(e.to_string()))?;
    cache.set(DIRTY_LIST_KEY, &serialized, DIRTY_TTL_SECONDS)?;

    Ok(())
}

/// Build invalidation glob patterns for `(organizer, event_type?,
/// date_range?)`, from most to least specific.
pub fn patterns_for_invalidation(
    organizer_id: Uuid,
    event_type_id: Option<Uuid>,
    date_range: Option<(NaiveDate, NaiveDate)>,
) -> Vec<String> {
    match (event_type_id, date_range) {
        (Some(event_type_id), Some((start, end))) => each_day(start, end)
            .map(|d| format!("availability:{organizer_id}:{event_type_id}:{d}*"))
            .collect(),
        (Some(event_type_id), None) => vec![format!("availability:{organizer_id}:{event_type_id}:*")],
        (None, Some((start, end))) => each_day(start, end)
            .map(|d| format!("availability:{organizer_id}:*:{d}*"))
            .collect(),
        (None, None) => vec![format!("availability:{organizer_id}:*")],
    }
}

fn each_day(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let mut current = Some(start);
    std::iter::from_fn(move || {
        let d = current?;
        current = if d < end { d.checked_add_days(Days::new(1)) } else { None };
        Some(d)
    })
}

/// One key per ISO week (Monday..Sunday) the range touches, deduplicated.
pub fn weekly_keys(organizer_id: Uuid, start_date: NaiveDate, end_date: NaiveDate) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = start_date;

    while current <= end_date {
        let week_start = current - chrono::Duration::days(current.weekday().num_days_from_monday() as i64);
        let week_end = week_start + chrono::Duration::days(6);
        keys.push(format!("availability:{organizer_id}:*:{week_start}:{week_end}"));
        current = week_end + chrono::Duration::days(1);
    }

    keys.sort();
    keys.dedup();
    keys
}

/// Append common-timezone/common-attendee-count permutations of `base_key`
/// for pre-warming/invalidation, using injected configuration rather than
/// reading the environment directly (the surrounding process owns that).
pub fn generate_cache_key_variations(
    base_key: &str,
    common_timezones: &[String],
    common_attendee_counts: &[u32],
) -> Vec<String> {
    let mut variations = vec![base_key.to_string()];
    for tz in common_timezones {
        for count in common_attendee_counts {
            variations.push(format!("{base_key}:{tz}:{count}"));
        }
    }
    variations
}
