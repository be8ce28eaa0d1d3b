//! Engine configuration: plain values injected at construction, never read
//! from the environment by this crate (DESIGN NOTES: "Configuration inputs
//! are plain value lists injected at construction; no global config read").
//!
//! Builder style mirrors the teacher's `EventBuilder` fluent setters.

use crate::model::BufferTime;
use uuid::Uuid;

/// Values the surrounding process would otherwise read from
/// `AVAILABILITY_COMMON_TIMEZONES` / `AVAILABILITY_COMMON_ATTENDEE_COUNTS`,
/// plus the fallback buffer defaults used when an organizer has no
/// `BufferTime` row yet.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    common_timezones: Vec<String>,
    common_attendee_counts: Vec<u32>,
    default_buffer: BufferTime,
}

impl EngineConfig {
    /// Starts with the teacher-style sane defaults: `["UTC"]`, `[1]`, and
    /// `BufferTime::default_for` keyed to a nil organizer id (callers
    /// should override `default_buffer` with a real organizer id before
    /// use if they rely on it being attributable).
    pub fn new() -> Self {
        EngineConfig {
            common_timezones: vec!["UTC".to_string()],
            common_attendee_counts: vec![1],
            default_buffer: BufferTime::default_for(Uuid::nil()),
        }
    }

    pub fn common_timezones(mut self, timezones: Vec<String>) -> Self {
        self.common_timezones = timezones;
        self
    }

    pub fn common_attendee_counts(mut self, counts: Vec<u32>) -> Self {
        self.common_attendee_counts = counts;
        self
    }

    pub fn default_buffer(mut self, buffer: BufferTime) -> Self {
        self.default_buffer = buffer;
        self
    }

    pub fn get_common_timezones(&self) -> &[String] {
        &self.common_timezones
    }

    pub fn get_common_attendee_counts(&self) -> &[u32] {
        &self.common_attendee_counts
    }

    pub fn get_default_buffer(&self) -> BufferTime {
        self.default_buffer
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
