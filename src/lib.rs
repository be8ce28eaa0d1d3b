//! # availkit
//!
//! A timezone-aware booking availability engine: given an organizer, an
//! event type, a date range, and one or more invitee time zones, computes
//! every legal bookable start time, filtering against layered availability
//! rules, one-time and recurring blocks, and existing bookings with
//! buffered conflict detection — then intersects across invitee zones with
//! a fairness score and exposes a cache-key/invalidation protocol so
//! callers can reuse results safely.
//!
//! ## Quick Start
//!
//! ```rust
//! use availkit::model::{AvailabilityRule, EventTypeScope};
//! use availkit::rules::daily_available_intervals;
//! use chrono::{NaiveDate, NaiveTime, Weekday};
//! use chrono_tz::America::New_York;
//! use uuid::Uuid;
//!
//! let organizer = Uuid::new_v4();
//! let event_type = Uuid::new_v4();
//! let rule = AvailabilityRule::new(
//!     organizer,
//!     Weekday::Mon,
//!     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
//!     NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
//!     EventTypeScope::all(),
//! ).expect("valid rule");
//!
//! let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // a Monday
//! let intervals = daily_available_intervals(event_type, date, New_York, &[rule], &[])
//!     .expect("resolves");
//! assert_eq!(intervals.len(), 1);
//! ```
//!
//! The full pipeline — rule resolution, slot enumeration, block/booking
//! filtering, multi-invitee intersection — is driven end to end by
//! [`orchestrator::calculate_available_slots`].

pub mod blocks;
pub mod bookings;
pub mod cache;
pub mod config;
pub mod enumerator;
pub mod intersector;
pub mod model;
pub mod orchestrator;
pub mod repository;
pub mod rules;
pub mod time;

mod error;

pub use config::EngineConfig;
pub use error::{AvailabilityError, Result};
pub use orchestrator::{calculate_available_slots, AvailabilityQuery, AvailabilityResponse, Collaborators};

// Re-exported for callers building queries and repository adapters.
pub use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
pub use chrono_tz::Tz;
