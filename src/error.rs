//! Error types for the availkit engine

use thiserror::Error;

/// Result type alias for availkit operations
pub type Result<T> = std::result::Result<T, AvailabilityError>;

/// Error types that can occur in availkit operations
#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// Error parsing date/time strings
    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(String),

    /// Error parsing timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// The requested date range is malformed (end before start, exceeds the
    /// maximum span, etc.)
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// An event-type scope check failed to resolve. Internal to the engine;
    /// never surfaced past the orchestrator boundary (it is either resolved
    /// or downgraded to a warning before the caller sees a response).
    #[error("Scope mismatch: {0}")]
    #[doc(hidden)]
    ScopeMismatch(String),

    /// A required read against a repository collaborator failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A cache backend operation failed. Never fatal to a request — the
    /// orchestrator always swallows these per the engine's error-handling
    /// design (cache is an optimization, not a dependency for correctness).
    #[error("Cache error: {0}")]
    Cache(String),

    /// The orchestrator's caller-supplied deadline elapsed before the
    /// calculation completed.
    #[error("Calculation timed out")]
    Timeout,

    /// Error with event validation
    #[error("Event validation error: {0}")]
    ValidationError(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
