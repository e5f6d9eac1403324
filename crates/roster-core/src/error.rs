//! Error types for the booking engine.
//!
//! Every rejection carries a stable machine-readable code ([`BookingError::code`])
//! and a category ([`ErrorKind`]) so interface layers can decide how to surface
//! it without matching on individual variants.

use std::fmt;
use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

/// Broad category of a [`BookingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input. Never retried.
    Validation,
    /// The request is well-formed but collides with current state.
    Conflict,
    /// The actor does not own the resource.
    Authorization,
    /// The referenced resource does not exist.
    NotFound,
    /// Serialization failure or lock contention in the store.
    TransientStore,
    /// Store, file system or configuration failure.
    Internal,
}

/// Comprehensive error type for all booking operations.
#[derive(Error, Debug)]
pub enum BookingError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Required fields were empty or zero
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },
    /// Day of week could not be parsed
    #[error("Invalid day of week '{value}'")]
    InvalidDay { value: String },
    /// Time is not in HH:MM form
    #[error("Invalid time '{value}' for field '{field}', expected HH:MM")]
    InvalidTimeFormat { field: String, value: String },
    /// Date is not in YYYY-MM-DD form
    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDateFormat { value: String },
    /// Slot start is not before its end
    #[error("Start time {start} must be before end time {end}")]
    InvalidRange { start: String, end: String },
    /// Slot intersects or touches an existing active slot
    #[error("Slot {start}-{end} overlaps existing slot {existing_id} ({existing_start}-{existing_end})")]
    Overlap {
        start: String,
        end: String,
        existing_id: u64,
        existing_start: String,
        existing_end: String,
    },
    /// Customer and provider are the same natural person
    #[error("You cannot book an appointment with yourself")]
    SelfBookingNotAllowed,
    /// Customer already holds the maximum number of scheduled appointments
    #[error("Booking limit reached: {limit} scheduled appointments already held")]
    BookingLimitReached { limit: u32 },
    /// No slot on that weekday, or none starting at the requested time
    #[error(
        "No availability slot on {day}{}",
        time.as_ref().map(|t| format!(" starting at {t}")).unwrap_or_default()
    )]
    SlotNotFound { day: String, time: Option<String> },
    /// Slot already holds an active appointment for the date
    #[error("Slot {slot_id} is already booked on {date}")]
    SlotAlreadyBooked { slot_id: u64, date: String },
    /// Same-day bookings are closed after the cutoff hour
    #[error("Bookings for {date} are closed after {cutoff_hour:02}:00")]
    ClosedForToday { date: String, cutoff_hour: u8 },
    /// Requested date and time is not in the future
    #[error("Cannot book {date} {time}: date and time must be in the future")]
    PastDateTime { date: String, time: String },
    /// Appointment is in a terminal status
    #[error("Appointment {id} is already {status}")]
    AlreadyTerminal { id: u64, status: String },
    /// Status string is outside the allow-list
    #[error("Invalid status '{value}'")]
    InvalidStatus { value: String },
    /// Target status is not reachable from the current one
    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    /// Actor does not own the resource
    #[error("Actor {actor_id} is not allowed to {action}")]
    Forbidden { actor_id: u64, action: String },
    /// Rating requested for an appointment that is not completed
    #[error("Appointment {id} cannot be rated while {status}")]
    NotRatable { id: u64, status: String },
    /// Appointment already carries a rating
    #[error("Appointment {id} has already been rated")]
    AlreadyRated { id: u64 },
    /// Rating value outside 1..=5
    #[error("Rating must be between 1 and 5, got {value}")]
    InvalidRating { value: i64 },
    /// No-show report lacks photo or description
    #[error("No-show report requires {missing}")]
    MissingEvidence { missing: String },
    /// Action attempted before it is allowed
    #[error("Too early to {action}: {remaining_minutes} minute(s) remaining")]
    TooEarly {
        action: String,
        remaining_minutes: i64,
    },
    /// Compare-and-swap failed or transient errors exhausted retries
    #[error("Conflict: {message}")]
    Conflict { message: String },
    /// Caller exceeded the request budget for a key
    #[error("Too many attempts, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: i64 },
    /// Referenced entity does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> BookingError {
        BookingError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> BookingError {
        BookingError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl BookingError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a new database error with additional context.
    pub fn database_error(message: &str, source: rusqlite::Error) -> Self {
        Self::database(message).with_source(source)
    }

    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database { .. } if self.is_transient() => "TRANSIENT_STORE",
            Self::Database { .. } => "DATABASE",
            Self::MissingFields { .. } => "MISSING_FIELDS",
            Self::InvalidDay { .. } => "INVALID_DAY",
            Self::InvalidTimeFormat { .. } => "INVALID_TIME_FORMAT",
            Self::InvalidDateFormat { .. } => "INVALID_DATE_FORMAT",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::Overlap { .. } => "OVERLAP",
            Self::SelfBookingNotAllowed => "SELF_BOOKING_NOT_ALLOWED",
            Self::BookingLimitReached { .. } => "BOOKING_LIMIT_REACHED",
            Self::SlotNotFound { .. } => "SLOT_NOT_FOUND",
            Self::SlotAlreadyBooked { .. } => "SLOT_ALREADY_BOOKED",
            Self::ClosedForToday { .. } => "CLOSED_FOR_TODAY",
            Self::PastDateTime { .. } => "PAST_DATE_TIME",
            Self::AlreadyTerminal { .. } => "ALREADY_TERMINAL",
            Self::InvalidStatus { .. } => "INVALID_STATUS",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::NotRatable { .. } => "NOT_RATABLE",
            Self::AlreadyRated { .. } => "ALREADY_RATED",
            Self::InvalidRating { .. } => "INVALID_RATING",
            Self::MissingEvidence { .. } => "MISSING_EVIDENCE",
            Self::TooEarly { .. } => "TOO_EARLY",
            Self::Conflict { .. } => "CONFLICT",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::FileSystem { .. } => "FILE_SYSTEM",
            Self::XdgDirectory(_) => "XDG_DIRECTORY",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Serialization { .. } => "SERIALIZATION",
            Self::Configuration { .. } => "CONFIGURATION",
        }
    }

    /// Category used by interface layers to pick a response shape.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database { .. } if self.is_transient() => ErrorKind::TransientStore,
            Self::MissingFields { .. }
            | Self::InvalidDay { .. }
            | Self::InvalidTimeFormat { .. }
            | Self::InvalidDateFormat { .. }
            | Self::InvalidRange { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidRating { .. }
            | Self::MissingEvidence { .. }
            | Self::InvalidInput { .. }
            | Self::PastDateTime { .. } => ErrorKind::Validation,
            Self::Overlap { .. }
            | Self::SelfBookingNotAllowed
            | Self::BookingLimitReached { .. }
            | Self::SlotAlreadyBooked { .. }
            | Self::ClosedForToday { .. }
            | Self::AlreadyTerminal { .. }
            | Self::InvalidTransition { .. }
            | Self::NotRatable { .. }
            | Self::AlreadyRated { .. }
            | Self::TooEarly { .. }
            | Self::Conflict { .. }
            | Self::RateLimited { .. } => ErrorKind::Conflict,
            Self::Forbidden { .. } => ErrorKind::Authorization,
            Self::NotFound { .. } | Self::SlotNotFound { .. } => ErrorKind::NotFound,
            Self::Database { .. }
            | Self::FileSystem { .. }
            | Self::XdgDirectory(_)
            | Self::Serialization { .. }
            | Self::Configuration { .. } => ErrorKind::Internal,
        }
    }

    /// Returns true for lock contention that is worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database { source, .. } => is_transient_sqlite(source),
            _ => false,
        }
    }
}

/// SQLITE_BUSY and SQLITE_LOCKED surface when writers contend for the file.
pub(crate) fn is_transient_sqlite(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

/// Unique and check constraint violations.
pub(crate) fn is_constraint_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    )
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| BookingError::database(message).with_source(e))
    }
}

/// Extension trait for Result to provide concise error mapping with
/// anyhow-style context.
pub trait ResultExt<T> {
    /// Add context to any error type, converting to a configuration error.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| BookingError::Configuration {
            message: format!("{context}: {e}"),
        })
    }
}

/// Result type alias for booking operations
pub type Result<T> = std::result::Result<T, BookingError>;
