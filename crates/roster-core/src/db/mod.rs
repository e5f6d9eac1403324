//! Database operations and SQLite management.
//!
//! This module owns the SQLite connection and schema and provides the
//! transactional queries behind every engine operation, split by concern:
//!
//! - [`slot_queries`]: the weekly availability catalog
//! - [`availability_queries`]: per-date slot resolution
//! - [`appointment_queries`]: booking and cancellation
//! - [`lifecycle_queries`]: status transitions and no-show reports
//! - [`feedback_queries`]: ratings and backjobs
//! - [`penalty_queries`]: penalty records and cancellation history
//! - [`profile_queries`]: identity records and located providers
//! - [`rate_limit`]: shared TTL counters
//!
//! Writes that must not interleave with a concurrent writer open their
//! transaction with `BEGIN IMMEDIATE`, so the check and the write that
//! follows it see the same state.

use std::{path::Path, time::Duration};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::{DatabaseResultExt, Result};

pub mod appointment_queries;
pub mod availability_queries;
pub mod feedback_queries;
pub mod lifecycle_queries;
pub mod migrations;
pub mod penalty_queries;
pub mod profile_queries;
pub mod rate_limit;
pub mod slot_queries;
pub mod utils;

pub use rate_limit::RateLimitDecision;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Self::open(path)?;
        db.initialize_schema()?;
        Ok(db)
    }

    /// Connects to a database whose schema is already in place.
    ///
    /// Only per-connection settings are applied; the schema batch and
    /// migrations are left to [`Self::new`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;
        connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        Ok(Self { connection })
    }

    /// Opens a write transaction that takes the database write lock up front.
    fn immediate(&mut self) -> Result<Transaction<'_>> {
        self.connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")
    }
}
