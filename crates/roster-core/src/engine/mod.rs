//! High-level booking API.
//!
//! [`BookingEngine`] is the async entry point every interface goes through.
//! It validates parameter structs, reads the clock once per operation, runs
//! the store work on the blocking pool and fires side effects once the
//! primary write has committed.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  params::*      │    │  BookingEngine  │    │    Database     │
//! │  + validate()   │───▶│  (engine/*_ops) │───▶│   (via db/)     │
//! └─────────────────┘    └────────┬────────┘    └─────────────────┘
//!                                 │ after commit
//!                                 ▼
//!                        ┌─────────────────┐
//!                        │ notify, penalty │
//!                        │ detection       │
//!                        └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`BookingEngine`] instances
//! - [`slot_ops`]: the weekly availability catalog
//! - [`availability_ops`]: per-date slot resolution
//! - [`booking_ops`]: booking, cancellation and penalties
//! - [`lifecycle_ops`]: status transitions and no-show reports
//! - [`feedback_ops`]: ratings and backjobs
//! - [`profile_ops`]: profiles and nearby providers
//!
//! Every store call opens its own connection, so an engine can be shared
//! freely between tasks. The schema is set up once, when the builder runs. Transient lock contention is retried according to
//! the configured [`RetryPolicy`] before surfacing as a conflict.
//!
//! # Example
//!
//! ```rust,no_run
//! use roster_core::{params::ResolveAvailability, BookingEngineBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = BookingEngineBuilder::new()
//!     .with_database_path(Some("roster.db"))
//!     .build()
//!     .await?;
//!
//! let slots = engine
//!     .resolve_availability(&ResolveAvailability {
//!         provider_id: 1,
//!         date: "2025-01-06".to_string(),
//!     })
//!     .await?;
//! for entry in &slots {
//!     println!("{} {}", entry.slot.start_time, entry.status.as_str());
//! }
//! # Ok(())
//! # }
//! ```

use std::{
    future::Future,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use jiff::Zoned;
use tokio::task::{self, JoinSet};

pub mod availability_ops;
pub mod booking_ops;
pub mod builder;
pub mod feedback_ops;
pub mod lifecycle_ops;
pub mod profile_ops;
pub mod slot_ops;

#[cfg(test)]
mod tests;

pub use builder::BookingEngineBuilder;

use crate::{
    availability::BookingWindow,
    clock::Clock,
    config::EngineConfig,
    db::{utils::RetryPolicy, Database},
    error::{BookingError, Result},
    evidence::EvidenceStore,
    notify::{BookingEvent, Notifier},
};

/// Main interface for availability, bookings and their lifecycle.
#[derive(Clone)]
pub struct BookingEngine {
    pub(crate) db_path: PathBuf,
    pub(crate) config: EngineConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) evidence: Arc<dyn EvidenceStore>,
    pub(crate) retry: RetryPolicy,
    pub(crate) side_effects: Arc<Mutex<JoinSet<()>>>,
}

impl BookingEngine {
    /// Location of the database file.
    pub fn database_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current instant in the business time zone.
    pub(crate) fn now(&self) -> Zoned {
        self.clock.now()
    }

    /// Booking window derived from `now`.
    pub(crate) fn window(&self, now: &Zoned) -> BookingWindow {
        BookingWindow::new(now.datetime(), self.config.booking_cutoff_hour)
    }

    /// Runs `op` against a fresh connection on the blocking pool, retrying
    /// transient store failures.
    ///
    /// The builder has already created the schema, so the connection is
    /// opened without re-running it.
    pub(crate) async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnMut(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        let retry = self.retry;

        task::spawn_blocking(move || {
            let mut db = Database::open(&db_path)?;
            db.with_retry(retry, op)
        })
        .await
        .map_err(|e| BookingError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Waits for notifications and penalty detection still in flight.
    ///
    /// Short-lived callers such as the CLI call this before exiting;
    /// dropping the runtime first would cancel the pending work.
    pub async fn flush(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.lock_side_effects());
            if pending.is_empty() {
                return;
            }
            while let Some(joined) = pending.join_next().await {
                if let Err(e) = joined {
                    log::warn!("Side-effect task did not finish: {e}");
                }
            }
        }
    }

    /// Runs `work` in the background after the primary write has committed.
    pub(crate) fn spawn_side_effect<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock_side_effects();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(work);
    }

    fn lock_side_effects(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.side_effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands an event to the notifier in the background.
    pub(crate) fn dispatch(&self, event: BookingEvent) {
        let notifier = Arc::clone(&self.notifier);
        self.spawn_side_effect(async move {
            if let Err(e) = notifier.notify(&event) {
                log::warn!(
                    "Failed to deliver {} for appointment {}: {e}",
                    event.name(),
                    event.appointment_id()
                );
            }
        });
    }
}
