//! Core library for the Roster provider booking engine.
//!
//! Providers publish weekly-recurring availability slots; customers book one
//! slot on one calendar date; the appointment then moves through a
//! role-gated lifecycle. This crate holds the data models, the SQLite store,
//! the business rules and an async facade, [`BookingEngine`], that the CLI
//! and the MCP server both sit on.
//!
//! # Module Map
//!
//! - [`models`]: slots, appointments, statuses and their satellites
//! - [`params`]: interface-agnostic operation parameters with `validate()`
//! - [`availability`]: per-date slot state, derived and never stored
//! - [`lifecycle`]: the appointment state machine
//! - [`cancellation`]: penalised cancellation patterns
//! - [`geo`]: haversine distance and nearest-first ranking
//! - [`db`]: transactional queries over SQLite
//! - [`engine`]: the async facade
//! - [`notify`], [`evidence`], [`clock`], [`config`]: collaborators and
//!   tunables
//! - [`display`]: markdown rendering of results
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use roster_core::{
//!     params::{AddSlot, CreateAppointment, UpsertProfile},
//!     BookingEngineBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = BookingEngineBuilder::new()
//!     .with_database_path(Some("roster.db"))
//!     .build()
//!     .await?;
//!
//! for (id, name) in [(1, "Alice Reyes"), (2, "Bob Cruz")] {
//!     engine
//!         .upsert_profile(&UpsertProfile {
//!             id,
//!             full_name: name.to_string(),
//!             ..Default::default()
//!         })
//!         .await?;
//! }
//!
//! engine
//!     .add_slot(&AddSlot {
//!         provider_id: 1,
//!         day_of_week: "monday".to_string(),
//!         start_time: "09:00".to_string(),
//!         end_time: "10:00".to_string(),
//!     })
//!     .await?;
//!
//! let appointment = engine
//!     .create_appointment(&CreateAppointment {
//!         customer_id: 2,
//!         provider_id: 1,
//!         service_id: 10,
//!         date: "2030-01-07".to_string(),
//!         time: "09:00".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{}", appointment);
//! # Ok(())
//! # }
//! ```

pub mod availability;
pub mod cancellation;
pub mod clock;
pub mod config;
pub mod db;
pub mod display;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod geo;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod params;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use db::Database;
pub use display::{CreateResult, DeleteResult, OperationStatus, UpdateResult};
pub use engine::{BookingEngine, BookingEngineBuilder};
pub use error::{BookingError, ErrorKind, Result};
pub use models::{
    Appointment, AppointmentStatus, AvailabilitySlot, DayOfWeek, SlotAvailability, SlotState,
};
pub use notify::{BookingEvent, BroadcastNotifier, Notifier};
