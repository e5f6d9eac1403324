//! Display formatting and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation outcomes get newtype wrappers so the same data
//! can read differently as a list, a confirmation or a detail view.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers        │    │   Markdown      │
//! │ (Slot, Appt...) │───▶│ (collections,   │───▶│ (terminal / MCP)│
//! │                 │    │  results)       │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: list wrappers ([`Slots`], [`Appointments`], ...)
//! - [`results`]: [`CreateResult`], [`UpdateResult`], [`DeleteResult`]
//! - [`status`]: one-line [`OperationStatus`] notices
//! - [`datetime`]: timestamp and visit time formatting
//! - [`models`]: Display implementations for domain models

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Appointments, Backjobs, DayAvailability, NearbyProfiles, Penalties, Slots};
pub use datetime::{LocalDateTime, VisitTime};
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::OperationStatus;
