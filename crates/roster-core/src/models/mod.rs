//! Data models for slots, appointments and their satellites.
//!
//! Display implementations for these models live in
//! [`crate::display::models`]; this module only holds the data and the rules
//! that are intrinsic to a single value (status classes, overlap of two
//! ranges, identity matching).

pub mod appointment;
pub mod calendar;
pub mod feedback;
pub mod filters;
pub mod penalty;
pub mod profile;
pub mod requests;
pub mod slot;
pub mod status;

#[cfg(test)]
mod tests;

pub use appointment::Appointment;
pub use calendar::{format_time, parse_date, parse_time, DayOfWeek};
pub use feedback::{Backjob, Rating};
pub use filters::AppointmentFilter;
pub use penalty::{Penalty, PenaltyKind};
pub use profile::{GeoPoint, Profile};
pub use requests::{NewAppointment, NewSlot, ProfileUpdate, StatusChange, UpdateSlotRequest};
pub use slot::{AvailabilitySlot, SlotAvailability};
pub use status::{AppointmentStatus, BackjobStatus, SlotState};
