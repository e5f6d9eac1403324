//! Validated request types passed from the facade to the store.
//!
//! Each type is produced by the `validate()` method of the matching
//! [`crate::params`] struct, so the store only ever sees parsed days, times
//! and statuses.

use jiff::civil::{Date, DateTime, Time};

use super::{AppointmentStatus, DayOfWeek, GeoPoint};

/// A slot to add to a provider's weekly catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSlot {
    pub provider_id: u64,
    pub day_of_week: DayOfWeek,
    pub start_time: Time,
    pub end_time: Time,
}

/// Partial update of an existing slot. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSlotRequest {
    pub day_of_week: Option<DayOfWeek>,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub active: Option<bool>,
}

impl UpdateSlotRequest {
    /// True when the request would not change anything.
    pub fn is_empty(&self) -> bool {
        self.day_of_week.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.active.is_none()
    }
}

/// A booking request with every field present and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub customer_id: u64,
    pub provider_id: u64,
    pub service_id: u64,
    pub date: Date,
    pub time: Time,
    pub description: Option<String>,
    /// Skip the provider's review and start as `accepted`
    pub auto_accept: bool,
}

impl NewAppointment {
    /// Local date and time the visit starts.
    pub fn scheduled_date(&self) -> DateTime {
        self.date.to_datetime(self.time)
    }

    /// Status the appointment is created in.
    pub fn initial_status(&self) -> AppointmentStatus {
        if self.auto_accept {
            AppointmentStatus::Accepted
        } else {
            AppointmentStatus::Pending
        }
    }
}

/// A requested lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub appointment_id: u64,
    pub actor_id: u64,
    pub target: AppointmentStatus,
    /// Required when `target` is `finished`
    pub final_price: Option<f64>,
}

/// Profile fields to insert or replace.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub id: u64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<GeoPoint>,
}
