//! Appointment model definition.

use jiff::{
    civil::{Date, DateTime},
    Timestamp,
};
use serde::{Deserialize, Serialize};

use super::AppointmentStatus;

/// A customer's booking of one provider slot on one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Unique identifier for the appointment
    pub id: u64,

    /// Customer who booked
    pub customer_id: u64,

    /// Provider who serves the booking
    pub provider_id: u64,

    /// Slot the booking was made against. May refer to a slot that has since
    /// been deleted.
    pub availability_slot_id: Option<u64>,

    /// Service requested
    pub service_id: u64,

    /// Local date and start time of the visit
    pub scheduled_date: DateTime,

    /// Current lifecycle status
    pub status: AppointmentStatus,

    /// Free-text problem description from the customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Price set by the provider when finishing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,

    /// Reason supplied with a cancellation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,

    /// When the appointment was cancelled (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<Timestamp>,

    /// Stored evidence for a provider no-show report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_show_evidence_url: Option<String>,

    /// Customer's account of a provider no-show
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_show_description: Option<String>,

    /// Timestamp when the appointment was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the appointment was last updated (UTC)
    pub updated_at: Timestamp,
}

impl Appointment {
    /// Calendar date the appointment occupies.
    pub fn scheduled_day(&self) -> Date {
        self.scheduled_date.date()
    }
}
