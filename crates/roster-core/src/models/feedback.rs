//! Ratings and warranty redo requests attached to appointments.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::BackjobStatus;

/// A customer's rating of a completed appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub id: u64,

    /// Rated appointment; at most one rating each
    pub appointment_id: u64,

    /// Customer who rated
    pub user_id: u64,

    /// Provider being rated
    pub provider_id: u64,

    /// Score from 1 to 5
    pub value: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    pub created_at: Timestamp,
}

/// A warranty request to redo a finished appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Backjob {
    pub id: u64,

    /// Appointment to redo
    pub appointment_id: u64,

    /// Customer who filed the request
    pub customer_id: u64,

    /// What went wrong
    pub reason: String,

    pub status: BackjobStatus,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
