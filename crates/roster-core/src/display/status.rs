//! Short confirmation messages for operations without a resource to show.

use std::fmt;

use crate::{error::BookingError, models::AvailabilitySlot};

/// A one-line success or failure notice.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    /// Create a new success status.
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
        }
    }

    /// Create a new failure status.
    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
        }
    }
}

impl OperationStatus {
    /// Summarises a day toggle by how many slots it opened and closed.
    pub fn toggled(slots: &[AvailabilitySlot]) -> Self {
        let opened = slots.iter().filter(|s| s.active).count();
        let closed = slots.len() - opened;
        let message = match (opened, closed) {
            (n, 0) => format!("Opened {n} slot(s)"),
            (0, n) => format!("Closed {n} slot(s)"),
            (o, c) => format!("Opened {o} and closed {c} slot(s)"),
        };
        Self::success(message)
    }
}

impl From<&BookingError> for OperationStatus {
    fn from(error: &BookingError) -> Self {
        Self::failure(format!("[{}] {error}", error.code()))
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            if self.success { "Success:" } else { "Error:" },
            self.message
        )
    }
}
