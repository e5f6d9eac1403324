//! Status enumerations for appointments, backjobs and resolved slots.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical appointment status.
///
/// Status literals arrive in many spellings (`"Pending"`, `"on-the-way"`,
/// `"InProgress"`, `"canceled"`). [`FromStr`] folds them all into one variant;
/// the store and the wire only ever carry [`AppointmentStatus::as_str`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Awaiting the provider's decision
    Pending,
    /// Confirmed for a fixed date; counts toward the customer's booking cap
    Scheduled,
    /// Accepted by the provider (or auto-accepted at booking time)
    Accepted,
    /// Approved by the provider
    Approved,
    /// Confirmed by the provider
    Confirmed,
    /// Provider is travelling to the customer
    OnTheWay,
    /// Work has started
    InProgress,
    /// Provider reports the work done and the final price
    Finished,
    /// Customer has acknowledged the finished work
    Completed,
    /// Cancelled by the customer
    Cancelled,
    /// Declined by the provider
    Rejected,
    /// Customer was absent
    NoShow,
    /// Provider never arrived
    ProviderNoShow,
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "scheduled" => Ok(Self::Scheduled),
            "accepted" => Ok(Self::Accepted),
            "approved" => Ok(Self::Approved),
            "confirmed" => Ok(Self::Confirmed),
            "ontheway" => Ok(Self::OnTheWay),
            "inprogress" => Ok(Self::InProgress),
            "finished" => Ok(Self::Finished),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "rejected" => Ok(Self::Rejected),
            "noshow" => Ok(Self::NoShow),
            "providernoshow" => Ok(Self::ProviderNoShow),
            _ => Err(format!("Invalid appointment status: {s}")),
        }
    }
}

impl AppointmentStatus {
    /// Every status that may be persisted.
    pub const ALL: [AppointmentStatus; 13] = [
        Self::Pending,
        Self::Scheduled,
        Self::Accepted,
        Self::Approved,
        Self::Confirmed,
        Self::OnTheWay,
        Self::InProgress,
        Self::Finished,
        Self::Completed,
        Self::Cancelled,
        Self::Rejected,
        Self::NoShow,
        Self::ProviderNoShow,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Accepted => "accepted",
            Self::Approved => "approved",
            Self::Confirmed => "confirmed",
            Self::OnTheWay => "on_the_way",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
            Self::NoShow => "no_show",
            Self::ProviderNoShow => "provider_no_show",
        }
    }

    /// Occupies its slot for the scheduled date.
    ///
    /// Must stay in sync with the partial unique index in `schema.sql`.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Scheduled
                | Self::Pending
                | Self::Accepted
                | Self::Approved
                | Self::Confirmed
                | Self::OnTheWay
                | Self::InProgress
        )
    }

    /// No further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Rejected | Self::NoShow | Self::ProviderNoShow
        )
    }

    /// The customer may still cancel.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Approved | Self::Accepted | Self::Confirmed | Self::Scheduled
        )
    }

    /// The provider has committed to the booking but has not set out yet.
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            Self::Accepted | Self::Approved | Self::Confirmed | Self::Scheduled
        )
    }

    /// Get status with an icon for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            Self::Pending => "○ Pending",
            Self::Scheduled => "◷ Scheduled",
            Self::Accepted => "✓ Accepted",
            Self::Approved => "✓ Approved",
            Self::Confirmed => "✓ Confirmed",
            Self::OnTheWay => "➤ On the way",
            Self::InProgress => "➤ In progress",
            Self::Finished => "■ Finished",
            Self::Completed => "★ Completed",
            Self::Cancelled => "✗ Cancelled",
            Self::Rejected => "✗ Rejected",
            Self::NoShow => "✗ No show",
            Self::ProviderNoShow => "✗ Provider no show",
        }
    }
}

/// Status of a warranty redo request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackjobStatus {
    /// Filed by the customer, awaiting review
    Pending,
    /// Accepted; the appointment has been re-opened
    Approved,
    /// Declined by the provider
    Rejected,
    /// Redo finished
    Completed,
}

impl FromStr for BackjobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid backjob status: {s}")),
        }
    }
}

impl BackjobStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// Still awaiting review or redo.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

/// Availability of one slot on one calendar date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Free to book
    Available,
    /// An active appointment holds the slot for this date
    Booked,
    /// The date is before today
    Past,
    /// Same-day bookings have closed
    ClosedForToday,
}

impl SlotState {
    /// Convert to wire string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Past => "past",
            Self::ClosedForToday => "closed_for_today",
        }
    }
}
