//! Recurring availability slots.

use jiff::{civil::Time, Timestamp};
use serde::{Deserialize, Serialize};

use super::{DayOfWeek, SlotState};

/// A provider's weekly-recurring availability interval.
///
/// A slot is a commitment for every occurrence of its weekday, never for a
/// single date. Whether it is free on a given date is derived per request,
/// see [`crate::availability`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilitySlot {
    /// Unique identifier for the slot
    pub id: u64,

    /// Provider owning the slot
    pub provider_id: u64,

    /// Weekday the slot repeats on
    pub day_of_week: DayOfWeek,

    /// Start of the interval (inclusive)
    pub start_time: Time,

    /// End of the interval
    pub end_time: Time,

    /// Inactive slots are kept but never offered
    pub active: bool,

    /// Timestamp when the slot was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the slot was last updated (UTC)
    pub updated_at: Timestamp,
}

impl AvailabilitySlot {
    /// True when the two ranges intersect or share a boundary.
    ///
    /// Touching ranges count: 09:00-10:00 and 10:00-11:00 overlap.
    pub fn touches(&self, start: Time, end: Time) -> bool {
        start <= self.end_time && self.start_time <= end
    }
}

/// A slot paired with its state on one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotAvailability {
    pub slot: AvailabilitySlot,
    pub status: SlotState,
}
