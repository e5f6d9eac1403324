//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper is a newtype over a `Vec` that prints one markdown line per
//! item, or a short notice when the collection is empty.

use std::{fmt, ops::Index};

use jiff::civil::Date;

use crate::{
    geo::Ranked,
    models::{Appointment, AvailabilitySlot, Backjob, Penalty, Profile, SlotAvailability},
};

macro_rules! collection {
    ($(#[$meta:meta])* $name:ident, $item:ty, $empty:literal) => {
        $(#[$meta])*
        pub struct $name(pub Vec<$item>);

        impl $name {
            /// Check if the collection is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Number of items in the collection.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Get an iterator over the items.
            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<Self::Item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl $name {
            fn fmt_empty(&self, f: &mut fmt::Formatter<'_>) -> Option<fmt::Result> {
                self.0.is_empty().then(|| writeln!(f, $empty))
            }
        }
    };
}

collection!(
    /// A provider's weekly slots.
    Slots,
    AvailabilitySlot,
    "No slots found."
);
collection!(
    /// Appointments, one line each.
    Appointments,
    Appointment,
    "No appointments found."
);
collection!(
    /// Recorded penalties.
    Penalties,
    Penalty,
    "No penalties recorded."
);
collection!(
    /// Backjobs filed against an appointment.
    Backjobs,
    Backjob,
    "No backjobs filed."
);
collection!(
    /// Providers ranked nearest first.
    NearbyProfiles,
    Ranked<Profile>,
    "No providers nearby."
);

impl fmt::Display for Slots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = self.fmt_empty(f) {
            return result;
        }
        self.0.iter().try_for_each(|slot| write!(f, "{slot}"))
    }
}

impl fmt::Display for Appointments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = self.fmt_empty(f) {
            return result;
        }
        self.0.iter().try_for_each(|appt| appt.fmt_line(f))
    }
}

impl fmt::Display for Penalties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = self.fmt_empty(f) {
            return result;
        }
        self.0.iter().try_for_each(|p| write!(f, "{p}"))
    }
}

impl fmt::Display for Backjobs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = self.fmt_empty(f) {
            return result;
        }
        self.0.iter().try_for_each(|b| write!(f, "{b}"))
    }
}

impl fmt::Display for NearbyProfiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = self.fmt_empty(f) {
            return result;
        }
        self.0.iter().try_for_each(|p| write!(f, "{p}"))
    }
}

/// Resolved availability of a provider on one date.
///
/// # Examples
///
/// ```rust
/// use jiff::{civil::{date, time}, Timestamp};
/// use roster_core::{
///     display::DayAvailability,
///     models::{AvailabilitySlot, DayOfWeek, SlotAvailability, SlotState},
/// };
///
/// let slot = AvailabilitySlot {
///     id: 1,
///     provider_id: 7,
///     day_of_week: DayOfWeek::Monday,
///     start_time: time(9, 0, 0, 0),
///     end_time: time(10, 0, 0, 0),
///     active: true,
///     created_at: Timestamp::UNIX_EPOCH,
///     updated_at: Timestamp::UNIX_EPOCH,
/// };
/// let day = DayAvailability {
///     date: date(2025, 1, 6),
///     slots: vec![SlotAvailability { slot, status: SlotState::Booked }],
/// };
/// let output = day.to_string();
/// assert!(output.contains("2025-01-06 (monday)"));
/// assert!(output.contains("09:00-10:00 slot 1: booked"));
/// ```
pub struct DayAvailability {
    pub date: Date,
    pub slots: Vec<SlotAvailability>,
}

impl fmt::Display for DayAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} ({})",
            self.date,
            crate::models::DayOfWeek::of(self.date)
        )?;
        writeln!(f)?;
        if self.slots.is_empty() {
            return writeln!(f, "No active slots on this day.");
        }
        self.slots.iter().try_for_each(|s| write!(f, "{s}"))
    }
}
