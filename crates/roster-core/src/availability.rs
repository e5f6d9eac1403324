//! Per-date slot resolution.
//!
//! A slot never stores whether it is booked. Its state on a date is derived
//! from the appointments pinned to that date alone, so booking one Monday
//! leaves every other Monday untouched.

use jiff::civil::{Date, DateTime};

use crate::{
    error::Result,
    models::{AvailabilitySlot, SlotAvailability, SlotState},
};

/// The instant availability is judged at, plus the same-day cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    /// Local wall-clock now
    pub now: DateTime,
    /// Local hour from which same-day bookings close
    pub cutoff_hour: u8,
}

impl BookingWindow {
    pub fn new(now: DateTime, cutoff_hour: u8) -> Self {
        Self { now, cutoff_hour }
    }

    /// State forced on every slot of `date`, if any.
    ///
    /// Dates before today are `Past`; today at or after the cutoff hour is
    /// `ClosedForToday`. Neither depends on individual slots.
    pub fn day_gate(&self, date: Date) -> Option<SlotState> {
        let today = self.now.date();
        if date < today {
            Some(SlotState::Past)
        } else if date == today && i16::from(self.now.hour()) >= i16::from(self.cutoff_hour) {
            Some(SlotState::ClosedForToday)
        } else {
            None
        }
    }

    /// Pairs each slot with its state on `date`.
    ///
    /// `is_booked` is only consulted when no day gate applies. Slot order is
    /// preserved.
    pub fn resolve<F>(
        &self,
        date: Date,
        slots: Vec<AvailabilitySlot>,
        mut is_booked: F,
    ) -> Result<Vec<SlotAvailability>>
    where
        F: FnMut(&AvailabilitySlot) -> Result<bool>,
    {
        let gate = self.day_gate(date);
        slots
            .into_iter()
            .map(|slot| {
                let status = match gate {
                    Some(state) => state,
                    None if is_booked(&slot)? => SlotState::Booked,
                    None => SlotState::Available,
                };
                Ok(SlotAvailability { slot, status })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use jiff::{
        civil::{date, time},
        Timestamp,
    };

    use super::*;
    use crate::models::DayOfWeek;

    fn slot(id: u64, hour: i8) -> AvailabilitySlot {
        AvailabilitySlot {
            id,
            provider_id: 1,
            day_of_week: DayOfWeek::Monday,
            start_time: time(hour, 0, 0, 0),
            end_time: time(hour + 1, 0, 0, 0),
            active: true,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn gates_follow_date_and_cutoff() {
        let morning = BookingWindow::new(date(2025, 1, 6).at(10, 0, 0, 0), 15);
        assert_eq!(morning.day_gate(date(2025, 1, 5)), Some(SlotState::Past));
        assert_eq!(morning.day_gate(date(2025, 1, 6)), None);
        assert_eq!(morning.day_gate(date(2025, 1, 13)), None);

        let at_cutoff = BookingWindow::new(date(2025, 1, 6).at(15, 0, 0, 0), 15);
        assert_eq!(
            at_cutoff.day_gate(date(2025, 1, 6)),
            Some(SlotState::ClosedForToday)
        );

        let just_before = BookingWindow::new(date(2025, 1, 6).at(14, 59, 59, 0), 15);
        assert_eq!(just_before.day_gate(date(2025, 1, 6)), None);
    }

    #[test]
    fn booked_lookup_marks_individual_slots() {
        let window = BookingWindow::new(date(2025, 1, 1).at(8, 0, 0, 0), 15);
        let resolved = window
            .resolve(date(2025, 1, 6), vec![slot(1, 9), slot(2, 11)], |s| Ok(s.id == 2))
            .unwrap();

        let states: Vec<_> = resolved.iter().map(|r| (r.slot.id, r.status)).collect();
        assert_eq!(
            states,
            vec![(1, SlotState::Available), (2, SlotState::Booked)]
        );
    }

    #[test]
    fn gate_overrides_slot_state_without_lookups() {
        let window = BookingWindow::new(date(2025, 1, 6).at(16, 0, 0, 0), 15);
        let mut lookups = 0;
        let resolved = window
            .resolve(date(2025, 1, 6), vec![slot(1, 9), slot(2, 17)], |_| {
                lookups += 1;
                Ok(true)
            })
            .unwrap();

        assert_eq!(lookups, 0);
        assert!(resolved
            .iter()
            .all(|r| r.status == SlotState::ClosedForToday));
    }
}
