//! Per-date availability lookups.

use jiff::civil::Date;
use rusqlite::{params, Connection};

use crate::{
    availability::BookingWindow,
    error::{DatabaseResultExt, Result},
    models::{DayOfWeek, SlotAvailability},
};

/// Statuses that hold a slot for their date. Mirrors
/// `AppointmentStatus::is_active` and the partial unique index.
pub(super) const ACTIVE_STATUSES_SQL: &str =
    "('scheduled', 'pending', 'accepted', 'approved', 'confirmed', 'on_the_way', 'in_progress')";

fn slot_booked_sql() -> String {
    format!(
        "SELECT EXISTS(SELECT 1 FROM appointments WHERE availability_slot_id = ?1 AND scheduled_date >= ?2 AND scheduled_date < ?3 AND status IN {ACTIVE_STATUSES_SQL})"
    )
}

impl super::Database {
    /// True if an active appointment holds `slot_id` anywhere within `date`.
    ///
    /// Only appointments in `[date, date + 1)` are considered, so other
    /// weeks of the same slot never affect the answer.
    pub(super) fn is_slot_booked(conn: &Connection, slot_id: u64, date: Date) -> Result<bool> {
        let day_start = date.to_datetime(jiff::civil::Time::midnight());
        let next_day = date
            .tomorrow()
            .map(|d| d.to_datetime(jiff::civil::Time::midnight()).to_string())
            .unwrap_or_else(|_| "9999-12-31T23:59:59.999999999".to_string());

        conn.query_row(
            &slot_booked_sql(),
            params![slot_id as i64, day_start.to_string(), next_day],
            |row| row.get(0),
        )
        .db_context("Failed to check slot bookings")
    }

    /// Resolves every active slot of a provider on `date`, earliest first.
    pub fn resolve_availability(
        &self,
        provider_id: u64,
        date: Date,
        window: &BookingWindow,
    ) -> Result<Vec<SlotAvailability>> {
        let slots = Self::query_active_slots(&self.connection, provider_id, DayOfWeek::of(date))?;
        window.resolve(date, slots, |slot| {
            Self::is_slot_booked(&self.connection, slot.id, date)
        })
    }
}
