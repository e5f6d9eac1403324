//! Booking and cancellation.

use jiff::{civil::DateTime, Timestamp};
use rusqlite::{params, Connection, OptionalExtension};

use super::utils::{id_column, optional_id_column, optional_parsed_column, parsed_column};
use crate::{
    availability::BookingWindow,
    error::{is_constraint_violation, BookingError, DatabaseResultExt, Result},
    lifecycle,
    models::{
        format_time, Appointment, AppointmentFilter, AppointmentStatus, DayOfWeek,
        NewAppointment, SlotState,
    },
};

const APPOINTMENT_COLUMNS: &str = "id, customer_id, provider_id, availability_slot_id, service_id, scheduled_date, status, description, final_price, cancellation_reason, cancelled_at, no_show_evidence_url, no_show_description, created_at, updated_at";
const INSERT_APPOINTMENT_SQL: &str = "INSERT INTO appointments (customer_id, provider_id, availability_slot_id, service_id, scheduled_date, scheduled_day, status, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)";
const COUNT_WITH_STATUS_SQL: &str =
    "SELECT COUNT(*) FROM appointments WHERE customer_id = ?1 AND status = ?2";
const CANCEL_APPOINTMENT_SQL: &str = "UPDATE appointments SET status = 'cancelled', cancellation_reason = ?1, cancelled_at = ?2, updated_at = ?2 WHERE id = ?3 AND status = ?4";
const SWAP_STATUS_SQL: &str =
    "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4";

fn select_appointments(filter: &str) -> String {
    format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE {filter}")
}

/// Limits applied when a booking is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRules {
    /// Local now and the same-day cutoff
    pub window: BookingWindow,
    /// Most `scheduled` appointments a customer may hold at once
    pub max_scheduled: u32,
}

impl super::Database {
    /// Helper function to construct an Appointment from a database row
    pub(super) fn build_appointment_from_row(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
        Ok(Appointment {
            id: id_column(row, 0)?,
            customer_id: id_column(row, 1)?,
            provider_id: id_column(row, 2)?,
            availability_slot_id: optional_id_column(row, 3)?,
            service_id: id_column(row, 4)?,
            scheduled_date: parsed_column::<DateTime>(row, 5)?,
            status: parsed_column::<AppointmentStatus>(row, 6)?,
            description: row.get(7)?,
            final_price: row.get(8)?,
            cancellation_reason: row.get(9)?,
            cancelled_at: optional_parsed_column::<Timestamp>(row, 10)?,
            no_show_evidence_url: row.get(11)?,
            no_show_description: row.get(12)?,
            created_at: parsed_column::<Timestamp>(row, 13)?,
            updated_at: parsed_column::<Timestamp>(row, 14)?,
        })
    }

    pub(super) fn find_appointment(conn: &Connection, id: u64) -> Result<Appointment> {
        conn.query_row(
            &select_appointments("id = ?1"),
            params![id as i64],
            Self::build_appointment_from_row,
        )
        .optional()
        .db_context("Failed to fetch appointment")?
        .ok_or(BookingError::NotFound {
            entity: "Appointment",
            id,
        })
    }

    /// Moves an appointment from `expected` to `target`, failing with
    /// [`BookingError::Conflict`] if someone else changed it first.
    pub(super) fn swap_status(
        conn: &Connection,
        id: u64,
        expected: AppointmentStatus,
        target: AppointmentStatus,
        now: Timestamp,
    ) -> Result<()> {
        let changed = conn
            .execute(
                SWAP_STATUS_SQL,
                params![target.as_str(), now.to_string(), id as i64, expected.as_str()],
            )
            .map_err(|e| Self::booked_or_db(e, "Failed to update appointment status"))?;
        Self::expect_swapped(changed, id, expected)
    }

    pub(super) fn expect_swapped(changed: usize, id: u64, expected: AppointmentStatus) -> Result<()> {
        if changed == 0 {
            return Err(BookingError::Conflict {
                message: format!(
                    "appointment {id} is no longer {}, re-fetch and retry",
                    expected.as_str()
                ),
            });
        }
        Ok(())
    }

    fn booked_or_db(error: rusqlite::Error, message: &str) -> BookingError {
        if is_constraint_violation(&error) {
            BookingError::Conflict {
                message: "the slot has been booked by another appointment".to_string(),
            }
        } else {
            BookingError::database_error(message, error)
        }
    }

    fn count_with_status(
        conn: &Connection,
        customer_id: u64,
        status: AppointmentStatus,
    ) -> Result<u32> {
        conn.query_row(
            COUNT_WITH_STATUS_SQL,
            params![customer_id as i64, status.as_str()],
            |row| row.get(0),
        )
        .db_context("Failed to count appointments")
    }

    /// Number of appointments the customer holds in exactly `scheduled`.
    pub fn count_scheduled(&self, customer_id: u64) -> Result<u32> {
        Self::count_with_status(&self.connection, customer_id, AppointmentStatus::Scheduled)
    }

    /// Creates an appointment against the provider slot starting at the
    /// requested time.
    ///
    /// Every check and the insert run inside one `BEGIN IMMEDIATE`
    /// transaction, so two requests for the same slot and date cannot both
    /// pass the booked check. The partial unique index on
    /// `(availability_slot_id, scheduled_day)` rejects whatever slips past.
    pub fn create_appointment(
        &mut self,
        request: &NewAppointment,
        rules: &BookingRules,
        now: Timestamp,
    ) -> Result<Appointment> {
        let tx = self.immediate()?;

        if request.customer_id == request.provider_id {
            return Err(BookingError::SelfBookingNotAllowed);
        }
        let customer = Self::require_profile(&tx, request.customer_id, "Customer")?;
        let provider = Self::require_profile(&tx, request.provider_id, "Provider")?;
        if customer.same_person_as(&provider) {
            return Err(BookingError::SelfBookingNotAllowed);
        }

        let scheduled =
            Self::count_with_status(&tx, request.customer_id, AppointmentStatus::Scheduled)?;
        if scheduled >= rules.max_scheduled {
            return Err(BookingError::BookingLimitReached {
                limit: rules.max_scheduled,
            });
        }

        let day = DayOfWeek::of(request.date);
        let slot = Self::query_active_slots(&tx, request.provider_id, day)?
            .into_iter()
            .find(|s| s.start_time == request.time)
            .ok_or_else(|| BookingError::SlotNotFound {
                day: day.as_str().to_string(),
                time: Some(format_time(request.time)),
            })?;

        if Self::is_slot_booked(&tx, slot.id, request.date)? {
            return Err(BookingError::SlotAlreadyBooked {
                slot_id: slot.id,
                date: request.date.to_string(),
            });
        }

        if rules.window.day_gate(request.date) == Some(SlotState::ClosedForToday) {
            return Err(BookingError::ClosedForToday {
                date: request.date.to_string(),
                cutoff_hour: rules.window.cutoff_hour,
            });
        }
        let scheduled_date = request.scheduled_date();
        if scheduled_date <= rules.window.now {
            return Err(BookingError::PastDateTime {
                date: request.date.to_string(),
                time: format_time(request.time),
            });
        }

        let status = request.initial_status();
        tx.execute(
            INSERT_APPOINTMENT_SQL,
            params![
                request.customer_id as i64,
                request.provider_id as i64,
                slot.id as i64,
                request.service_id as i64,
                scheduled_date.to_string(),
                request.date.to_string(),
                status.as_str(),
                request.description,
                now.to_string(),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                BookingError::SlotAlreadyBooked {
                    slot_id: slot.id,
                    date: request.date.to_string(),
                }
            } else {
                BookingError::database_error("Failed to insert appointment", e)
            }
        })?;
        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Appointment {
            id,
            customer_id: request.customer_id,
            provider_id: request.provider_id,
            availability_slot_id: Some(slot.id),
            service_id: request.service_id,
            scheduled_date,
            status,
            description: request.description.clone(),
            final_price: None,
            cancellation_reason: None,
            cancelled_at: None,
            no_show_evidence_url: None,
            no_show_description: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Cancels an appointment on behalf of its customer.
    ///
    /// Returns the updated appointment. The slot is free again for that
    /// date as soon as this commits.
    pub fn cancel_appointment(
        &mut self,
        appointment_id: u64,
        actor_id: u64,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<Appointment> {
        let tx = self.immediate()?;

        let appointment = Self::find_appointment(&tx, appointment_id)?;
        lifecycle::check_transition(&appointment, AppointmentStatus::Cancelled, actor_id)?;

        let changed = tx
            .execute(
                CANCEL_APPOINTMENT_SQL,
                params![
                    reason,
                    now.to_string(),
                    appointment_id as i64,
                    appointment.status.as_str()
                ],
            )
            .db_context("Failed to cancel appointment")?;
        Self::expect_swapped(changed, appointment_id, appointment.status)?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Appointment {
            status: AppointmentStatus::Cancelled,
            cancellation_reason: reason.map(str::to_string),
            cancelled_at: Some(now),
            updated_at: now,
            ..appointment
        })
    }

    /// Retrieves a single appointment by its ID.
    pub fn get_appointment(&self, appointment_id: u64) -> Result<Appointment> {
        Self::find_appointment(&self.connection, appointment_id)
    }

    /// Lists appointments matching the filter, soonest first.
    pub fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let mut stmt = self
            .connection
            .prepare(&select_appointments(
                "(?1 IS NULL OR customer_id = ?1) AND (?2 IS NULL OR provider_id = ?2) AND (?3 IS NULL OR status = ?3) ORDER BY scheduled_date, id",
            ))
            .db_context("Failed to prepare appointment query")?;

        let appointments = stmt
            .query_map(
                params![
                    filter.customer_id.map(|id| id as i64),
                    filter.provider_id.map(|id| id as i64),
                    filter.status.map(|s| s.as_str()),
                ],
                Self::build_appointment_from_row,
            )
            .db_context("Failed to query appointments")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read appointments")?;
        Ok(appointments)
    }
}
