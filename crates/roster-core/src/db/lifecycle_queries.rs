//! Status transitions and provider no-show reports.

use jiff::{civil::DateTime, SignedDuration, Timestamp};
use rusqlite::params;

use crate::{
    error::{BookingError, DatabaseResultExt, Result},
    lifecycle,
    models::{Appointment, AppointmentStatus, PenaltyKind, StatusChange},
};

const FINISH_APPOINTMENT_SQL: &str = "UPDATE appointments SET status = 'finished', final_price = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'in_progress'";
const COMPLETE_BACKJOB_SQL: &str = "UPDATE backjobs SET status = 'completed', updated_at = ?1 WHERE appointment_id = ?2 AND status = 'approved'";
const REPORT_NO_SHOW_SQL: &str = "UPDATE appointments SET status = 'provider_no_show', no_show_evidence_url = ?1, no_show_description = ?2, updated_at = ?3 WHERE id = ?4 AND status = 'scheduled'";

/// Fallback visit length when the booked slot no longer exists.
const DEFAULT_VISIT: SignedDuration = SignedDuration::from_hours(1);

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transitioned {
    pub appointment: Appointment,
    /// Status before the change
    pub previous: AppointmentStatus,
    /// Backjobs closed by finishing the appointment
    pub completed_backjobs: usize,
}

impl super::Database {
    /// Applies a provider or customer status change.
    ///
    /// `now` is the local wall clock, used for the `no_show` start gate.
    /// Cancellation and provider no-show reports have their own entry
    /// points and are not handled here.
    pub fn transition(
        &mut self,
        change: &StatusChange,
        now: DateTime,
        ts: Timestamp,
    ) -> Result<Transitioned> {
        let tx = self.immediate()?;

        let appointment = Self::find_appointment(&tx, change.appointment_id)?;
        lifecycle::check_transition(&appointment, change.target, change.actor_id)?;
        let previous = appointment.status;

        if change.target == AppointmentStatus::NoShow && now < appointment.scheduled_date {
            return Err(BookingError::TooEarly {
                action: "record a no-show".to_string(),
                remaining_minutes: remaining_minutes(now, appointment.scheduled_date),
            });
        }

        let mut completed_backjobs = 0;
        let mut final_price = appointment.final_price;
        if change.target == AppointmentStatus::Finished {
            let price = change
                .final_price
                .filter(|p| p.is_finite() && *p > 0.0)
                .ok_or_else(|| {
                    BookingError::invalid_input("final_price")
                        .with_reason("a positive final price is required to finish")
                })?;

            let changed = tx
                .execute(
                    FINISH_APPOINTMENT_SQL,
                    params![price, ts.to_string(), change.appointment_id as i64],
                )
                .db_context("Failed to finish appointment")?;
            Self::expect_swapped(changed, change.appointment_id, previous)?;

            completed_backjobs = tx
                .execute(
                    COMPLETE_BACKJOB_SQL,
                    params![ts.to_string(), change.appointment_id as i64],
                )
                .db_context("Failed to complete backjob")?;
            final_price = Some(price);
        } else {
            Self::swap_status(&tx, change.appointment_id, previous, change.target, ts)?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Transitioned {
            appointment: Appointment {
                status: change.target,
                final_price,
                updated_at: ts,
                ..appointment
            },
            previous,
            completed_backjobs,
        })
    }

    /// Records that the provider never arrived.
    ///
    /// Allowed only for the owning customer, on a `scheduled` appointment,
    /// once the booked slot has ended. The provider penalty is written in
    /// the same transaction as the status change.
    pub fn report_provider_no_show(
        &mut self,
        appointment_id: u64,
        customer_id: u64,
        evidence_url: &str,
        description: &str,
        now: DateTime,
        ts: Timestamp,
    ) -> Result<Appointment> {
        let tx = self.immediate()?;

        let appointment = Self::find_appointment(&tx, appointment_id)?;
        Self::check_no_show(&tx, &appointment, customer_id, now)?;

        let changed = tx
            .execute(
                REPORT_NO_SHOW_SQL,
                params![
                    evidence_url,
                    description,
                    ts.to_string(),
                    appointment_id as i64
                ],
            )
            .db_context("Failed to record no-show")?;
        Self::expect_swapped(changed, appointment_id, appointment.status)?;

        Self::insert_penalty(
            &tx,
            appointment.provider_id,
            appointment_id,
            PenaltyKind::ProviderNoShow,
            &format!("Did not arrive for the {} appointment", appointment.scheduled_date),
            ts,
        )?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Appointment {
            status: AppointmentStatus::ProviderNoShow,
            no_show_evidence_url: Some(evidence_url.to_string()),
            no_show_description: Some(description.to_string()),
            updated_at: ts,
            ..appointment
        })
    }

    /// Checks a no-show report without writing anything, so evidence is only
    /// uploaded for reports that can succeed.
    pub fn precheck_provider_no_show(
        &self,
        appointment_id: u64,
        customer_id: u64,
        now: DateTime,
    ) -> Result<Appointment> {
        let appointment = Self::find_appointment(&self.connection, appointment_id)?;
        Self::check_no_show(&self.connection, &appointment, customer_id, now)?;
        Ok(appointment)
    }

    fn check_no_show(
        conn: &rusqlite::Connection,
        appointment: &Appointment,
        customer_id: u64,
        now: DateTime,
    ) -> Result<()> {
        lifecycle::check_transition(appointment, AppointmentStatus::ProviderNoShow, customer_id)?;

        let deadline = Self::visit_end(conn, appointment)?;
        if now <= deadline {
            return Err(BookingError::TooEarly {
                action: "report a provider no-show".to_string(),
                remaining_minutes: remaining_minutes(now, deadline),
            });
        }
        Ok(())
    }

    /// Local time the booked slot ends on the appointment's date.
    fn visit_end(conn: &rusqlite::Connection, appointment: &Appointment) -> Result<DateTime> {
        let slot = match appointment.availability_slot_id {
            Some(id) => Self::find_slot(conn, id)?,
            None => None,
        };
        match slot {
            Some(slot) => Ok(appointment.scheduled_day().to_datetime(slot.end_time)),
            None => appointment
                .scheduled_date
                .checked_add(DEFAULT_VISIT)
                .map_err(|e| BookingError::Configuration {
                    message: format!("Scheduled date out of range: {e}"),
                }),
        }
    }
}

/// Whole minutes from `now` until `until`, rounded up.
fn remaining_minutes(now: DateTime, until: DateTime) -> i64 {
    let secs = now.duration_until(until).as_secs();
    (secs + 59).div_euclid(60).max(1)
}
