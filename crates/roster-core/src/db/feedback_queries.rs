//! Ratings and backjobs.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::utils::{id_column, parsed_column};
use crate::{
    error::{is_constraint_violation, BookingError, DatabaseResultExt, Result},
    models::{AppointmentStatus, Backjob, BackjobStatus, Rating},
};

const INSERT_RATING_SQL: &str = "INSERT INTO ratings (appointment_id, user_id, provider_id, value, comment, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const RATING_COLUMNS: &str = "id, appointment_id, user_id, provider_id, value, comment, created_at";
const BACKJOB_COLUMNS: &str = "id, appointment_id, customer_id, reason, status, created_at, updated_at";
const INSERT_BACKJOB_SQL: &str = "INSERT INTO backjobs (appointment_id, customer_id, reason, status, created_at, updated_at) VALUES (?1, ?2, ?3, 'pending', ?4, ?4)";
const OPEN_BACKJOB_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM backjobs WHERE appointment_id = ?1 AND status IN ('pending', 'approved'))";
const REVIEW_BACKJOB_SQL: &str =
    "UPDATE backjobs SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'pending'";

impl super::Database {
    /// Helper function to construct a Rating from a database row
    fn build_rating_from_row(row: &rusqlite::Row) -> rusqlite::Result<Rating> {
        Ok(Rating {
            id: id_column(row, 0)?,
            appointment_id: id_column(row, 1)?,
            user_id: id_column(row, 2)?,
            provider_id: id_column(row, 3)?,
            value: row.get(4)?,
            comment: row.get(5)?,
            created_at: parsed_column::<Timestamp>(row, 6)?,
        })
    }

    /// Helper function to construct a Backjob from a database row
    fn build_backjob_from_row(row: &rusqlite::Row) -> rusqlite::Result<Backjob> {
        Ok(Backjob {
            id: id_column(row, 0)?,
            appointment_id: id_column(row, 1)?,
            customer_id: id_column(row, 2)?,
            reason: row.get(3)?,
            status: parsed_column::<BackjobStatus>(row, 4)?,
            created_at: parsed_column::<Timestamp>(row, 5)?,
            updated_at: parsed_column::<Timestamp>(row, 6)?,
        })
    }

    fn find_rating(conn: &Connection, appointment_id: u64) -> Result<Option<Rating>> {
        conn.query_row(
            &format!("SELECT {RATING_COLUMNS} FROM ratings WHERE appointment_id = ?1"),
            params![appointment_id as i64],
            Self::build_rating_from_row,
        )
        .optional()
        .db_context("Failed to fetch rating")
    }

    fn find_backjob(conn: &Connection, backjob_id: u64) -> Result<Backjob> {
        conn.query_row(
            &format!("SELECT {BACKJOB_COLUMNS} FROM backjobs WHERE id = ?1"),
            params![backjob_id as i64],
            Self::build_backjob_from_row,
        )
        .optional()
        .db_context("Failed to fetch backjob")?
        .ok_or(BookingError::NotFound {
            entity: "Backjob",
            id: backjob_id,
        })
    }

    /// Rates a completed appointment on behalf of its customer.
    ///
    /// The unique index on `ratings.appointment_id` settles two concurrent
    /// ratings of the same appointment.
    pub fn create_rating(
        &mut self,
        appointment_id: u64,
        user_id: u64,
        value: u8,
        comment: Option<&str>,
        now: Timestamp,
    ) -> Result<Rating> {
        let tx = self.immediate()?;

        let appointment = Self::find_appointment(&tx, appointment_id)?;
        if appointment.customer_id != user_id {
            return Err(BookingError::Forbidden {
                actor_id: user_id,
                action: format!("rate appointment {appointment_id}"),
            });
        }
        if Self::find_rating(&tx, appointment_id)?.is_some() {
            return Err(BookingError::AlreadyRated { id: appointment_id });
        }
        if appointment.status != AppointmentStatus::Completed {
            return Err(BookingError::NotRatable {
                id: appointment_id,
                status: appointment.status.as_str().to_string(),
            });
        }

        tx.execute(
            INSERT_RATING_SQL,
            params![
                appointment_id as i64,
                user_id as i64,
                appointment.provider_id as i64,
                value,
                comment,
                now.to_string()
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                BookingError::AlreadyRated { id: appointment_id }
            } else {
                BookingError::database_error("Failed to insert rating", e)
            }
        })?;
        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Rating {
            id,
            appointment_id,
            user_id,
            provider_id: appointment.provider_id,
            value,
            comment: comment.map(str::to_string),
            created_at: now,
        })
    }

    /// Rating left on an appointment, if any.
    pub fn get_rating(&self, appointment_id: u64) -> Result<Option<Rating>> {
        Self::find_rating(&self.connection, appointment_id)
    }

    /// Files a warranty redo request against a finished appointment.
    pub fn file_backjob(
        &mut self,
        appointment_id: u64,
        customer_id: u64,
        reason: &str,
        now: Timestamp,
    ) -> Result<Backjob> {
        let tx = self.immediate()?;

        let appointment = Self::find_appointment(&tx, appointment_id)?;
        if appointment.customer_id != customer_id {
            return Err(BookingError::Forbidden {
                actor_id: customer_id,
                action: format!("file a backjob for appointment {appointment_id}"),
            });
        }
        if appointment.status != AppointmentStatus::Finished {
            return Err(BookingError::InvalidTransition {
                from: appointment.status.as_str().to_string(),
                to: "backjob".to_string(),
            });
        }

        let open: bool = tx
            .query_row(
                OPEN_BACKJOB_EXISTS_SQL,
                params![appointment_id as i64],
                |row| row.get(0),
            )
            .db_context("Failed to check open backjobs")?;
        if open {
            return Err(BookingError::Conflict {
                message: format!("appointment {appointment_id} already has an open backjob"),
            });
        }

        tx.execute(
            INSERT_BACKJOB_SQL,
            params![
                appointment_id as i64,
                customer_id as i64,
                reason,
                now.to_string()
            ],
        )
        .db_context("Failed to insert backjob")?;
        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Backjob {
            id,
            appointment_id,
            customer_id,
            reason: reason.to_string(),
            status: BackjobStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Approves or rejects a pending backjob on behalf of the provider.
    ///
    /// Approval reopens the appointment as `accepted` so the provider can
    /// work it again. If another booking has taken the slot for that date in
    /// the meantime the approval fails and nothing changes.
    pub fn review_backjob(
        &mut self,
        backjob_id: u64,
        provider_id: u64,
        approve: bool,
        now: Timestamp,
    ) -> Result<Backjob> {
        let tx = self.immediate()?;

        let backjob = Self::find_backjob(&tx, backjob_id)?;
        let appointment = Self::find_appointment(&tx, backjob.appointment_id)?;
        if appointment.provider_id != provider_id {
            return Err(BookingError::Forbidden {
                actor_id: provider_id,
                action: format!("review backjob {backjob_id}"),
            });
        }
        if backjob.status != BackjobStatus::Pending {
            return Err(BookingError::InvalidTransition {
                from: backjob.status.as_str().to_string(),
                to: if approve { "approved" } else { "rejected" }.to_string(),
            });
        }

        let status = if approve {
            BackjobStatus::Approved
        } else {
            BackjobStatus::Rejected
        };
        let changed = tx
            .execute(
                REVIEW_BACKJOB_SQL,
                params![status.as_str(), now.to_string(), backjob_id as i64],
            )
            .db_context("Failed to review backjob")?;
        if changed == 0 {
            return Err(BookingError::Conflict {
                message: format!("backjob {backjob_id} is no longer pending"),
            });
        }

        if approve {
            Self::swap_status(
                &tx,
                appointment.id,
                AppointmentStatus::Finished,
                AppointmentStatus::Accepted,
                now,
            )?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Backjob {
            status,
            updated_at: now,
            ..backjob
        })
    }

    /// Backjobs filed against an appointment, oldest first.
    pub fn list_backjobs(&self, appointment_id: u64) -> Result<Vec<Backjob>> {
        let mut stmt = self
            .connection
            .prepare(&format!(
                "SELECT {BACKJOB_COLUMNS} FROM backjobs WHERE appointment_id = ?1 ORDER BY id"
            ))
            .db_context("Failed to prepare backjob query")?;

        let backjobs = stmt
            .query_map(params![appointment_id as i64], Self::build_backjob_from_row)
            .db_context("Failed to query backjobs")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read backjobs")?;
        Ok(backjobs)
    }
}
