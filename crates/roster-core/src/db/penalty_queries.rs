//! Penalty records and the cancellation history they are derived from.

use jiff::Timestamp;
use rusqlite::{params, Connection};

use super::utils::{id_column, parsed_column};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{Penalty, PenaltyKind},
};

const INSERT_PENALTY_SQL: &str = "INSERT OR IGNORE INTO penalties (user_id, appointment_id, kind, detail, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const LIST_PENALTIES_SQL: &str = "SELECT id, user_id, appointment_id, kind, detail, created_at FROM penalties WHERE user_id = ?1 ORDER BY created_at, id";
const CANCELLATIONS_SQL: &str = "SELECT cancelled_at FROM appointments WHERE customer_id = ?1 AND status = 'cancelled' AND id != ?2 AND cancelled_at IS NOT NULL AND cancelled_at >= ?3 ORDER BY cancelled_at";

impl super::Database {
    /// Helper function to construct a Penalty from a database row
    fn build_penalty_from_row(row: &rusqlite::Row) -> rusqlite::Result<Penalty> {
        Ok(Penalty {
            id: id_column(row, 0)?,
            user_id: id_column(row, 1)?,
            appointment_id: id_column(row, 2)?,
            kind: parsed_column::<PenaltyKind>(row, 3)?,
            detail: row.get(4)?,
            created_at: parsed_column::<Timestamp>(row, 5)?,
        })
    }

    /// Inserts a penalty unless the same one is already recorded.
    /// Returns true if a row was written.
    pub(super) fn insert_penalty(
        conn: &Connection,
        user_id: u64,
        appointment_id: u64,
        kind: PenaltyKind,
        detail: &str,
        now: Timestamp,
    ) -> Result<bool> {
        let inserted = conn
            .execute(
                INSERT_PENALTY_SQL,
                params![
                    user_id as i64,
                    appointment_id as i64,
                    kind.as_str(),
                    detail,
                    now.to_string()
                ],
            )
            .db_context("Failed to record penalty")?;
        Ok(inserted > 0)
    }

    /// Records a penalty. Recording the same (user, appointment, kind) twice
    /// is a no-op.
    pub fn record_penalty(
        &mut self,
        user_id: u64,
        appointment_id: u64,
        kind: PenaltyKind,
        detail: &str,
        now: Timestamp,
    ) -> Result<bool> {
        Self::insert_penalty(&self.connection, user_id, appointment_id, kind, detail, now)
    }

    /// Penalties recorded against a user, oldest first.
    pub fn list_penalties(&self, user_id: u64) -> Result<Vec<Penalty>> {
        let mut stmt = self
            .connection
            .prepare(LIST_PENALTIES_SQL)
            .db_context("Failed to prepare penalty query")?;

        let penalties = stmt
            .query_map(params![user_id as i64], Self::build_penalty_from_row)
            .db_context("Failed to query penalties")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read penalties")?;
        Ok(penalties)
    }

    /// When the customer cancelled other appointments at or after `since`.
    pub fn cancellations_since(
        &self,
        customer_id: u64,
        excluding_appointment: u64,
        since: Timestamp,
    ) -> Result<Vec<Timestamp>> {
        let mut stmt = self
            .connection
            .prepare(CANCELLATIONS_SQL)
            .db_context("Failed to prepare cancellation query")?;

        let cancelled = stmt
            .query_map(
                params![
                    customer_id as i64,
                    excluding_appointment as i64,
                    since.to_string()
                ],
                |row| parsed_column::<Timestamp>(row, 0),
            )
            .db_context("Failed to query cancellations")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read cancellations")?;
        Ok(cancelled)
    }
}
