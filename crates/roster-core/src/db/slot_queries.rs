//! Availability slot CRUD and lookups.

use jiff::{civil::Time, Timestamp};
use rusqlite::{params, Connection, OptionalExtension};

use super::utils::{id_column, parsed_column, time_column};
use crate::{
    error::{BookingError, DatabaseResultExt, Result},
    models::{format_time, AvailabilitySlot, DayOfWeek, NewSlot, UpdateSlotRequest},
};

const SLOT_COLUMNS: &str =
    "id, provider_id, day_of_week, start_time, end_time, active, created_at, updated_at";
const INSERT_SLOT_SQL: &str = "INSERT INTO availability_slots (provider_id, day_of_week, start_time, end_time, active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)";
const UPDATE_SLOT_SQL: &str = "UPDATE availability_slots SET day_of_week = ?1, start_time = ?2, end_time = ?3, active = ?4, updated_at = ?5 WHERE id = ?6";
const DELETE_SLOT_SQL: &str = "DELETE FROM availability_slots WHERE id = ?1";
const UPDATE_SLOT_ACTIVE_SQL: &str =
    "UPDATE availability_slots SET active = ?1, updated_at = ?2 WHERE id = ?3";

fn select_slots(filter: &str) -> String {
    format!("SELECT {SLOT_COLUMNS} FROM availability_slots WHERE {filter}")
}

fn overlap(start: Time, end: Time, existing: &AvailabilitySlot) -> BookingError {
    BookingError::Overlap {
        start: format_time(start),
        end: format_time(end),
        existing_id: existing.id,
        existing_start: format_time(existing.start_time),
        existing_end: format_time(existing.end_time),
    }
}

impl super::Database {
    /// Helper function to construct an AvailabilitySlot from a database row
    pub(super) fn build_slot_from_row(row: &rusqlite::Row) -> rusqlite::Result<AvailabilitySlot> {
        let day_number: i64 = row.get(2)?;
        let day_of_week = DayOfWeek::from_number(day_number).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Integer,
                format!("Invalid day of week: {day_number}").into(),
            )
        })?;

        Ok(AvailabilitySlot {
            id: id_column(row, 0)?,
            provider_id: id_column(row, 1)?,
            day_of_week,
            start_time: time_column(row, 3)?,
            end_time: time_column(row, 4)?,
            active: row.get(5)?,
            created_at: parsed_column::<Timestamp>(row, 6)?,
            updated_at: parsed_column::<Timestamp>(row, 7)?,
        })
    }

    /// Fetches one slot by id on any connection or transaction.
    pub(super) fn find_slot(conn: &Connection, slot_id: u64) -> Result<Option<AvailabilitySlot>> {
        conn.query_row(
            &select_slots("id = ?1"),
            params![slot_id as i64],
            Self::build_slot_from_row,
        )
        .optional()
        .db_context("Failed to fetch slot")
    }

    /// Active slots of a provider on a weekday, earliest first.
    pub(super) fn query_active_slots(
        conn: &Connection,
        provider_id: u64,
        day: DayOfWeek,
    ) -> Result<Vec<AvailabilitySlot>> {
        let mut stmt = conn
            .prepare(&select_slots(
                "provider_id = ?1 AND day_of_week = ?2 AND active = 1 ORDER BY start_time, id",
            ))
            .db_context("Failed to prepare slot query")?;

        let slots = stmt
            .query_map(
                params![provider_id as i64, day.number()],
                Self::build_slot_from_row,
            )
            .db_context("Failed to query slots")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read slots")?;
        Ok(slots)
    }

    /// Adds a slot after checking it against the provider's active slots on
    /// the same weekday.
    ///
    /// Ranges that merely touch (10:00-11:00 next to 09:00-10:00) are
    /// rejected as overlapping.
    pub fn add_slot(&mut self, slot: &NewSlot, now: Timestamp) -> Result<AvailabilitySlot> {
        let tx = self.immediate()?;

        let siblings = Self::query_active_slots(&tx, slot.provider_id, slot.day_of_week)?;
        if let Some(existing) = siblings
            .iter()
            .find(|s| s.touches(slot.start_time, slot.end_time))
        {
            return Err(overlap(slot.start_time, slot.end_time, existing));
        }

        tx.execute(
            INSERT_SLOT_SQL,
            params![
                slot.provider_id as i64,
                slot.day_of_week.number(),
                format_time(slot.start_time),
                format_time(slot.end_time),
                now.to_string(),
            ],
        )
        .db_context("Failed to insert slot")?;
        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(AvailabilitySlot {
            id,
            provider_id: slot.provider_id,
            day_of_week: slot.day_of_week,
            start_time: slot.start_time,
            end_time: slot.end_time,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update to a slot owned by `provider_id`.
    ///
    /// The merged range must still be non-empty. Overlap with sibling slots
    /// is not re-checked here, unlike [`Self::add_slot`].
    pub fn update_slot(
        &mut self,
        slot_id: u64,
        provider_id: u64,
        request: &UpdateSlotRequest,
        now: Timestamp,
    ) -> Result<AvailabilitySlot> {
        let tx = self.immediate()?;

        let mut slot = Self::owned_slot(&tx, slot_id, provider_id, "update")?;
        if let Some(day) = request.day_of_week {
            slot.day_of_week = day;
        }
        if let Some(start) = request.start_time {
            slot.start_time = start;
        }
        if let Some(end) = request.end_time {
            slot.end_time = end;
        }
        if let Some(active) = request.active {
            slot.active = active;
        }
        if slot.start_time >= slot.end_time {
            return Err(BookingError::InvalidRange {
                start: format_time(slot.start_time),
                end: format_time(slot.end_time),
            });
        }
        slot.updated_at = now;

        tx.execute(
            UPDATE_SLOT_SQL,
            params![
                slot.day_of_week.number(),
                format_time(slot.start_time),
                format_time(slot.end_time),
                slot.active,
                now.to_string(),
                slot_id as i64,
            ],
        )
        .db_context("Failed to update slot")?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(slot)
    }

    /// Hard-deletes a slot. Appointments booked against it keep the id.
    pub fn delete_slot(&mut self, slot_id: u64, provider_id: u64) -> Result<AvailabilitySlot> {
        let tx = self.immediate()?;

        let slot = Self::owned_slot(&tx, slot_id, provider_id, "delete")?;
        tx.execute(DELETE_SLOT_SQL, params![slot_id as i64])
            .db_context("Failed to delete slot")?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(slot)
    }

    /// Flips the active flag of every slot a provider has on `day`.
    ///
    /// The slots left active afterwards must not touch each other; if they
    /// would, nothing changes and `Overlap` names the clashing pair.
    pub fn toggle_day(
        &mut self,
        provider_id: u64,
        day: DayOfWeek,
        now: Timestamp,
    ) -> Result<Vec<AvailabilitySlot>> {
        let tx = self.immediate()?;

        let slots = Self::query_slots(&tx, provider_id, Some(day))?;
        if slots.is_empty() {
            return Err(BookingError::SlotNotFound {
                day: day.as_str().to_string(),
                time: None,
            });
        }

        let flipped: Vec<AvailabilitySlot> = slots
            .into_iter()
            .map(|slot| AvailabilitySlot {
                active: !slot.active,
                updated_at: now,
                ..slot
            })
            .collect();

        // ordered by start time, so each slot is checked against earlier ones
        let active: Vec<&AvailabilitySlot> = flipped.iter().filter(|s| s.active).collect();
        for (i, slot) in active.iter().enumerate() {
            if let Some(existing) = active[..i]
                .iter()
                .find(|other| other.touches(slot.start_time, slot.end_time))
            {
                return Err(overlap(slot.start_time, slot.end_time, existing));
            }
        }

        for slot in &flipped {
            tx.execute(
                UPDATE_SLOT_ACTIVE_SQL,
                params![slot.active, now.to_string(), slot.id as i64],
            )
            .db_context("Failed to toggle slot")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(flipped)
    }

    /// Lists a provider's slots ordered by weekday then start time.
    pub fn list_slots(
        &self,
        provider_id: u64,
        day: Option<DayOfWeek>,
    ) -> Result<Vec<AvailabilitySlot>> {
        Self::query_slots(&self.connection, provider_id, day)
    }

    /// Retrieves a single slot by its ID.
    pub fn get_slot(&self, slot_id: u64) -> Result<Option<AvailabilitySlot>> {
        Self::find_slot(&self.connection, slot_id)
    }

    fn query_slots(
        conn: &Connection,
        provider_id: u64,
        day: Option<DayOfWeek>,
    ) -> Result<Vec<AvailabilitySlot>> {
        let mut stmt = conn
            .prepare(&select_slots(
                "provider_id = ?1 AND (?2 IS NULL OR day_of_week = ?2) ORDER BY day_of_week, start_time, id",
            ))
            .db_context("Failed to prepare slot query")?;

        let slots = stmt
            .query_map(
                params![provider_id as i64, day.map(|d| d.number())],
                Self::build_slot_from_row,
            )
            .db_context("Failed to query slots")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read slots")?;
        Ok(slots)
    }

    fn owned_slot(
        conn: &Connection,
        slot_id: u64,
        provider_id: u64,
        action: &str,
    ) -> Result<AvailabilitySlot> {
        let slot = Self::find_slot(conn, slot_id)?.ok_or(BookingError::NotFound {
            entity: "Slot",
            id: slot_id,
        })?;
        if slot.provider_id != provider_id {
            return Err(BookingError::Forbidden {
                actor_id: provider_id,
                action: format!("{action} slot {slot_id}"),
            });
        }
        Ok(slot)
    }
}
