//! Identity records and provider locations.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::utils::{id_column, parsed_column};
use crate::{
    error::{BookingError, DatabaseResultExt, Result},
    models::{GeoPoint, Profile, ProfileUpdate},
};

const PROFILE_COLUMNS: &str =
    "id, full_name, email, phone, latitude, longitude, created_at, updated_at";
const UPSERT_PROFILE_SQL: &str = "INSERT INTO profiles (id, full_name, email, phone, latitude, longitude, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) ON CONFLICT(id) DO UPDATE SET full_name = excluded.full_name, email = excluded.email, phone = excluded.phone, latitude = excluded.latitude, longitude = excluded.longitude, updated_at = excluded.updated_at";
const LOCATED_PROVIDERS_SQL: &str = "SELECT p.id, p.full_name, p.email, p.phone, p.latitude, p.longitude, p.created_at, p.updated_at FROM profiles p WHERE p.latitude IS NOT NULL AND p.longitude IS NOT NULL AND EXISTS (SELECT 1 FROM availability_slots s WHERE s.provider_id = p.id AND s.active = 1) ORDER BY p.id";

impl super::Database {
    /// Helper function to construct a Profile from a database row
    fn build_profile_from_row(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        let latitude: Option<f64> = row.get(4)?;
        let longitude: Option<f64> = row.get(5)?;
        Ok(Profile {
            id: id_column(row, 0)?,
            full_name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            location: latitude
                .zip(longitude)
                .map(|(latitude, longitude)| GeoPoint {
                    latitude,
                    longitude,
                }),
            created_at: parsed_column::<Timestamp>(row, 6)?,
            updated_at: parsed_column::<Timestamp>(row, 7)?,
        })
    }

    fn find_profile(conn: &Connection, id: u64) -> Result<Option<Profile>> {
        conn.query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
            params![id as i64],
            Self::build_profile_from_row,
        )
        .optional()
        .db_context("Failed to fetch profile")
    }

    /// Fetches a profile that must exist, naming the role in the error.
    pub(super) fn require_profile(
        conn: &Connection,
        id: u64,
        entity: &'static str,
    ) -> Result<Profile> {
        Self::find_profile(conn, id)?.ok_or(BookingError::NotFound { entity, id })
    }

    /// Inserts a profile or replaces every field of an existing one.
    pub fn upsert_profile(&mut self, update: &ProfileUpdate, now: Timestamp) -> Result<Profile> {
        let tx = self.immediate()?;

        tx.execute(
            UPSERT_PROFILE_SQL,
            params![
                update.id as i64,
                update.full_name,
                update.email,
                update.phone,
                update.location.map(|p| p.latitude),
                update.location.map(|p| p.longitude),
                now.to_string(),
            ],
        )
        .db_context("Failed to save profile")?;
        let profile = Self::require_profile(&tx, update.id, "Profile")?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(profile)
    }

    /// Retrieves a single profile by its ID.
    pub fn get_profile(&self, id: u64) -> Result<Option<Profile>> {
        Self::find_profile(&self.connection, id)
    }

    /// Providers that have a location and at least one active slot.
    pub fn located_providers(&self) -> Result<Vec<Profile>> {
        let mut stmt = self
            .connection
            .prepare(LOCATED_PROVIDERS_SQL)
            .db_context("Failed to prepare provider query")?;

        let providers = stmt
            .query_map([], Self::build_profile_from_row)
            .db_context("Failed to query providers")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read providers")?;
        Ok(providers)
    }
}
