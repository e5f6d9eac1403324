//! Row decoding and retry helpers shared by the query modules.

use std::{fmt::Display, str::FromStr, time::Duration};

use rusqlite::{types::Type, Row};

use crate::error::{BookingError, Result};

/// Reads an INTEGER id column.
pub(crate) fn id_column(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)? as u64)
}

/// Reads a nullable INTEGER id column.
pub(crate) fn optional_id_column(row: &Row, idx: usize) -> rusqlite::Result<Option<u64>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|id| id as u64))
}

/// Reads a TEXT column and parses it with [`FromStr`].
pub(crate) fn parsed_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.get(idx)?;
    parse_text(idx, &raw)
}

/// Nullable variant of [`parsed_column`].
pub(crate) fn optional_parsed_column<T>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    row.get::<_, Option<String>>(idx)?
        .map(|raw| parse_text(idx, &raw))
        .transpose()
}

/// Reads an `HH:MM` TEXT column.
pub(crate) fn time_column(row: &Row, idx: usize) -> rusqlite::Result<jiff::civil::Time> {
    let raw: String = row.get(idx)?;
    crate::models::parse_time("column", &raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

fn parse_text<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("Invalid value '{raw}': {e}").into(),
        )
    })
}

/// Bounded retry of transactions that hit lock contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub attempts: u32,
    /// Linear backoff step
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(25),
        }
    }
}

impl super::Database {
    /// Runs `op`, retrying transient store failures.
    ///
    /// Once the retries are spent the failure surfaces as
    /// [`BookingError::Conflict`] so the caller can re-fetch and try again.
    pub fn with_retry<T, F>(&mut self, policy: RetryPolicy, mut op: F) -> Result<T>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op(self) {
                Err(e) if e.is_transient() => {
                    attempt += 1;
                    if attempt > policy.attempts {
                        return Err(BookingError::Conflict {
                            message: format!("store stayed busy after {attempt} attempts: {e}"),
                        });
                    }
                    log::debug!("Transient store error, retry {attempt}: {e}");
                    std::thread::sleep(policy.backoff * attempt);
                }
                other => return other,
            }
        }
    }
}
