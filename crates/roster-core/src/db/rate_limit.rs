//! Fixed-window counters shared by every process using the database.
//!
//! A key's window opens on its first hit and lasts `window_secs`. Hits past
//! the limit are refused until the window expires, after which the counter
//! starts over. Expired rows are purged opportunistically on each hit.

use rusqlite::{params, OptionalExtension};

use crate::error::{DatabaseResultExt, Result};

const PURGE_EXPIRED_SQL: &str = "DELETE FROM rate_limits WHERE expires_at <= ?1";
const FETCH_COUNTER_SQL: &str = "SELECT hits, expires_at FROM rate_limits WHERE key = ?1";
const OPEN_WINDOW_SQL: &str = "INSERT INTO rate_limits (key, hits, window_started_at, expires_at) VALUES (?1, 1, ?2, ?3) ON CONFLICT(key) DO UPDATE SET hits = 1, window_started_at = excluded.window_started_at, expires_at = excluded.expires_at";
const COUNT_HIT_SQL: &str = "UPDATE rate_limits SET hits = hits + 1 WHERE key = ?1";

/// Outcome of counting one hit against a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// The hit fits the budget
    pub allowed: bool,
    /// Hits left in the current window
    pub remaining: u32,
    /// Seconds until the window resets
    pub retry_after_secs: i64,
}

impl super::Database {
    /// Counts a hit against `key`, refusing it once `max_hits` is reached
    /// within the window. Refused hits are not counted.
    pub fn hit_rate_limit(
        &mut self,
        key: &str,
        max_hits: u32,
        window_secs: i64,
        now_secs: i64,
    ) -> Result<RateLimitDecision> {
        let tx = self.immediate()?;

        tx.execute(PURGE_EXPIRED_SQL, params![now_secs])
            .db_context("Failed to purge rate limits")?;

        let current: Option<(u32, i64)> = tx
            .query_row(FETCH_COUNTER_SQL, params![key], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .db_context("Failed to read rate limit")?;

        let decision = match current {
            Some((hits, expires_at)) if hits >= max_hits => RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after_secs: (expires_at - now_secs).max(1),
            },
            Some((hits, expires_at)) => {
                tx.execute(COUNT_HIT_SQL, params![key])
                    .db_context("Failed to count hit")?;
                RateLimitDecision {
                    allowed: true,
                    remaining: max_hits - hits - 1,
                    retry_after_secs: expires_at - now_secs,
                }
            }
            None if max_hits == 0 => RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after_secs: window_secs,
            },
            None => {
                tx.execute(
                    OPEN_WINDOW_SQL,
                    params![key, now_secs, now_secs + window_secs],
                )
                .db_context("Failed to open rate limit window")?;
                RateLimitDecision {
                    allowed: true,
                    remaining: max_hits - 1,
                    retry_after_secs: window_secs,
                }
            }
        };

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(decision)
    }
}
