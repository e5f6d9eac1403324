//! Wall-clock source for date gates and timestamps.
//!
//! Every "now" the engine uses comes from a [`Clock`], so booking cutoffs,
//! past-date checks and no-show windows can be exercised at fixed instants.

use std::sync::{Mutex, PoisonError};

use jiff::{tz::TimeZone, SignedDuration, Timestamp, Zoned};

/// Source of the current instant in the business time zone.
pub trait Clock: Send + Sync {
    /// Current instant, carrying the zone local dates and hours are read in.
    fn now(&self) -> Zoned;
}

/// Reads the system clock.
#[derive(Debug, Clone)]
pub struct SystemClock {
    time_zone: TimeZone,
}

impl SystemClock {
    pub fn new(time_zone: TimeZone) -> Self {
        Self { time_zone }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(TimeZone::system())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Zoned {
        Timestamp::now().to_zoned(self.time_zone.clone())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Zoned>,
}

impl FixedClock {
    pub fn new(now: Zoned) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to a new instant.
    pub fn set(&self, now: Zoned) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move forward by a duration.
    pub fn advance(&self, by: SignedDuration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        if let Ok(next) = now.checked_add(by) {
            *now = next;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Zoned {
        self.now
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
