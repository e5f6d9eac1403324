//! Engine configuration.
//!
//! Loaded from a JSON file; every field has a default so an absent file or a
//! partial one is fine. Lookup order is an explicit path, then
//! `$XDG_CONFIG_HOME/roster/config.json`, then the built-in defaults.

use std::path::{Path, PathBuf};

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result, ResultExt};

/// Tunables for booking rules, retries and storage locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// IANA zone local dates and hours are read in; system zone when unset
    pub time_zone: Option<String>,
    /// Local hour from which same-day bookings are closed
    pub booking_cutoff_hour: u8,
    /// Scheduled appointments a customer may hold at once
    pub max_scheduled_bookings: u32,
    /// Cancelling closer than this to the slot start is penalised
    pub late_cancellation_minutes: i64,
    /// Retries of a contended transaction before giving up with a conflict
    pub transient_retry_attempts: u32,
    /// Linear backoff step between retries
    pub retry_backoff_ms: u64,
    /// Budget for booking attempts per customer
    pub booking_rate_limit: RateLimitConfig,
    /// Where no-show evidence photos are written; data dir when unset
    pub evidence_dir: Option<PathBuf>,
}

/// A fixed-window request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            window_secs: 600,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_zone: None,
            booking_cutoff_hour: 15,
            max_scheduled_bookings: 3,
            late_cancellation_minutes: 120,
            transient_retry_attempts: 3,
            retry_backoff_ms: 25,
            booking_rate_limit: RateLimitConfig::default(),
            evidence_dir: None,
        }
    }
}

impl EngineConfig {
    /// Reads and validates a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| BookingError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit file, else the XDG config file if one exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match xdg::BaseDirectories::with_prefix("roster").find_config_file("config.json") {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.booking_cutoff_hour > 24 {
            return Err(BookingError::Configuration {
                message: format!(
                    "booking_cutoff_hour must be between 0 and 24, got {}",
                    self.booking_cutoff_hour
                ),
            });
        }
        if self.max_scheduled_bookings == 0 {
            return Err(BookingError::Configuration {
                message: "max_scheduled_bookings must be at least 1".to_string(),
            });
        }
        if self.booking_rate_limit.window_secs <= 0 || self.booking_rate_limit.max_attempts == 0 {
            return Err(BookingError::Configuration {
                message: "booking_rate_limit needs a positive window and attempt budget"
                    .to_string(),
            });
        }
        self.resolve_time_zone()?;
        Ok(())
    }

    /// The configured zone, or the system zone.
    pub fn resolve_time_zone(&self) -> Result<TimeZone> {
        match &self.time_zone {
            Some(name) => TimeZone::get(name).with_context(format!("Unknown time zone '{name}'")),
            None => Ok(TimeZone::system()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"booking_cutoff_hour": 17, "time_zone": "UTC"}}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.booking_cutoff_hour, 17);
        assert_eq!(config.max_scheduled_bookings, 3);
        assert_eq!(config.booking_rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"cutoff": 17}}"#).unwrap();

        assert!(matches!(
            EngineConfig::from_file(file.path()),
            Err(BookingError::Serialization { .. })
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = EngineConfig {
            max_scheduled_bookings: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BookingError::Configuration { .. })
        ));

        let config = EngineConfig {
            time_zone: Some("Mars/Olympus_Mons".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_a_file_system_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/roster.json")).unwrap_err();
        assert!(matches!(err, BookingError::FileSystem { .. }));
    }
}
