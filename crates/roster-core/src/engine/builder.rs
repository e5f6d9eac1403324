//! Builder for creating and configuring BookingEngine instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::task;

use super::BookingEngine;
use crate::{
    clock::{Clock, SystemClock},
    config::EngineConfig,
    db::{utils::RetryPolicy, Database},
    error::{BookingError, Result},
    evidence::{EvidenceStore, FileEvidenceStore},
    notify::{BroadcastNotifier, Notifier},
};

/// Builder for creating and configuring BookingEngine instances.
#[derive(Clone, Default)]
pub struct BookingEngineBuilder {
    database_path: Option<PathBuf>,
    config: Option<EngineConfig>,
    clock: Option<Arc<dyn Clock>>,
    notifier: Option<Arc<dyn Notifier>>,
    evidence: Option<Arc<dyn EvidenceStore>>,
}

impl BookingEngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/roster/roster.db` or `~/.local/share/roster/roster.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Replaces the default configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the system clock, typically with a fixed one in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replaces the default broadcast notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replaces the default file-system evidence store.
    pub fn with_evidence_store(mut self, evidence: Arc<dyn EvidenceStore>) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// Builds the configured engine instance.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Configuration` if the configuration is invalid
    /// Returns `BookingError::FileSystem` if the database directory cannot be created
    /// Returns `BookingError::Database` if database initialization fails
    pub async fn build(self) -> Result<BookingEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| BookingError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), BookingError>(())
        })
        .await
        .map_err(|e| BookingError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock::new(config.resolve_time_zone()?)),
        };
        let evidence: Arc<dyn EvidenceStore> = match self.evidence {
            Some(evidence) => evidence,
            None => {
                let dir = config.evidence_dir.clone().unwrap_or_else(|| {
                    db_path
                        .parent()
                        .map(|p| p.join("evidence"))
                        .unwrap_or_else(|| PathBuf::from("evidence"))
                });
                Arc::new(FileEvidenceStore::new(dir))
            }
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(BroadcastNotifier::new()),
        };

        let retry = RetryPolicy {
            attempts: config.transient_retry_attempts,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        };

        log::debug!("Booking engine ready at {}", db_path.display());

        Ok(BookingEngine {
            db_path,
            config,
            clock,
            notifier,
            evidence,
            retry,
            side_effects: Arc::default(),
        })
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("roster")
            .place_data_file("roster.db")
            .map_err(|e| BookingError::XdgDirectory(e.to_string()))
    }
}
