#![allow(dead_code)]

use std::sync::Arc;

use jiff::{civil::date, tz::TimeZone, Zoned};
use roster_core::{
    config::EngineConfig,
    evidence::FileEvidenceStore,
    models::{Appointment, AvailabilitySlot},
    params::{AddSlot, CreateAppointment, TransitionStatus, UpsertProfile},
    BookingEngine, BookingEngineBuilder, BroadcastNotifier, FixedClock, Result,
};
use tempfile::TempDir;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const CAROL: u64 = 3;

/// A UTC instant from calendar parts.
pub fn utc(year: i16, month: i8, day: i8, hour: i8, minute: i8) -> Zoned {
    date(year, month, day)
        .at(hour, minute, 0, 0)
        .to_zoned(TimeZone::UTC)
        .expect("valid UTC instant")
}

/// Engine over a temporary database with a fixed UTC clock.
pub struct TestEngine {
    pub dir: TempDir,
    pub engine: BookingEngine,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<BroadcastNotifier>,
}

impl TestEngine {
    pub async fn at(now: Zoned) -> Self {
        Self::with_config(now, EngineConfig::default()).await
    }

    pub async fn with_config(now: Zoned, config: EngineConfig) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let clock = Arc::new(FixedClock::new(now));
        let notifier = Arc::new(BroadcastNotifier::new());
        let engine = BookingEngineBuilder::new()
            .with_database_path(Some(dir.path().join("test.db")))
            .with_config(EngineConfig {
                time_zone: Some("UTC".to_string()),
                ..config
            })
            .with_clock(clock.clone())
            .with_notifier(notifier.clone())
            .with_evidence_store(Arc::new(FileEvidenceStore::new(
                dir.path().join("evidence"),
            )))
            .build()
            .await
            .expect("Failed to create engine");

        Self {
            dir,
            engine,
            clock,
            notifier,
        }
    }

    /// Provider Alice and customers Bob and Carol.
    pub async fn with_people(self) -> Self {
        for (id, name, email) in [
            (ALICE, "Alice Reyes", "alice@example.com"),
            (BOB, "Bob Cruz", "bob@example.com"),
            (CAROL, "Carol Santos", "carol@example.com"),
        ] {
            self.profile(id, name, Some(email)).await;
        }
        self
    }

    pub async fn profile(&self, id: u64, name: &str, email: Option<&str>) {
        self.engine
            .upsert_profile(&UpsertProfile {
                id,
                full_name: name.to_string(),
                email: email.map(String::from),
                ..Default::default()
            })
            .await
            .expect("Failed to save profile");
    }

    pub async fn slot(&self, provider_id: u64, day: &str, start: &str, end: &str) -> AvailabilitySlot {
        self.engine
            .add_slot(&AddSlot {
                provider_id,
                day_of_week: day.to_string(),
                start_time: start.to_string(),
                end_time: end.to_string(),
            })
            .await
            .expect("Failed to add slot")
    }

    pub async fn book(&self, customer_id: u64, date: &str, time: &str) -> Result<Appointment> {
        self.engine
            .create_appointment(&CreateAppointment {
                customer_id,
                provider_id: ALICE,
                service_id: 100,
                date: date.to_string(),
                time: time.to_string(),
                ..Default::default()
            })
            .await
    }

    pub async fn move_to(&self, appointment_id: u64, actor_id: u64, status: &str) -> Result<Appointment> {
        self.engine
            .transition_status(&TransitionStatus {
                appointment_id,
                actor_id,
                status: status.to_string(),
                final_price: None,
            })
            .await
    }
}
