//! Tests for the engine module.

use jiff::{civil::date, tz::TimeZone};
use tempfile::TempDir;

use super::*;
use crate::{
    clock::FixedClock,
    models::{DayOfWeek, SlotState},
    params::{AddSlot, Id, ListSlots, ResolveAvailability},
};

/// Helper function to create a test engine pinned to Wednesday 2025-01-01 08:00 UTC
async fn create_test_engine() -> (TempDir, BookingEngine) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let now = date(2025, 1, 1)
        .at(8, 0, 0, 0)
        .to_zoned(TimeZone::UTC)
        .expect("valid instant");
    let engine = BookingEngineBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_config(EngineConfig {
            time_zone: Some("UTC".to_string()),
            ..Default::default()
        })
        .with_clock(Arc::new(FixedClock::new(now)))
        .build()
        .await
        .expect("Failed to create engine");
    (temp_dir, engine)
}

fn monday(start: &str, end: &str) -> AddSlot {
    AddSlot {
        provider_id: 1,
        day_of_week: "Monday".to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
    }
}

#[tokio::test]
async fn test_add_and_list_slots() {
    let (_temp_dir, engine) = create_test_engine().await;

    engine.add_slot(&monday("13:00", "14:00")).await.unwrap();
    engine.add_slot(&monday("09:00", "10:00")).await.unwrap();
    engine
        .add_slot(&AddSlot {
            day_of_week: "tue".to_string(),
            ..monday("09:00", "10:00")
        })
        .await
        .unwrap();

    let all = engine
        .list_slots(&ListSlots {
            provider_id: 1,
            day_of_week: None,
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let mondays = engine
        .list_slots(&ListSlots {
            provider_id: 1,
            day_of_week: Some("monday".to_string()),
        })
        .await
        .unwrap();
    let starts: Vec<String> = mondays
        .iter()
        .map(|s| crate::models::format_time(s.start_time))
        .collect();
    assert_eq!(starts, vec!["09:00", "13:00"]);
    assert!(mondays.iter().all(|s| s.day_of_week == DayOfWeek::Monday));
}

#[tokio::test]
async fn test_touching_slot_is_an_overlap() {
    let (_temp_dir, engine) = create_test_engine().await;

    let first = engine.add_slot(&monday("09:00", "10:00")).await.unwrap();
    let err = engine.add_slot(&monday("10:00", "11:00")).await.unwrap_err();
    match err {
        BookingError::Overlap { existing_id, .. } => assert_eq!(existing_id, first.id),
        other => panic!("Expected Overlap, got {other:?}"),
    }

    // another provider is unaffected
    engine
        .add_slot(&AddSlot {
            provider_id: 2,
            ..monday("09:30", "10:30")
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_missing_slot() {
    let (_temp_dir, engine) = create_test_engine().await;

    let err = engine.get_slot(&Id { id: 42 }).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound { entity: "Slot", id: 42 }));
}

#[tokio::test]
async fn test_resolve_future_monday() {
    let (_temp_dir, engine) = create_test_engine().await;
    engine.add_slot(&monday("09:00", "10:00")).await.unwrap();

    let resolved = engine
        .resolve_availability(&ResolveAvailability {
            provider_id: 1,
            date: "2025-01-06".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].status, SlotState::Available);

    // Tuesday has nothing
    let tuesday = engine
        .resolve_availability(&ResolveAvailability {
            provider_id: 1,
            date: "2025-01-07".to_string(),
        })
        .await
        .unwrap();
    assert!(tuesday.is_empty());
}

#[tokio::test]
async fn test_builder_rejects_bad_config() {
    let temp_dir = TempDir::new().unwrap();
    let result = BookingEngineBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_config(EngineConfig {
            booking_cutoff_hour: 30,
            ..Default::default()
        })
        .build()
        .await;
    assert!(matches!(result, Err(BookingError::Configuration { .. })));
}

#[tokio::test]
async fn test_builder_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("roster.db");

    let engine = BookingEngineBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .unwrap();
    assert_eq!(engine.database_path(), &db_path);
    assert!(db_path.exists());
}
