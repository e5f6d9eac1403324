//! Integration tests comparing CLI output with the core Display
//! implementations
//!
//! The CLI and the MCP server both print `roster_core::display` output, so
//! what the binary prints must match what the engine's results render to.

use std::process::Command;

use roster_core::{
    display::{CreateResult, DayAvailability, Slots},
    params::{AddSlot, ListSlots, ResolveAvailability, UpsertProfile},
    BookingEngine, BookingEngineBuilder, EngineConfig,
};
use tempfile::TempDir;

/// Helper function to create a test engine with temporary database
async fn create_test_engine() -> (BookingEngine, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("test.db");

    let engine = BookingEngineBuilder::new()
        .with_database_path(Some(db_path))
        .with_config(EngineConfig {
            time_zone: Some("UTC".to_string()),
            ..Default::default()
        })
        .build()
        .await
        .expect("Failed to create engine");

    (engine, temp_dir)
}

/// Run a CLI command and capture its output
fn run_cli_command(temp_dir: &TempDir, args: &[&str]) -> String {
    let config = temp_dir.path().join("config.json");
    std::fs::write(&config, r#"{"time_zone": "UTC"}"#).expect("Failed to write config");

    let output = Command::new(env!("CARGO_BIN_EXE_roster"))
        .arg("--no-color")
        .arg("--database-file")
        .arg(temp_dir.path().join("test.db"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("Failed to run CLI command");
    String::from_utf8(output.stdout).expect("Invalid UTF-8 in CLI output")
}

#[tokio::test]
async fn test_slot_display_consistency() {
    let (engine, temp_dir) = create_test_engine().await;

    let cli_output = run_cli_command(&temp_dir, &["slot", "add", "1", "tuesday", "08:00", "09:30"]);

    let direct = engine
        .add_slot(&AddSlot {
            provider_id: 2,
            day_of_week: "tuesday".to_string(),
            start_time: "08:00".to_string(),
            end_time: "09:30".to_string(),
        })
        .await
        .expect("Failed to add slot");
    let direct_output = CreateResult::new(direct).to_string();

    // identical apart from the ID
    assert_eq!(
        cli_output.replace("1", "#"),
        direct_output.replace("2", "#")
    );

    let listed = engine
        .list_slots(&ListSlots {
            provider_id: 1,
            day_of_week: None,
        })
        .await
        .unwrap();
    let cli_list = run_cli_command(&temp_dir, &["slot", "list", "1"]);
    assert!(cli_list.contains(&Slots(listed).to_string()));
}

#[tokio::test]
async fn test_availability_display_consistency() {
    let (engine, temp_dir) = create_test_engine().await;
    for (id, name) in [(1, "Alice Reyes"), (2, "Bob Cruz")] {
        engine
            .upsert_profile(&UpsertProfile {
                id,
                full_name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    engine
        .add_slot(&AddSlot {
            provider_id: 1,
            day_of_week: "monday".to_string(),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
        })
        .await
        .unwrap();

    run_cli_command(
        &temp_dir,
        &["book", "2", "1", "2099-01-05", "09:00", "--service", "7"],
    );

    let params = ResolveAvailability {
        provider_id: 1,
        date: "2099-01-05".to_string(),
    };
    let slots = engine.resolve_availability(&params).await.unwrap();
    let direct = DayAvailability {
        date: params.validate().unwrap(),
        slots,
    }
    .to_string();

    let cli_output = run_cli_command(&temp_dir, &["availability", "1", "2099-01-05"]);
    assert_eq!(cli_output, direct);
    assert!(cli_output.contains("slot 1: booked"));
}
