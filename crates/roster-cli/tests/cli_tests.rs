use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated database and config for one test
struct CliEnv {
    _dir: TempDir,
    db: PathBuf,
    config: PathBuf,
}

impl CliEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temporary directory");
        let db = dir.path().join("cli_test.db");
        let config = dir.path().join("config.json");
        let evidence = dir.path().join("evidence");
        std::fs::write(
            &config,
            serde_json::json!({
                "time_zone": "UTC",
                "evidence_dir": evidence,
            })
            .to_string(),
        )
        .expect("Failed to write config");
        Self {
            _dir: dir,
            db,
            config,
        }
    }

    /// A `roster` command with --no-color and this environment's paths
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("roster").expect("Failed to find roster binary");
        cmd.arg("--no-color")
            .arg("--database-file")
            .arg(&self.db)
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn run(&self, args: &[&str]) {
        self.cmd().args(args).assert().success();
    }

    /// Alice (1) provides, Bob (2) and Carol (3) book. Alice works Mondays 09:00-10:00.
    fn with_monday_slot(self) -> Self {
        self.run(&["profile", "upsert", "1", "Alice Reyes"]);
        self.run(&["profile", "upsert", "2", "Bob Cruz"]);
        self.run(&["profile", "upsert", "3", "Carol Santos"]);
        self.run(&["slot", "add", "1", "monday", "09:00", "10:00"]);
        self
    }
}

// 2099-01-05 is a Monday
const MONDAY: &str = "2099-01-05";

#[test]
fn test_cli_no_arguments_prints_help() {
    Command::cargo_bin("roster")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_add_slot() {
    let env = CliEnv::new();

    env.cmd()
        .args(["slot", "add", "1", "Mon", "09:00", "10:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created slot with ID: 1"))
        .stdout(predicate::str::contains("- **1** monday 09:00-10:00"));
}

#[test]
fn test_cli_overlapping_slot_fails_with_code() {
    let env = CliEnv::new();
    env.run(&["slot", "add", "1", "monday", "09:00", "10:00"]);

    env.cmd()
        .args(["slot", "add", "1", "monday", "09:30", "11:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[OVERLAP]"));
}

#[test]
fn test_cli_invalid_slot_input() {
    let env = CliEnv::new();

    env.cmd()
        .args(["slot", "add", "1", "someday", "09:00", "10:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[INVALID_DAY]"));

    env.cmd()
        .args(["slot", "add", "1", "monday", "10:00", "09:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[INVALID_RANGE]"));
}

#[test]
fn test_cli_list_empty_slots() {
    let env = CliEnv::new();

    env.cmd()
        .args(["slot", "list", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No slots found."));
}

#[test]
fn test_cli_update_and_delete_slot() {
    let env = CliEnv::new();
    env.run(&["slot", "add", "1", "monday", "09:00", "10:00"]);

    env.cmd()
        .args(["slot", "update", "1", "--provider", "1", "--end", "10:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated slot with ID: 1"))
        .stdout(predicate::str::contains("09:00-10:30"));

    env.cmd()
        .args(["slot", "update", "1", "--provider", "2", "--active", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[FORBIDDEN]"));

    env.cmd()
        .args(["slot", "delete", "1", "--provider", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted monday slot 09:00 (ID: 1)"));

    env.cmd()
        .args(["slot", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[NOT_FOUND]"));
}

#[test]
fn test_cli_toggle_day() {
    let env = CliEnv::new();
    env.run(&["slot", "add", "1", "monday", "09:00", "10:00"]);
    env.run(&["slot", "add", "1", "monday", "13:00", "14:00"]);

    env.cmd()
        .args(["slot", "toggle", "1", MONDAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Closed 2 slot(s)"))
        .stdout(predicate::str::contains("(inactive)"));

    env.cmd()
        .args(["availability", "1", MONDAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("No active slots on this day."));

    env.cmd()
        .args(["slot", "toggle", "1", MONDAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Opened 2 slot(s)"));
}

#[test]
fn test_cli_book_and_resolve_availability() {
    let env = CliEnv::new().with_monday_slot();

    env.cmd()
        .args(["availability", "1", MONDAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("## 2099-01-05 (monday)"))
        .stdout(predicate::str::contains("09:00-10:00 slot 1: available"));

    env.cmd()
        .args([
            "book",
            "2",
            "1",
            MONDAY,
            "09:00",
            "--service",
            "100",
            "--description",
            "Leaking sink",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Booked appointment with ID: 1"))
        .stdout(predicate::str::contains("# Appointment 1"))
        .stdout(predicate::str::contains("Leaking sink"));

    env.cmd()
        .args(["av", "1", MONDAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("slot 1: booked"));

    // the following Monday is untouched
    env.cmd()
        .args(["av", "1", "2099-01-12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slot 1: available"));

    env.cmd()
        .args(["book", "3", "1", MONDAY, "09:00", "--service", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[SLOT_ALREADY_BOOKED]"));
}

#[test]
fn test_cli_booking_errors() {
    let env = CliEnv::new().with_monday_slot();

    env.cmd()
        .args(["book", "2", "1", "05/01/2099", "09:00", "--service", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[INVALID_DATE_FORMAT]"));

    env.cmd()
        .args(["book", "2", "1", MONDAY, "09:30", "--service", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[SLOT_NOT_FOUND]"));

    env.cmd()
        .args(["book", "1", "1", MONDAY, "09:00", "--service", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[SELF_BOOKING_NOT_ALLOWED]"));

    env.cmd()
        .args(["book", "2", "1", "2000-01-03", "09:00", "--service", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[PAST_DATE_TIME]"));
}

#[test]
fn test_cli_appointment_lifecycle() {
    let env = CliEnv::new().with_monday_slot();
    env.run(&["book", "2", "1", MONDAY, "09:00", "--service", "100"]);

    for status in ["accepted", "on-the-way", "in_progress"] {
        env.run(&["appointment", "status", "1", status, "--actor", "1"]);
    }

    env.cmd()
        .args(["appointment", "status", "1", "finished", "--actor", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[INVALID_INPUT]"));

    env.cmd()
        .args([
            "appt", "status", "1", "finished", "--actor", "1", "--price", "850",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: finished"))
        .stdout(predicate::str::contains("Final price: 850.00"));

    // only the customer signs off
    env.cmd()
        .args(["appt", "status", "1", "completed", "--actor", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[FORBIDDEN]"));

    env.run(&["appt", "status", "1", "completed", "--actor", "2"]);

    env.cmd()
        .args(["appt", "rate", "1", "5", "--user", "2", "--comment", "Fast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rated appointment 1"));

    env.cmd()
        .args(["appt", "rate", "1", "4", "--user", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[ALREADY_RATED]"));

    env.cmd()
        .args(["appt", "list", "--status", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- **1**"));
}

#[test]
fn test_cli_invalid_transition() {
    let env = CliEnv::new().with_monday_slot();
    env.run(&["book", "2", "1", MONDAY, "09:00", "--service", "100"]);

    env.cmd()
        .args(["appointment", "status", "1", "in_progress", "--actor", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[INVALID_TRANSITION]"));

    env.cmd()
        .args(["appointment", "status", "1", "sleeping", "--actor", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[INVALID_STATUS]"));
}

#[test]
fn test_cli_cancel_frees_the_slot() {
    let env = CliEnv::new().with_monday_slot();
    env.run(&["book", "2", "1", MONDAY, "09:00", "--service", "100"]);

    env.cmd()
        .args(["appointment", "cancel", "1", "--actor", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[FORBIDDEN]"));

    env.cmd()
        .args([
            "appointment",
            "cancel",
            "1",
            "--actor",
            "2",
            "--reason",
            "Fixed it myself",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: cancelled"))
        .stdout(predicate::str::contains("Cancellation reason: Fixed it myself"));

    env.cmd()
        .args(["appointment", "cancel", "1", "--actor", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[ALREADY_TERMINAL]"));

    env.cmd()
        .args(["book", "3", "1", MONDAY, "09:00", "--service", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Booked appointment with ID: 2"));

    // far in advance, so no penalty
    env.cmd()
        .args(["penalty", "detect", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No penalties recorded."));
}

#[test]
fn test_cli_backjob_review() {
    let env = CliEnv::new().with_monday_slot();
    env.run(&["book", "2", "1", MONDAY, "09:00", "--service", "100"]);
    for status in ["accepted", "on_the_way", "in_progress"] {
        env.run(&["appt", "status", "1", status, "--actor", "1"]);
    }
    env.run(&[
        "appt", "status", "1", "finished", "--actor", "1", "--price", "500",
    ]);

    env.cmd()
        .args([
            "backjob",
            "file",
            "1",
            "--customer",
            "2",
            "--reason",
            "Still leaking",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filed backjob with ID: 1"));

    env.cmd()
        .args(["backjob", "review", "1", "--provider", "1"])
        .assert()
        .failure();

    env.cmd()
        .args(["backjob", "review", "1", "--provider", "1", "--approve"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reviewed backjob with ID: 1"))
        .stdout(predicate::str::contains("status: approved"));

    env.cmd()
        .args(["appt", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepted"));

    env.cmd()
        .args(["backjob", "list", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Still leaking"));
}

#[test]
fn test_cli_profiles_and_nearby() {
    let env = CliEnv::new();

    env.cmd()
        .args([
            "profile",
            "upsert",
            "1",
            "Alice Reyes",
            "--email",
            "alice@example.com",
            "--lat",
            "14.5995",
            "--lon",
            "120.9842",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Alice Reyes (ID: 1)"))
        .stdout(predicate::str::contains("Location: 14.59950, 120.98420"));

    env.run(&[
        "profile",
        "upsert",
        "4",
        "Dana Lim",
        "--lat",
        "-33.8688",
        "--lon",
        "151.2093",
    ]);

    env.cmd()
        .args(["profile", "nearby", "14.6760", "121.0437"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No providers nearby."));

    env.run(&["slot", "add", "1", "monday", "09:00", "10:00"]);
    env.run(&["slot", "add", "4", "monday", "09:00", "10:00"]);

    env.cmd()
        .args(["profile", "nearby", "14.6760", "121.0437", "--radius", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice Reyes"))
        .stdout(predicate::str::contains("Dana Lim").not());

    env.cmd()
        .args(["profile", "show", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[NOT_FOUND]"));
}

#[test]
fn test_cli_records_penalties_before_exiting() {
    let env = CliEnv::new().with_monday_slot();
    env.run(&["slot", "add", "1", "monday", "13:00", "14:00"]);
    env.run(&["book", "2", "1", MONDAY, "09:00", "--service", "100"]);
    env.run(&["book", "2", "1", MONDAY, "13:00", "--service", "100"]);

    // each cancel is its own process, detection must finish inside it
    env.run(&["appointment", "cancel", "1", "--actor", "2"]);
    env.run(&["appointment", "cancel", "2", "--actor", "2"]);

    env.cmd()
        .args(["penalty", "list", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "same_day_cancellations on appointment 2",
        ));
}

#[test]
fn test_cli_penalties_empty() {
    let env = CliEnv::new();

    env.cmd()
        .args(["penalty", "list", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No penalties recorded."));
}

#[test]
fn test_cli_rejects_unknown_config_fields() {
    let env = CliEnv::new();
    std::fs::write(&env.config, r#"{"cutoff": 12}"#).unwrap();

    env.cmd()
        .args(["slot", "list", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
