//! Integration tests for the plansync binary.
//!
//! These tests verify end-to-end behavior including:
//! - Workout compilation output
//! - Dry-run plan scheduling and the JSON report
//! - Exit codes for failed sessions and bad input

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("plansync"))
}

/// Empty config so tests never read the user's settings
fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, "").expect("Failed to write config");
    path
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write file");
    path
}

const EASY_RUN: &str = r#"{
    "name": "Easy Run",
    "type": "running",
    "steps": [
        {"stepName": "Warmup", "stepType": "warmup", "endConditionType": "time",
         "stepDuration": 600},
        {"stepName": "Run", "stepType": "interval", "endConditionType": "distance",
         "stepDistance": 5, "distanceUnit": "km",
         "target": {"type": "pace", "value": 6.0, "unit": "min_per_km"}},
        {"stepName": "Cooldown", "stepType": "cooldown", "endConditionType": "time",
         "stepDuration": 300}
    ]
}"#;

const WEEK_PLAN: &str = r#"{
    "title": "Base Week",
    "sessions": [
        {"date": "2025-01-06", "day": "Monday", "session": "Easy Run", "description": "easy",
         "workout": {"name": "", "type": "running", "steps": [
            {"stepType": "interval", "endConditionType": "time", "stepDuration": 1800}
         ]}},
        {"date": "2025-01-07", "day": "Tuesday", "session": "Rest", "description": "Rest day"},
        {"date": "2025-01-08", "day": "Wednesday", "session": "Intervals", "description": "4x4",
         "workout": {"name": "Intervals", "type": "running", "steps": [
            {"stepType": "repeat", "numberOfIterations": 4, "steps": [
                {"stepType": "interval", "endConditionType": "time", "stepDuration": 240},
                {"stepType": "recovery", "endConditionType": "time", "stepDuration": 180}
            ]}
         ]}}
    ]
}"#;

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Compile structured workouts and schedule training plans",
        ));
}

#[test]
fn test_compile_prints_payload() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let workout = write_file(temp_dir.path(), "easy.json", EASY_RUN);

    let output = cli()
        .arg("--config")
        .arg(&config)
        .arg("compile")
        .arg(&workout)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: Value = serde_json::from_slice(&output).expect("stdout is JSON");
    assert_eq!(payload["workoutName"], "Easy Run");
    assert_eq!(payload["sportType"]["sportTypeKey"], "running");

    let steps = payload["workoutSegments"][0]["workoutSteps"]
        .as_array()
        .unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[1]["endConditionValue"], 5000);
    assert_eq!(steps[1]["targetType"]["workoutTargetTypeKey"], "pace.zone");
    assert_eq!(steps[2]["stepOrder"], 3);
}

#[test]
fn test_compile_rejects_unknown_sport() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let workout = write_file(
        temp_dir.path(),
        "row.json",
        r#"{"name": "Row", "type": "rowing", "steps": []}"#,
    );

    cli()
        .arg("--config")
        .arg(&config)
        .arg("compile")
        .arg(&workout)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported sport type: rowing"));
}

#[test]
fn test_dry_run_schedule_writes_report() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let plan = write_file(temp_dir.path(), "plan.json", WEEK_PLAN);
    let report = temp_dir.path().join("report.json");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("schedule")
        .arg(&plan)
        .arg("--dry-run")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN MODE"))
        .stdout(predicate::str::contains("Newly scheduled: 2"))
        .stdout(predicate::str::contains("Rest days: 1"))
        .stdout(predicate::str::contains("Validation Summary").not());

    let report: Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report written")).unwrap();
    assert_eq!(report["title"], "Base Week");
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["results"].as_array().unwrap().len(), 3);
    assert_eq!(report["results"][0]["workout_id"], "dry-run-workout-id");
    assert_eq!(report["results"][1]["error"], "Rest day - skipped");
    assert_eq!(report["summary"]["failed"], 0);
}

#[test]
fn test_start_date_shifts_plan() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let plan = write_file(temp_dir.path(), "plan.json", WEEK_PLAN);

    cli()
        .arg("--config")
        .arg(&config)
        .arg("schedule")
        .arg(&plan)
        .arg("--dry-run")
        .arg("--start-date")
        .arg("2025-02-03")
        .assert()
        .success()
        .stdout(predicate::str::contains("Start Date:     2025-02-03"))
        .stdout(predicate::str::contains("Scheduled 2025-02-05: Intervals"));
}

#[test]
fn test_failed_session_exits_nonzero() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let plan = write_file(
        temp_dir.path(),
        "plan.json",
        r#"{"title": "Loose", "sessions": [
            {"date": "2025-01-06", "session": "Fartlek", "description": "10 x 1 min on, 1 min off"}
        ]}"#,
    );

    cli()
        .arg("--config")
        .arg(&config)
        .arg("schedule")
        .arg(&plan)
        .arg("--dry-run")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Failed 2025-01-06: Could not parse workout description",
        ))
        .stdout(predicate::str::contains("Failed: 1"));
}

#[test]
fn test_dry_run_upload() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let workout = write_file(temp_dir.path(), "easy.json", EASY_RUN);

    cli()
        .arg("--config")
        .arg(&config)
        .arg("upload")
        .arg(&workout)
        .arg("--date")
        .arg("2025-01-06")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("dry-run-workout-id"))
        .stdout(predicate::str::contains("dry-run-schedule-id"));
}

#[test]
fn test_calendar_rejects_bad_month() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("calendar")
        .arg("--year")
        .arg("2025")
        .arg("--month")
        .arg("13")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Month must be between 1 and 12, got 13"));
}

#[test]
fn test_missing_plan_file() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("schedule")
        .arg(temp_dir.path().join("missing.json"))
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = setup_test_dir();
    let config = write_file(temp_dir.path(), "bad.toml", "[scheduler]\nretry_attempts = 0\n");
    let workout = write_file(temp_dir.path(), "easy.json", EASY_RUN);

    cli()
        .arg("--config")
        .arg(&config)
        .arg("compile")
        .arg(&workout)
        .assert()
        .failure()
        .stderr(predicate::str::contains("retry_attempts"));
}
