//! Integration tests for the liftplan binary.
//!
//! These tests verify end-to-end behavior including:
//! - Exercise validation and duplicate detection
//! - Plan creation against the library
//! - Session start, snapshotting and completion
//! - CSV rollup of the session log

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("liftplan"))
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn read_library(data_dir: &Path) -> Value {
    let contents = fs::read_to_string(data_dir.join("library.json")).expect("library exists");
    serde_json::from_str(&contents).expect("library is valid JSON")
}

fn add_exercise(data_dir: &Path, value: &Value) -> String {
    let file = write_json(data_dir, "exercise.json", value);
    cli()
        .args(["exercise", "add", "--file"])
        .arg(&file)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    let library = read_library(data_dir);
    let title = value["title"].as_str().unwrap().trim();
    library["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["title"] == title)
        .and_then(|e| e["id"].as_str())
        .expect("exercise stored")
        .to_string()
}

fn add_plan(data_dir: &Path, value: &Value) -> String {
    let file = write_json(data_dir, "plan.json", value);
    cli()
        .args(["plan", "add", "--file"])
        .arg(&file)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added plan"));

    let library = read_library(data_dir);
    library["plans"]
        .as_array()
        .unwrap()
        .last()
        .and_then(|p| p["id"].as_str())
        .expect("plan stored")
        .to_string()
}

fn squat() -> Value {
    json!({
        "title": "Przysiady z obciążeniem",
        "type": "Main Workout",
        "part": "Legs",
        "series": 4,
        "reps": 8,
        "rest_in_between_seconds": 90
    })
}

fn jumping_jacks() -> Value {
    json!({
        "title": "Pajacyki",
        "type": "Warm-up",
        "part": "Legs",
        "series": 1,
        "duration_seconds": 60,
        "rest_after_series_seconds": 0
    })
}

/// Library with two exercises and one plan; returns the plan id
fn seed_plan(data_dir: &Path) -> String {
    let squat_id = add_exercise(data_dir, &squat());
    let jacks_id = add_exercise(data_dir, &jumping_jacks());
    add_plan(
        data_dir,
        &json!({
            "name": "Nogi A",
            "exercises": [
                {
                    "exercise": {"source": "library", "exercise_id": squat_id},
                    "section_type": "Main Workout",
                    "section_order": 1,
                    "planned_reps": 10
                },
                {
                    "exercise": {"source": "library", "exercise_id": jacks_id},
                    "section_type": "Warm-up",
                    "section_order": 1
                }
            ]
        }),
    )
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Workout plan builder and session tracker",
        ));
}

#[test]
fn test_exercise_add_and_list() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    add_exercise(data_dir, &squat());

    cli()
        .args(["exercise", "list", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Przysiady z obciążeniem"))
        .stdout(predicate::str::contains("4 x 8 reps"));
}

#[test]
fn test_exercise_check_reports_every_violation() {
    let temp_dir = setup_test_dir();
    let file = write_json(
        temp_dir.path(),
        "bad.json",
        &json!({
            "title": "Bad",
            "type": "Main Workout",
            "part": "Core",
            "series": 0,
            "reps": 10,
            "duration_seconds": 30
        }),
    );

    cli()
        .args(["exercise", "check", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Exactly one of reps or duration_seconds must be provided",
        ))
        .stderr(predicate::str::contains(
            "At least one of rest_in_between_seconds or rest_after_series_seconds must be provided",
        ))
        .stderr(predicate::str::contains("series must be greater than zero"));
}

#[test]
fn test_exercise_check_accepts_valid_file() {
    let temp_dir = setup_test_dir();
    let file = write_json(temp_dir.path(), "ok.json", &squat());

    cli()
        .args(["exercise", "check", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercise is valid"));
}

#[test]
fn test_duplicate_title_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    add_exercise(data_dir, &squat());

    let mut duplicate = squat();
    duplicate["title"] = json!("  PRZYSIADY  Z  OBCIAZENIEM ");
    let file = write_json(data_dir, "dup.json", &duplicate);

    cli()
        .args(["exercise", "add", "--file"])
        .arg(&file)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let library = read_library(data_dir);
    assert_eq!(library["exercises"].as_array().unwrap().len(), 1);
}

#[test]
fn test_exercise_find_by_title() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    add_exercise(data_dir, &squat());

    cli()
        .args(["exercise", "find", "  przysiady   Z obciążeniem"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Przysiady z obciążeniem"));

    cli()
        .args(["exercise", "find", "nothing like it"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure();
}

#[test]
fn test_exercise_update_and_remove() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let id = add_exercise(data_dir, &squat());

    let patch = write_json(data_dir, "patch.json", &json!({"reps": null, "duration_seconds": 45}));
    cli()
        .args(["exercise", "update", "--id", id.as_str(), "--file"])
        .arg(&patch)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    let library = read_library(data_dir);
    let stored = &library["exercises"][0];
    assert_eq!(stored["duration_seconds"], 45);
    assert!(stored["reps"].is_null());

    cli()
        .args(["exercise", "remove", "--id", id.as_str()])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    let library = read_library(data_dir);
    assert!(library["exercises"].as_array().unwrap().is_empty());
}

#[test]
fn test_plan_rejects_unknown_exercise() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let file = write_json(
        data_dir,
        "plan.json",
        &json!({
            "name": "Broken",
            "exercises": [{
                "exercise": {"source": "library", "exercise_id": "00000000-0000-0000-0000-000000000001"},
                "section_type": "Warm-up",
                "section_order": 1
            }]
        }),
    );

    cli()
        .args(["plan", "add", "--file"])
        .arg(&file)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist in the library"));
}

#[test]
fn test_session_start_orders_sections() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let plan_id = seed_plan(data_dir);

    cli()
        .args(["session", "start", "--plan", plan_id.as_str()])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Pajacyki"))
        .stdout(predicate::str::contains("2. Przysiady z obciążeniem"))
        .stdout(predicate::str::contains("10 reps"));

    let library = read_library(data_dir);
    let session = &library["active_session"];
    assert_eq!(session["status"], "in_progress");
    assert_eq!(session["plan_name_at_time"], "Nogi A");
    assert_eq!(session["exercises"][0]["position"], 1);
    assert_eq!(session["exercises"][0]["section_type"], "Warm-up");
    assert_eq!(session["exercises"][1]["planned_reps"], 10);
    assert_eq!(session["exercises"][1]["planned_rest_seconds"], 90);
}

#[test]
fn test_second_session_start_refused() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let plan_id = seed_plan(data_dir);

    cli()
        .args(["session", "start", "--plan", plan_id.as_str()])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .args(["session", "start", "--plan", plan_id.as_str()])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in progress"));
}

#[test]
fn test_complete_logs_session_and_rollup_writes_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let plan_id = seed_plan(data_dir);

    cli()
        .args(["session", "start", "--plan", plan_id.as_str()])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .args(["session", "complete", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));

    let wal_path = data_dir.join("wal/sessions.wal");
    let wal_content = fs::read_to_string(&wal_path).expect("Failed to read session log");
    assert_eq!(wal_content.lines().count(), 1);
    assert!(wal_content.contains("\"status\":\"completed\""));

    let library = read_library(data_dir);
    assert!(library["active_session"].is_null());

    cli()
        .args(["rollup", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 1 sessions"));

    let csv_content = fs::read_to_string(data_dir.join("history.csv")).unwrap();
    // header + one row per session exercise
    assert_eq!(csv_content.lines().count(), 3);
    assert!(csv_content.contains("Pajacyki"));
}

#[test]
fn test_failed_log_append_keeps_session_active() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let plan_id = seed_plan(data_dir);

    cli()
        .args(["session", "start", "--plan", plan_id.as_str()])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    // A plain file where the log directory should be makes the append fail
    fs::write(data_dir.join("wal"), "not a directory").unwrap();

    cli()
        .args(["session", "complete", "--data-dir"])
        .arg(data_dir)
        .assert()
        .failure();

    let library = read_library(data_dir);
    assert_eq!(library["active_session"]["status"], "in_progress");
    assert_eq!(library["active_session"]["plan_name_at_time"], "Nogi A");

    // Once the log is writable again the same session completes
    fs::remove_file(data_dir.join("wal")).unwrap();
    cli()
        .args(["session", "complete", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success();

    let wal_content = fs::read_to_string(data_dir.join("wal/sessions.wal")).unwrap();
    assert_eq!(wal_content.lines().count(), 1);
    assert!(read_library(data_dir)["active_session"].is_null());
}

#[test]
fn test_help_works_with_broken_config() {
    let config_home = setup_test_dir();
    let config_dir = config_home.path().join("liftplan");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[logging\nlevel = ").unwrap();

    cli()
        .env("XDG_CONFIG_HOME", config_home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout plan builder"));

    cli()
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["plan", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}

#[test]
fn test_session_show_without_session() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["session", "show", "--data-dir"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No session in progress"));
}

#[test]
fn test_rollup_without_log() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["rollup", "--data-dir"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}
