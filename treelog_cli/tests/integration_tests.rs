//! Integration tests for the treelog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Formatting and file sink output
//! - Level suppression from config files
//! - Context substitution
//! - Configuration error reporting

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("treelog"))
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Hierarchical namespace logging emitter",
        ));
}

#[test]
fn test_formatted_line_written_to_file() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("app.log");

    cli()
        .arg("--file")
        .arg(&log_path)
        .arg("--logger")
        .arg("app.db")
        .arg("--level")
        .arg("warning")
        .arg("--format")
        .arg("{levelname}:{name}:{message}")
        .arg("disk at {pct}%")
        .arg("pct=87")
        .assert()
        .success();

    let contents = fs::read_to_string(&log_path).expect("Failed to read log");
    assert_eq!(contents, "WARNING:app.db:disk at 87%\n");
}

#[test]
fn test_default_sink_is_stderr() {
    cli()
        .arg("--logger")
        .arg("svc")
        .arg("hello")
        .assert()
        .success()
        .stderr(predicate::str::contains("INFO:svc:hello"));
}

#[test]
fn test_string_context_values() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("app.log");

    cli()
        .arg("--file")
        .arg(&log_path)
        .arg("user {user} logged in")
        .arg("user=ada")
        .assert()
        .success();

    let contents = fs::read_to_string(&log_path).expect("Failed to read log");
    assert!(contents.contains("user ada logged in"));
}

#[test]
fn test_missing_context_key_renders_verbatim() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("app.log");

    cli()
        .arg("--file")
        .arg(&log_path)
        .arg("value is {missing}")
        .assert()
        .success();

    let contents = fs::read_to_string(&log_path).expect("Failed to read log");
    assert!(contents.contains("value is {missing}"));
}

#[test]
fn test_config_file_level_suppresses_record() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("app.log");
    let config_path = temp_dir.path().join("logging.toml");
    fs::write(
        &config_path,
        format!(
            "filename = {:?}\nlevel = \"error\"\n",
            log_path.to_str().unwrap()
        ),
    )
    .expect("Failed to write config");

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("--level")
        .arg("info")
        .arg("quiet please")
        .assert()
        .success();

    // Handler was constructed (file exists) but the record was suppressed
    let contents = fs::read_to_string(&log_path).expect("Failed to read log");
    assert!(contents.is_empty());
}

#[test]
fn test_config_file_options_applied() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("app.log");
    let config_path = temp_dir.path().join("logging.toml");
    fs::write(
        &config_path,
        format!(
            "filename = {:?}\nformat = \"[{{levelname}}] {{message}}\"\n",
            log_path.to_str().unwrap()
        ),
    )
    .expect("Failed to write config");

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("--level")
        .arg("error")
        .arg("it broke")
        .assert()
        .success();

    let contents = fs::read_to_string(&log_path).expect("Failed to read log");
    assert_eq!(contents, "[ERROR] it broke\n");
}

#[test]
fn test_unknown_level_is_reported() {
    cli()
        .arg("--level")
        .arg("loud")
        .arg("hello")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log level"));
}

#[test]
fn test_unknown_formatter_field_is_reported() {
    cli()
        .arg("--format")
        .arg("{pid} {message}")
        .arg("hello")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown formatter field"));
}

#[test]
fn test_bad_logger_name_is_reported() {
    cli()
        .arg("--logger")
        .arg("app..db")
        .arg("hello")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty segment"));
}

#[test]
fn test_bad_context_argument_is_reported() {
    cli()
        .arg("hello")
        .arg("no-equals-sign")
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_truncate_filemode_replaces_contents() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("app.log");
    fs::write(&log_path, "stale line\n").expect("Failed to seed log");

    cli()
        .arg("--file")
        .arg(&log_path)
        .arg("--filemode")
        .arg("truncate")
        .arg("fresh")
        .assert()
        .success();

    let contents = fs::read_to_string(&log_path).expect("Failed to read log");
    assert_eq!(contents, "INFO:root:fresh\n");
}
