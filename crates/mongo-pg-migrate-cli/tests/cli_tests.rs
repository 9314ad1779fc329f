//! CLI integration tests for mongo-pg-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for various error conditions.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the mongo-pg-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("mongo-pg-migrate").unwrap()
}

const SAMPLE_CONFIG: &str = r#"
source:
  dir: ./export
target:
  host: localhost
  database: blog
  user: postgres
  password: secret
collections:
  - collection: posts
    table: posts
    foreign_keys:
      author: users
  - collection: users
    table: users
"#;

fn write_config(dir: &std::path::Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("migration.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_run_subcommand_help() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mongo-pg-migrate"));
}

#[test]
fn test_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["--config", dir.path().join("nope.yaml").to_str().unwrap()])
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_validate_accepts_good_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), SAMPLE_CONFIG);
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"));
}

#[test]
fn test_validate_rejects_unknown_reference() {
    let bad = r#"
source:
  dir: ./export
target:
  host: localhost
  database: blog
  user: postgres
  password: secret
collections:
  - collection: posts
    table: posts
    foreign_keys:
      author: ghosts
"#;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), bad);
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .arg("validate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("ghosts"));
}

#[test]
fn test_plan_prints_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), SAMPLE_CONFIG);
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. users"))
        .stdout(predicate::str::contains("2. posts"));
}

#[test]
fn test_dry_run_matches_plan() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), SAMPLE_CONFIG);
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration order"));
}

#[test]
fn test_cyclic_config_fails_plan() {
    let cyclic = r#"
source:
  dir: ./export
target:
  host: localhost
  database: blog
  user: postgres
  password: secret
collections:
  - collection: a
    table: a
    foreign_keys:
      other: b
  - collection: b
    table: b
    foreign_keys:
      other: a
"#;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), cyclic);
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .arg("plan")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cycle"));
}
