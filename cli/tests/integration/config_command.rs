//! Integration tests for `appctl config` command.
//!
//! All filesystem-touching tests set `APPCTL_CONFIG` to a temp path so they
//! never read or write `~/.appctl/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn appctl() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("appctl"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

// ---------------------------------------------------------------------------
// Subcommand registration
// ---------------------------------------------------------------------------

#[test]
fn test_config_help_shows_show_and_set_subcommands() {
    appctl()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

// ---------------------------------------------------------------------------
// `appctl config show`
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_without_file_reports_unset_values() {
    let (_dir, path) = temp_config_path();
    appctl()
        .args(["config", "show"])
        .env("APPCTL_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"))
        .stdout(predicate::str::contains(path.as_str()));
}

#[test]
fn test_config_show_redacts_token() {
    let (dir, path) = temp_config_path();
    std::fs::write(dir.path().join("config.yaml"), "token: s3cret\n").expect("write");
    appctl()
        .args(["config", "show"])
        .env("APPCTL_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("s3cret").not());
}

#[test]
fn test_config_show_invalid_yaml_fails() {
    let (dir, path) = temp_config_path();
    std::fs::write(dir.path().join("config.yaml"), "server: [unclosed\n").expect("write");
    appctl()
        .args(["config", "show"])
        .env("APPCTL_CONFIG", &path)
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// `appctl config set`
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_then_show_round_trip() {
    let (_dir, path) = temp_config_path();
    appctl()
        .args(["config", "set", "ssh", "/usr/bin/ssh"])
        .env("APPCTL_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Set ssh = /usr/bin/ssh"));

    appctl()
        .args(["config", "show"])
        .env("APPCTL_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("/usr/bin/ssh"));
}

#[test]
fn test_config_set_server_trims_trailing_slash() {
    let (dir, path) = temp_config_path();
    appctl()
        .args(["config", "set", "server", "https://broker.example.com/"])
        .env("APPCTL_CONFIG", &path)
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("config.yaml")).expect("read");
    assert!(written.contains("server: https://broker.example.com\n"), "got: {written}");
}

#[test]
fn test_config_set_unknown_key_fails() {
    let (_dir, path) = temp_config_path();
    appctl()
        .args(["config", "set", "colour", "blue"])
        .env("APPCTL_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting: colour"));
}

#[test]
fn test_config_set_invalid_namespace_fails() {
    let (_dir, path) = temp_config_path();
    appctl()
        .args(["config", "set", "namespace", "a/b"])
        .env("APPCTL_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for namespace"));
}
