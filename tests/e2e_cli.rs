//! CLI end-to-end tests
//!
//! Tests for the vodforge command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the vodforge binary
#[allow(deprecated)]
fn vodforge_cmd() -> Command {
    Command::cargo_bin("vodforge").unwrap()
}

/// Write a config pointing the database and media root into `dir`.
fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.json");
    let json = serde_json::json!({
        "media_root": dir.join("media"),
        "db_path": dir.join("vodforge.db"),
    });
    fs::write(&path, json.to_string()).unwrap();
    path
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = vodforge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = vodforge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vodforge"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = vodforge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "vodforge {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = vodforge_cmd();
    cmd.arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").and(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_validate_defaults() {
    let mut cmd = vodforge_cmd();
    cmd.env_remove("RUST_LOG")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("1920x1080 @ 5000k"));
}

#[test]
fn test_cli_validate_reports_warnings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"transcode": {"tiers": [{"width": 641, "height": 360, "bitrate_kbps": 1000}]}}"#,
    )
    .unwrap();

    let mut cmd = vodforge_cmd();
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("warning"));
}

#[test]
fn test_cli_validate_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let mut cmd = vodforge_cmd();
    cmd.arg("validate").arg(&path).assert().failure();
}

#[test]
fn test_cli_add_missing_source() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    let mut cmd = vodforge_cmd();
    cmd.arg("--config")
        .arg(&config)
        .args(["add", "/nonexistent/clip.mov"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_add_then_list_jobs() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let source = dir.path().join("clip.mov");
    fs::write(&source, b"video").unwrap();

    vodforge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("add")
        .arg(&source)
        .args(["--title", "My Clip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Video 1 created: My Clip"))
        .stdout(predicate::str::contains("Transcode job"));

    vodforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["jobs", "--status", "queued"])
        .assert()
        .success()
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("transcode"));
}

#[test]
fn test_cli_jobs_rejects_unknown_status() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    vodforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["jobs", "--status", "exploded"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown job status"));
}

#[test]
fn test_cli_remove_missing_video() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    vodforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["remove", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
