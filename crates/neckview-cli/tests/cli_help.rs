use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("neckview")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--server"));
}

#[test]
fn test_list_help_shows_json_flag() {
    cargo_bin_cmd!("neckview")
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("neckview")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn test_dashboard_requires_terminal() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("neckview")
        .env("NECKVIEW_HOME", dir.path())
        .args(["--server", "http://127.0.0.1:9/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("neckview list"));
}
