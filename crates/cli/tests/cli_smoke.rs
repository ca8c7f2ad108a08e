use assert_cmd::Command;
use predicates::prelude::*;

fn modsync() -> Command {
    let mut cmd = Command::cargo_bin("modsync").unwrap();
    cmd.env_remove("MODSYNC_SERVER");
    cmd
}

#[test]
fn help_lists_subcommands() {
    modsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("plan"))
                .and(predicate::str::contains("sync")),
        );
}

#[test]
fn missing_server_is_an_error() {
    modsync()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MODSYNC_SERVER"));
}

#[test]
fn non_http_server_is_rejected() {
    modsync()
        .args(["--server", "ftp://packages.example.com", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http"));
}

#[test]
fn unreachable_server_falls_back_to_the_local_index() {
    let temp = tempfile::TempDir::new().unwrap();

    // Nothing listening on this port and an empty local index: sync must
    // fail, naming the local index as the exhausted fallback.
    modsync()
        .args(["--server", "http://127.0.0.1:9"])
        .args(["--data-dir", temp.path().to_str().unwrap()])
        .args(["sync", "vanilla-plus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("local index"));
}

#[test]
fn list_reports_no_packages_offline() {
    let temp = tempfile::TempDir::new().unwrap();

    modsync()
        .args(["--server", "http://127.0.0.1:9"])
        .args(["--data-dir", temp.path().to_str().unwrap()])
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("no packages known"));
}
