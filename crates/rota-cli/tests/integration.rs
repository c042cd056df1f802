#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use rota_core::rotation::{RedbRotationStore, RotationEntry, RotationStore};
use tempfile::TempDir;

fn rota(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rota").unwrap();
    cmd.current_dir(dir.path())
        .env("ROTA_CONFIG", dir.path().join("rota.yaml"))
        .env("ROTA_DB", dir.path().join("rota.db"))
        .env_remove("ROTA_PORT")
        .env_remove("ROTA_SERVER");
    cmd
}

fn seed(dir: &TempDir, entries: &[(&str, i64)]) {
    let store = RedbRotationStore::open(&dir.path().join("rota.db")).unwrap();
    for (user, ts) in entries {
        store.put(&RotationEntry::new(*user, *ts)).unwrap();
    }
}

// ---------------------------------------------------------------------------
// rota roster
// ---------------------------------------------------------------------------

#[test]
fn roster_on_empty_db_explains_how_to_start() {
    let dir = TempDir::new().unwrap();
    rota(&dir)
        .arg("roster")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nobody in the rotation yet"));
}

#[test]
fn roster_lists_longest_waiting_first() {
    let dir = TempDir::new().unwrap();
    seed(
        &dir,
        &[("@carol", 1_706_745_600_000), ("@alice", 1_704_067_200_000)],
    );

    let output = rota(&dir).arg("roster").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let alice = stdout.find("@alice").expect("alice listed");
    let carol = stdout.find("@carol").expect("carol listed");
    assert!(alice < carol, "expected @alice before @carol:\n{stdout}");
    assert!(stdout.contains("2024-01-01"));
    assert!(stdout.contains("2024-02-01"));
}

#[test]
fn roster_json_uses_last_delivered_attribute() {
    let dir = TempDir::new().unwrap();
    seed(&dir, &[("@alice", 5)]);

    let output = rota(&dir).args(["roster", "--json"]).assert().success();
    let value: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{ "user": "@alice", "lastDelivered": 5 }])
    );
}

// ---------------------------------------------------------------------------
// rota config
// ---------------------------------------------------------------------------

#[test]
fn config_show_redacts_secrets() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("rota.yaml"),
        "secret:\n  kind: plain\n  token: hunter2\n",
    )
    .unwrap();

    rota(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn config_validate_warns_on_defaults() {
    let dir = TempDir::new().unwrap();
    rota(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning: no secret configured"));
}

#[test]
fn config_validate_fails_on_bad_selection_url() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("rota.yaml"),
        "selection:\n  url: ftp://example.com\n",
    )
    .unwrap();

    rota(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config has errors"));
}

#[test]
fn malformed_config_reports_path() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("rota.yaml"), "server: [not, a, map]\n").unwrap();

    rota(&dir)
        .arg("roster")
        .assert()
        .failure()
        .stderr(predicate::str::contains("rota.yaml"));
}

// ---------------------------------------------------------------------------
// rota roster while the server holds the database
// ---------------------------------------------------------------------------

fn write_plain_config(dir: &TempDir, token: &str) -> rota_core::config::Config {
    let yaml = format!(
        "store:\n  path: {}\nsecret:\n  kind: plain\n  token: {token}\n",
        dir.path().join("rota.db").display()
    );
    std::fs::write(dir.path().join("rota.yaml"), &yaml).unwrap();
    serde_yaml::from_str(&yaml).unwrap()
}

#[test]
fn roster_reads_through_running_server_when_db_is_locked() {
    let dir = TempDir::new().unwrap();
    seed(&dir, &[("@alice", 5)]);
    let config = write_plain_config(&dir, "tok");

    let rt = tokio::runtime::Runtime::new().unwrap();
    let listener = rt
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let base = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
    rt.spawn(async move { rota_server::serve_on(&config, listener).await });

    let healthz = format!("{base}/healthz");
    let ready = (0..100).any(|_| {
        std::thread::sleep(std::time::Duration::from_millis(50));
        ureq::get(&healthz).call().is_ok()
    });
    assert!(ready, "server did not come up");

    let output = rota(&dir)
        .args(["roster", "--json", "--server", &base])
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{ "user": "@alice", "lastDelivered": 5 }])
    );
}

#[test]
fn roster_explains_lock_when_server_unreachable() {
    let dir = TempDir::new().unwrap();
    write_plain_config(&dir, "tok");
    let _held = RedbRotationStore::open(&dir.path().join("rota.db")).unwrap();

    rota(&dir)
        .args(["roster", "--server", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is held by a running server"))
        .stderr(predicate::str::contains("--server"));
}
