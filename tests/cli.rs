//! Command-line tests for the stockledger binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SECRET: &str = "cli-test-secret";

/// A data directory with cheap key derivation so each run stays fast
fn setup() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let settings = serde_json::json!({
        "token_key": {
            "salt": "cli-test-salt",
            "memory_cost": 64,
            "time_cost": 1,
            "parallelism": 1
        }
    });
    std::fs::write(
        temp_dir.path().join("config.json"),
        serde_json::to_string_pretty(&settings).unwrap(),
    )
    .unwrap();
    temp_dir
}

fn stockledger(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stockledger").unwrap();
    cmd.env("STOCKLEDGER_DATA_DIR", dir.path())
        .env("STOCKLEDGER_SECRET", SECRET)
        .env_remove("STOCKLEDGER_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn issue(dir: &TempDir, username: &str, role: &str) -> String {
    let output = stockledger(dir)
        .args(["token", "issue", username, "--role", role])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn config_shows_paths() {
    let dir = setup();
    stockledger(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("history.jsonl"));
}

#[test]
fn item_commands_require_a_token() {
    let dir = setup();
    stockledger(&dir)
        .args(["item", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unauthorized"));
}

#[test]
fn garbage_token_is_unauthorized() {
    let dir = setup();
    stockledger(&dir)
        .args(["--token", "not-a-token", "item", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unauthorized"));
}

#[test]
fn token_issue_rejects_unknown_role() {
    let dir = setup();
    stockledger(&dir)
        .args(["token", "issue", "eve", "--role", "root"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid role"));
}

#[test]
fn whoami_reports_token_identity() {
    let dir = setup();
    let token = issue(&dir, "mia", "manager");

    stockledger(&dir)
        .args(["--token", &token, "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::diff("mia (manager)\n"));

    stockledger(&dir)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unauthorized"));
}

#[test]
fn viewer_cannot_create() {
    let dir = setup();
    let token = issue(&dir, "vera", "viewer");

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &token)
        .args(["item", "create", "A1", "Bolt", "--qty", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Forbidden"));
}

#[test]
fn manager_workflow_with_history_export() {
    let dir = setup();
    let manager = issue(&dir, "mia", "manager");
    let admin = issue(&dir, "ada", "admin");

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["item", "create", "A1", "Bolt", "--qty", "5", "--location", "Shelf 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created item: Bolt (A1)"));

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["item", "update", "1", "--qty", "8"])
        .assert()
        .success();

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["item", "create", "A1", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["item", "update", "1", "--qty", "-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["item", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Forbidden"));

    stockledger(&dir)
        .args(["--token", &admin, "item", "delete", "1"])
        .assert()
        .success();

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["history", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qty: 5 -> 8"));

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["history", "show", "1", "--plain", "--action", "delete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DELETE item 1 by ada (admin)"));

    let output = stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["history", "export", "1", "--no-changes"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "changed_at,action,actor,actor_role,changes");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].ends_with(",create,mia,manager,"));
    assert!(lines[2].ends_with(",update,mia,manager,"));
    assert!(lines[3].ends_with(",delete,ada,admin,"));
}

#[test]
fn history_export_to_file() {
    let dir = setup();
    let manager = issue(&dir, "mia", "manager");
    let out = dir.path().join("history.csv");

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["item", "create", "A1", "Bolt"])
        .assert()
        .success();

    stockledger(&dir)
        .env("STOCKLEDGER_TOKEN", &manager)
        .args(["history", "export", "1", "--action", "create", "--output"])
        .arg(&out)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(contents.starts_with("changed_at,action,actor,actor_role,changes\n"));
    assert!(contents.contains("create,mia,manager"));
}
