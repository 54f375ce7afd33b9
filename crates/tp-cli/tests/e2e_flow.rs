//! End-to-end tests for the `tp` binary.
//!
//! Each test runs against a fresh home directory so the default config and
//! data locations never touch the real user's files.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn tp_binary() -> String {
    env!("CARGO_BIN_EXE_tp").to_string()
}

fn tp(home: &Path, args: &[&str]) -> Output {
    Command::new(tp_binary())
        .env("HOME", home)
        .env_remove("XDG_DATA_HOME")
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run tp")
}

fn tp_ok(home: &Path, args: &[&str]) -> String {
    let output = tp(home, args);
    assert!(
        output.status.success(),
        "tp {args:?} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_add_list_done_flow() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let first = tp_ok(home, &["add", "Write", "report"]).trim().to_string();
    let second = tp_ok(home, &["add", "Buy milk"]).trim().to_string();
    assert_ne!(first, second);

    let db_path = home.join(".local/share/tp/tp.db");
    assert!(db_path.exists(), "database should be created under HOME");

    let list = tp_ok(home, &["list"]);
    let titles: Vec<&str> = list.lines().collect();
    assert_eq!(titles.len(), 2);
    assert!(titles[0].ends_with("Buy milk"), "newest first: {list}");

    let done = tp_ok(home, &["done", &second[..8]]);
    assert_eq!(done.trim(), "Completed: Buy milk");

    let open = tp_ok(home, &["list"]);
    assert_eq!(open.lines().count(), 1);
    let all = tp_ok(home, &["list", "--all"]);
    assert_eq!(all.lines().count(), 2);
}

#[test]
fn test_edit_then_suggest_json() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let quick = tp_ok(home, &["add", "Quick fix"]).trim().to_string();
    let long = tp_ok(home, &["add", "Big refactor"]).trim().to_string();
    tp_ok(home, &["edit", &quick, "--estimate", "10", "--importance", "3"]);
    tp_ok(home, &["edit", &long, "--estimate", "240", "--energy", "high"]);

    let output = tp_ok(
        home,
        &["suggest", "--capacity", "low", "--minutes", "30", "--json"],
    );
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    let suggestions = value["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1, "only the quick fix fits: {output}");
    assert_eq!(suggestions[0]["task"]["id"], quick.as_str());

    // Nothing fits in 5 minutes, so every open task comes back
    let output = tp_ok(home, &["suggest", "--minutes", "5", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["suggestions"].as_array().unwrap().len(), 2);
}

#[test]
fn test_star_limit_and_today() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let ids: Vec<String> = (1..=4)
        .map(|i| tp_ok(home, &["add", &format!("task {i}")]).trim().to_string())
        .collect();
    for id in &ids[..3] {
        tp_ok(home, &["star", id]);
    }

    let refused = tp(home, &["star", &ids[3]]);
    assert!(!refused.status.success());
    assert!(String::from_utf8_lossy(&refused.stderr).contains("already 3 tasks starred"));

    let today = tp_ok(home, &["today"]);
    let priorities: Vec<&str> = today
        .lines()
        .skip(1)
        .take_while(|l| !l.is_empty())
        .collect();
    assert_eq!(priorities.len(), 3);
    assert!(priorities.iter().all(|l| l.starts_with('*')));
}

#[test]
fn test_free_uses_configured_calendar() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let calendar = home.join("calendar.json");
    std::fs::write(
        &calendar,
        r#"[{"title": "lunch", "start": "2030-01-01T12:00:00Z", "end": "2030-01-01T13:00:00Z"}]"#,
    )
    .unwrap();
    let config = home.join("tp.toml");
    std::fs::write(
        &config,
        format!("calendar_path = {:?}\n", calendar.display().to_string()),
    )
    .unwrap();

    let output = tp_ok(
        home,
        &[
            "--config",
            config.to_str().unwrap(),
            "free",
            "--start",
            "2030-01-01T09:00:00Z",
            "--end",
            "2030-01-01T17:00:00Z",
            "--events",
            "--json",
        ],
    );
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["accessGranted"], true);
    let minutes: Vec<i64> = value["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["durationMinutes"].as_i64().unwrap())
        .collect();
    assert_eq!(minutes, vec![180, 240]);
    assert_eq!(value["events"][0]["title"], "lunch");
}

#[test]
fn test_env_overrides_database_path() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("custom.db");

    let output = Command::new(tp_binary())
        .env("HOME", temp.path())
        .env("TP_DATABASE_PATH", &db_path)
        .args(["add", "Env task"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(db_path.exists());
}

#[test]
fn test_unknown_task_fails() {
    let temp = TempDir::new().unwrap();
    let output = tp(temp.path(), &["done", "does-not-exist"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("task not found"));
}
