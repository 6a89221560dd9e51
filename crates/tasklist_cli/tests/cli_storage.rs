use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .args(args)
        .env("TASKLIST_STORE_PATH", store)
        .env("TASKLIST_CONFIG_PATH", store.with_file_name("config.json"))
        .output()
        .expect("failed to run tasklist")
}

#[test]
fn corrupt_file_aborts_by_default_and_is_kept() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tasks.json");
    std::fs::write(&store, "[{ not json").unwrap();

    let output = run(&store, &["add", "Buy milk"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: corrupt_storage"));
    assert!(stderr.contains("left untouched"));
    assert_eq!(std::fs::read_to_string(&store).unwrap(), "[{ not json");
}

#[test]
fn corrupt_file_start_empty_moves_file_aside() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tasks.json");
    std::fs::write(&store, "[{ not json").unwrap();

    let output = run(
        &store,
        &["--config-override", "on_corrupt=start_empty", "add", "Buy milk"],
    );

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WARNING"));
    assert!(stderr.contains("moved to"));

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("tasks.json.corrupt-")
        })
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(backups[0].path()).unwrap(),
        "[{ not json"
    );

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(stored[0]["id"], 1);
}

#[test]
fn corrupt_policy_can_come_from_config_file() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tasks.json");
    std::fs::write(&store, "not json at all").unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "on_corrupt": "start_empty" }"#,
    )
    .unwrap();

    let output = run(&store, &["list"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No tasks found."));
}

#[test]
fn invalid_config_file_falls_back_with_warning() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tasks.json");
    std::fs::write(dir.path().join("config.json"), "{ broken").unwrap();

    let output = run(&store, &["list"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("WARNING: using default configuration"));
}

#[test]
fn empty_file_loads_as_empty_list() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tasks.json");
    std::fs::write(&store, "").unwrap();

    let output = run(&store, &["add", "Buy milk"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("(1)"));
}

#[test]
fn reads_files_with_naive_timestamps() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tasks.json");
    let legacy = serde_json::json!([
        {
            "id": 3,
            "title": "Legacy task",
            "description": "",
            "completed": false,
            "created_at": "2024-05-01T09:30:00.123456",
            "completed_at": null
        }
    ]);
    std::fs::write(&store, legacy.to_string()).unwrap();

    let output = run(&store, &["add", "New task"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added task: New task (4)"));
}

#[test]
fn unknown_config_override_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tasks.json");

    let output = run(&store, &["--config-override", "colour=red", "list"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown config field"));
}
