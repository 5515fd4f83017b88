//! Integration tests for the `pomo` CLI.
//!
//! Each test creates a temp data directory, runs `pomo` as a subprocess,
//! and verifies stdout and/or file contents.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Run `pomo -D <dir> <args>` with a clean environment.
fn pomo(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pomo"))
        .arg("-D")
        .arg(dir)
        .args(args)
        .env_remove("POMO_DIR")
        .env_remove("POMO_LOG")
        .env_remove("OPENAI_API_KEY")
        .output()
        .expect("failed to run pomo")
}

/// Run and assert success, returning stdout.
fn pomo_ok(dir: &Path, args: &[&str]) -> String {
    let out = pomo(dir, args);
    assert!(
        out.status.success(),
        "pomo {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).unwrap()
}

fn titles(dir: &Path) -> Vec<String> {
    let json: Value = serde_json::from_str(&pomo_ok(dir, &["--json", "list"])).unwrap();
    json.as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

fn add_all(dir: &Path, titles: &[&str]) {
    for title in titles {
        pomo_ok(dir, &["add", title]);
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[test]
fn add_and_list_grouped_by_bucket() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let out = pomo_ok(dir, &["add", "Write report", "-d", "with **charts**"]);
    assert_eq!(out.trim(), "added 1. [ ] Write report +");
    pomo_ok(dir, &["add", "Buy milk", "-p", "A"]);

    let out = pomo_ok(dir, &["list"]);
    assert_eq!(
        out,
        "== A ==\n  1. [ ] Buy milk\n\n== C ==\n  2. [ ] Write report +\n"
    );

    // the store file is written in the data directory
    let raw = fs::read_to_string(dir.join("store.json")).unwrap();
    assert!(raw.contains("todos"));
}

#[test]
fn empty_board_lists_nothing() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(pomo_ok(tmp.path(), &["list"]).trim(), "no tasks");
    assert_eq!(titles(tmp.path()), Vec::<String>::new());
}

#[test]
fn blank_title_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let out = pomo(tmp.path(), &["add", "   "]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("error:"));
}

#[test]
fn toggle_and_filter() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["First", "Second"]);

    // newest first: 1 = Second, 2 = First
    assert_eq!(pomo_ok(dir, &["toggle", "2"]).trim(), "done: First");
    assert_eq!(pomo_ok(dir, &["list", "--done"]).trim(), "== C ==\n  2. [x] First");
    assert_eq!(
        pomo_ok(dir, &["list", "--pending"]).trim(),
        "== C ==\n  1. [ ] Second"
    );
    assert_eq!(pomo_ok(dir, &["toggle", "2"]).trim(), "reopened: First");
}

#[test]
fn show_renders_description() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    pomo_ok(dir, &["add", "Groceries", "-d", "* milk\n* eggs"]);

    let out = pomo_ok(dir, &["show", "1"]);
    assert!(out.starts_with("[ ] Groceries\n"));
    assert!(out.contains("priority: C"));
    assert!(out.contains("• milk"));
}

#[test]
fn unknown_task_ref_fails() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["Only"]);

    let out = pomo(dir, &["toggle", "9"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("error:"));
}

#[test]
fn rm_with_yes() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["Keep", "Drop"]);

    assert_eq!(pomo_ok(dir, &["rm", "1", "-y"]).trim(), "deleted: Drop");
    assert_eq!(titles(dir), vec!["Keep"]);
}

#[test]
fn priority_moves_task_between_buckets() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["Low", "High"]);

    assert_eq!(pomo_ok(dir, &["priority", "2", "A"]).trim(), "Low -> A");
    assert_eq!(titles(dir), vec!["Low", "High"]);

    let out = pomo(dir, &["priority", "1", "F"]);
    assert!(!out.status.success());
}

fn priority_of(dir: &Path, task: &str) -> String {
    let json: Value = serde_json::from_str(&pomo_ok(dir, &["--json", "show", task])).unwrap();
    json["priority"].as_str().unwrap().to_string()
}

#[test]
fn mv_and_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["one", "two", "three"]);
    assert_eq!(titles(dir), vec!["three", "two", "one"]);

    pomo_ok(dir, &["mv", "1", "--down"]);
    assert_eq!(titles(dir), vec!["two", "three", "one"]);

    // the top task of a bucket climbs into the bucket above, even an empty one
    let out = pomo_ok(dir, &["mv", "1", "--up"]);
    assert_eq!(out.trim(), "1. [ ] two");
    assert_eq!(priority_of(dir, "1"), "B");
    pomo_ok(dir, &["mv", "1", "--up"]);
    assert_eq!(priority_of(dir, "1"), "A");
    let out = pomo_ok(dir, &["mv", "1", "--up"]);
    assert_eq!(out.trim(), "two is already at the top");

    // order fills the shown slots, so tasks take the bucket they land in
    pomo_ok(dir, &["order", "3", "1"]);
    assert_eq!(titles(dir), vec!["one", "two", "three"]);
    assert_eq!(priority_of(dir, "1"), "A");
    assert_eq!(priority_of(dir, "2"), "C");

    // past the end of its bucket a task drops into the next one
    pomo_ok(dir, &["mv", "3", "--down", "--steps", "5"]);
    assert_eq!(titles(dir), vec!["one", "two", "three"]);
    assert_eq!(priority_of(dir, "3"), "E");
}

#[test]
fn order_across_buckets_is_visible() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["x", "y"]);
    pomo_ok(dir, &["priority", "1", "A"]);
    assert_eq!(titles(dir), vec!["y", "x"]);

    let out = pomo_ok(dir, &["order", "2", "1"]);
    assert_eq!(titles(dir), vec!["x", "y"]);
    assert!(out.starts_with("== A ==\n  1. [ ] x"));
    assert_eq!(priority_of(dir, "2"), "C");
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[test]
fn export_then_import_replace_and_merge() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["Alpha", "Beta"]);

    let export = dir.join("backup.json");
    let export_str = export.to_str().unwrap();
    let out = pomo_ok(dir, &["export", export_str]);
    assert!(out.starts_with("exported 2 tasks"));
    let json: Value = serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(json["tasks"].as_array().unwrap().len(), 2);

    pomo_ok(dir, &["rm", "1", "-y"]);
    assert_eq!(pomo_ok(dir, &["import", export_str, "--replace"]).trim(), "imported 2 tasks");
    assert_eq!(titles(dir), vec!["Beta", "Alpha"]);

    pomo_ok(dir, &["import", export_str, "--merge"]);
    assert_eq!(titles(dir), vec!["Beta", "Alpha", "Beta", "Alpha"]);

    // merged copies get their own ids
    let json: Value = serde_json::from_str(&pomo_ok(dir, &["--json", "list"])).unwrap();
    let mut ids: Vec<u64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn import_skips_invalid_records() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file = dir.join("mixed.json");
    fs::write(
        &file,
        r#"{"tasks": [
            {"id": 1, "title": "Good", "completed": false, "priority": "B"},
            {"id": 2, "title": ""},
            {"id": 3, "title": "Bad priority", "priority": "Z"}
        ]}"#,
    )
    .unwrap();

    let out = pomo_ok(dir, &["--json", "import", file.to_str().unwrap(), "--replace"]);
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["imported"], 1);
    assert_eq!(json["dropped"], 2);
    assert_eq!(json["mode"], "replace");
}

#[test]
fn import_rejects_garbage() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["Survivor"]);
    let file = dir.join("garbage.json");
    fs::write(&file, "not json").unwrap();

    let out = pomo(dir, &["import", file.to_str().unwrap(), "--replace"]);
    assert!(!out.status.success());
    assert_eq!(titles(dir), vec!["Survivor"]);
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

const REPLY: &str = "\
Looking at your list, the dentist call is quick and time-sensitive.

**Ranked priority list:**

1. **Call dentist** (takes five minutes)
2. Task 3: Write the report
3. Buy groceries

Hope this helps!
";

#[test]
fn suggest_from_file_applies_with_yes() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["Call dentist", "Buy groceries", "Write the report"]);
    assert_eq!(titles(dir), vec!["Write the report", "Buy groceries", "Call dentist"]);

    let reply = dir.join("reply.txt");
    fs::write(&reply, REPLY).unwrap();
    let out = pomo_ok(dir, &["suggest", "--from-file", reply.to_str().unwrap(), "--yes"]);
    assert!(out.contains("Suggested order (3 of 3 placed by the assistant):"));
    assert!(out.trim_end().ends_with("applied suggested order"));
    assert_eq!(titles(dir), vec!["Call dentist", "Write the report", "Buy groceries"]);

    // same reply again changes nothing
    let out = pomo_ok(dir, &["suggest", "--from-file", reply.to_str().unwrap(), "--yes"]);
    assert!(out.trim_end().ends_with("order unchanged"));
}

#[test]
fn suggest_across_buckets_reassigns_letters() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["Call dentist", "Buy groceries", "Write the report"]);
    pomo_ok(dir, &["priority", "2", "A"]);
    assert_eq!(titles(dir), vec!["Buy groceries", "Write the report", "Call dentist"]);

    let reply = dir.join("reply.txt");
    fs::write(&reply, REPLY).unwrap();
    let out = pomo_ok(dir, &["suggest", "--from-file", reply.to_str().unwrap(), "--yes"]);
    assert!(out.contains("== A ==\n  1. [ ] Call dentist\n== C ==\n  2. [ ] Write the report"));
    assert!(out.trim_end().ends_with("applied suggested order"));
    assert_eq!(titles(dir), vec!["Call dentist", "Write the report", "Buy groceries"]);
    assert_eq!(priority_of(dir, "1"), "A");
    assert_eq!(priority_of(dir, "3"), "C");
}

#[test]
fn suggest_json_without_yes_does_not_apply() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["Call dentist", "Buy groceries", "Write the report"]);
    let reply = dir.join("reply.txt");
    fs::write(&reply, REPLY).unwrap();

    let out = pomo_ok(dir, &["--json", "suggest", "--from-file", reply.to_str().unwrap()]);
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["applied"], false);
    assert_eq!(json["matched"], 3);
    assert_eq!(json["order"][0]["title"], "Call dentist");
    assert_eq!(titles(dir), vec!["Write the report", "Buy groceries", "Call dentist"]);
}

#[test]
fn suggest_without_list_leaves_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    add_all(dir, &["One", "Two"]);
    let reply = dir.join("reply.txt");
    fs::write(&reply, "I would just start with whatever feels easiest.").unwrap();

    let out = pomo(dir, &["suggest", "--from-file", reply.to_str().unwrap(), "--yes"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("could not determine order"));
    assert_eq!(titles(dir), vec!["Two", "One"]);
}

#[test]
fn suggest_needs_tasks_and_a_key() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let out = pomo(dir, &["suggest"]);
    assert!(!out.status.success());

    add_all(dir, &["One"]);
    let out = pomo(dir, &["suggest"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("OPENAI_API_KEY"));

    let prompt = pomo_ok(dir, &["suggest", "--dry-run"]);
    assert!(prompt.contains("Task 1: One"));
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[test]
fn timer_rejects_oversized_minutes() {
    let tmp = TempDir::new().unwrap();
    let out = pomo(tmp.path(), &["timer", "--work", "4294967295"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--work must be 1 to 1440 minutes"), "{stderr}");

    let out = pomo(tmp.path(), &["timer", "--break", "0"]);
    assert!(!out.status.success());
}

#[test]
fn theme_round_trip() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    assert_eq!(pomo_ok(dir, &["theme"]).trim(), "light");
    assert_eq!(pomo_ok(dir, &["theme", "dark"]).trim(), "dark");
    assert_eq!(pomo_ok(dir, &["theme"]).trim(), "dark");
    assert_eq!(pomo_ok(dir, &["theme", "toggle"]).trim(), "light");
}

#[test]
fn config_set_changes_insertion() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    assert_eq!(
        pomo_ok(dir, &["config", "set", "board.insertion", "back"]).trim(),
        "board.insertion = back"
    );
    let shown = pomo_ok(dir, &["config", "show"]);
    assert!(shown.contains("insertion = \"back\""));

    add_all(dir, &["first", "second"]);
    assert_eq!(titles(dir), vec!["first", "second"]);

    let out = pomo(dir, &["config", "set", "board.insertion", "sideways"]);
    assert!(!out.status.success());
}

#[test]
fn config_path_points_into_data_dir() {
    let tmp = TempDir::new().unwrap();
    let out = pomo_ok(tmp.path(), &["config", "path"]);
    assert_eq!(Path::new(out.trim()), tmp.path().join("config.toml"));
}
