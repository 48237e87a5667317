#![allow(deprecated)]

#[allow(unused_imports)]
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const THIRD_DEFAULT: &str =
    "Do not go where the path may lead, go instead where there is no path and leave a trail.";

fn data_dir(temp: &TempDir) -> PathBuf {
    temp.path().join("data")
}

fn cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("quote_keeper").unwrap();
    c.env("QUOTE_KEEPER_DIR", data_dir(temp))
        .env("NO_COLOR", "1")
        .env("QUOTE_KEEPER_LOG", "off")
        .env("QUOTE_KEEPER_SYNC_URL", temp.path().join("remote.json"))
        .current_dir(temp.path());
    c
}

fn stdout_of(c: &mut assert_cmd::Command) -> String {
    let out = c.assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&out).to_string()
}

fn stored_quotes(temp: &TempDir) -> Vec<serde_json::Value> {
    let raw = fs::read_to_string(data_dir(temp).join("quotes.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn write_remote(dir: &Path, titles: &[&str]) {
    let items: Vec<serde_json::Value> = titles
        .iter()
        .enumerate()
        .map(|(i, t)| serde_json::json!({"userId": 1, "id": i + 1, "title": t, "body": "..."}))
        .collect();
    fs::write(dir.join("remote.json"), serde_json::to_string(&items).unwrap())
        .unwrap();
}

#[test]
fn first_run_seeds_defaults() {
    let temp = TempDir::new().unwrap();
    let out = stdout_of(cmd(&temp).args(["list", "--plain"]));
    assert!(out.contains("John Lennon"));
    assert!(out.contains("(3 of 3 shown)"));
    assert!(out.contains("Last viewed: —"));
    assert_eq!(stored_quotes(&temp).len(), 3);
}

#[test]
fn add_extends_collection_and_categories() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["add", "Stay", "hungry", "-a", "Steve Jobs", "-c", "Motivation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added quote 4 [Motivation]"));

    let stored = stored_quotes(&temp);
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[3]["text"], "Stay hungry");
    assert_eq!(stored[3]["author"], "Steve Jobs");

    let cats = stdout_of(cmd(&temp).args(["categories"]));
    assert!(cats.contains("General  3"));
    assert!(cats.contains("Motivation  1"));
}

#[test]
fn add_blank_text_is_rejected() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["add", "   ", "-a", "Nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please add quote text."));
    assert_eq!(stored_quotes(&temp).len(), 3);
}

#[test]
fn filter_persists_between_runs() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["add", "Stay hungry", "-c", "Motivation"])
        .assert()
        .success();
    cmd(&temp)
        .args(["filter", "Motivation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filter set to Motivation"));

    let out = stdout_of(cmd(&temp).args(["list", "--plain"]));
    assert!(out.contains("Stay hungry"));
    assert!(!out.contains("John Lennon"));
    assert!(out.contains("(1 of 4 shown)"));

    let out = stdout_of(cmd(&temp).args(["list", "--plain", "-c", "Gone"]));
    assert!(out.contains("No quotes in category Gone."));

    cmd(&temp).args(["filter", "all"]).assert().success();
    let out = stdout_of(cmd(&temp).args(["list", "--plain"]));
    assert!(out.contains("(4 of 4 shown)"));
}

#[test]
fn delete_adjusts_last_viewed() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["view", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ralph Waldo Emerson"));

    let preview: String = THIRD_DEFAULT.chars().take(40).collect();
    let out = stdout_of(cmd(&temp).args(["list", "--plain"]));
    assert!(out.contains(&format!("Last viewed: {preview}…")));

    cmd(&temp).args(["delete", "1"]).assert().success();
    let out = stdout_of(cmd(&temp).args(["list", "--plain"]));
    assert!(out.contains(&format!("Last viewed: {preview}…")));

    cmd(&temp)
        .args(["delete", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));

    cmd(&temp).args(["delete", "2"]).assert().success();
    let out = stdout_of(cmd(&temp).args(["list", "--plain"]));
    assert!(out.contains("Last viewed: —"));
    assert_eq!(stored_quotes(&temp).len(), 1);

    cmd(&temp).args(["view", "0"]).assert().failure();
    cmd(&temp).args(["view", "5"]).assert().failure();
}

#[test]
fn export_then_replace_import_roundtrips() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["add", "Stay hungry", "-a", "Steve Jobs", "-c", "Motivation"])
        .assert()
        .success();
    let before = stored_quotes(&temp);

    let export = temp.path().join("backup.json");
    cmd(&temp)
        .args(["export", "--out", export.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 4 quotes"));
    let exported = fs::read_to_string(&export).unwrap();
    assert!(exported.contains("\n  {\n"));

    cmd(&temp).args(["clear"]).assert().success();
    assert_eq!(stored_quotes(&temp).len(), 3);

    cmd(&temp)
        .args(["import", export.to_str().unwrap(), "--replace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("imported successfully"));
    assert_eq!(stored_quotes(&temp), before);
}

#[test]
fn export_defaults_to_dated_file_name() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["export"]).assert().success();
    let found = fs::read_dir(temp.path()).unwrap().any(|e| {
        let name = e.unwrap().file_name().to_string_lossy().to_string();
        name.starts_with("quotes-") && name.ends_with(".json")
    });
    assert!(found);
}

#[test]
fn import_append_and_rejections() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("in.json");

    fs::write(&file, r#"{"text":"not a list"}"#).unwrap();
    cmd(&temp)
        .args(["import", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be an array"));

    fs::write(&file, r#"[{"text":"   "},{"author":"x"}]"#).unwrap();
    cmd(&temp)
        .args(["import", file.to_str().unwrap(), "--replace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid quotes"));
    assert_eq!(stored_quotes(&temp).len(), 3);

    fs::write(&file, r#"[{"text":" imported ","author":1},{"text":""}]"#).unwrap();
    cmd(&temp)
        .args(["import", file.to_str().unwrap()])
        .assert()
        .success();
    let stored = stored_quotes(&temp);
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[3]["text"], "imported");
    assert_eq!(stored[3]["author"], "1");
    assert_eq!(stored[3]["category"], "General");
}

#[test]
fn corrupt_store_self_heals() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(data_dir(&temp)).unwrap();
    fs::write(data_dir(&temp).join("quotes.json"), "{ garbage").unwrap();

    let out = stdout_of(cmd(&temp).args(["list", "--plain"]));
    assert!(out.contains("(3 of 3 shown)"));
    assert_eq!(stored_quotes(&temp).len(), 3);
}

#[test]
fn sync_merges_remote_once() {
    let temp = TempDir::new().unwrap();
    write_remote(temp.path(), &["remote one", "remote two"]);

    cmd(&temp)
        .args(["sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 new, 5 total"));

    let second = stdout_of(cmd(&temp).args(["sync"]));
    assert!(second.trim().is_empty());

    let stored = stored_quotes(&temp);
    assert_eq!(stored.len(), 5);
    assert_eq!(stored[3]["text"], "remote one");
    assert_eq!(stored[3]["category"], "Server");
}

#[test]
fn sync_respects_limit() {
    let temp = TempDir::new().unwrap();
    write_remote(temp.path(), &["a", "b", "c"]);
    cmd(&temp)
        .env("QUOTE_KEEPER_SYNC_LIMIT", "1")
        .args(["sync"])
        .assert()
        .success();
    assert_eq!(stored_quotes(&temp).len(), 4);
}

#[test]
fn sync_failure_leaves_local_state() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["add", "local only"]).assert().success();
    let before = stored_quotes(&temp);

    cmd(&temp)
        .args(["sync"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sync failed"));

    fs::write(temp.path().join("remote.json"), "not json").unwrap();
    cmd(&temp).args(["sync"]).assert().failure();
    assert_eq!(stored_quotes(&temp), before);
}

#[test]
fn sync_reports_unwritable_store_without_failing() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["list"]).assert().success();
    write_remote(temp.path(), &["remote one"]);
    // A directory where the temp file goes makes every quotes write fail.
    fs::create_dir(data_dir(&temp).join(".quotes.json.tmp")).unwrap();

    cmd(&temp)
        .args(["sync"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unable to save quotes"));
    assert_eq!(stored_quotes(&temp).len(), 3);
}

#[test]
fn watch_stops_after_run_limit() {
    let temp = TempDir::new().unwrap();
    write_remote(temp.path(), &["watched"]);
    cmd(&temp)
        .args(["watch", "--every", "1", "--runs", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 new, 4 total"))
        .stdout(predicate::str::contains("Stopped after 2 sync run(s)."));
    assert_eq!(stored_quotes(&temp).len(), 4);
}

#[test]
fn push_without_remote_support_is_not_fatal() {
    let temp = TempDir::new().unwrap();
    write_remote(temp.path(), &[]);
    cmd(&temp)
        .args(["add", "pushed", "--push"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Push failed"));
    assert_eq!(stored_quotes(&temp).len(), 4);
}

#[test]
fn random_and_clear() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["random"])
        .assert()
        .success()
        .stdout(predicate::str::contains("—"));
    assert!(data_dir(&temp).join("session").join("last_viewed.json").exists());

    cmd(&temp)
        .args(["clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("restored 3 defaults"));
    assert!(!data_dir(&temp).join("session").join("last_viewed.json").exists());
}

#[test]
fn path_and_help() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            data_dir(&temp).to_string_lossy().as_ref(),
        ));

    cmd(&temp)
        .args(["help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quote Keeper"));

    let mut alias = assert_cmd::Command::cargo_bin("qk").unwrap();
    alias
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("qk sync"));
}
