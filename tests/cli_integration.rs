//! Integration tests for the `td` CLI.
//!
//! Each test builds a task tree in a temp directory, runs `td` against it as
//! a subprocess, and checks stdout and/or the files left on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, UNIX_EPOCH};

use pretty_assertions::assert_eq;

fn td_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_td"))
}

/// Write `rel` under `root` with the given content and mtime (seconds since
/// the epoch), creating parent folders.
fn write_at(root: &Path, rel: &str, content: &str, secs: u64) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

/// Groceries.md (older) and Taxes/ with one newer subtask.
fn create_test_tree(root: &Path) {
    write_at(root, "Groceries.md", "- milk\n- eggs\n", 1_000);
    write_at(root, "Taxes/_index.md", "File before April", 500);
    write_at(root, "Taxes/Form.md", "W-2", 2_000);
}

/// Run `td -C <root> args...`, returning (stdout, stderr, success).
fn run_td(root: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(td_bin())
        .arg("-C")
        .arg(root)
        .args(args)
        .env_remove("TERDO_ROOT")
        .output()
        .expect("failed to run td");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `td` expecting success, return stdout.
fn run_td_ok(root: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_td(root, args);
    if !success {
        panic!("td {:?} failed:\nstdout: {}\nstderr: {}", args, stdout, stderr);
    }
    stdout
}

/// Run `td` expecting failure, return stderr.
fn run_td_err(root: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_td(root, args);
    if success {
        panic!("td {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

/// Names from `td ls --json`, in listed order.
fn ls_names(root: &Path, dir: &str) -> Vec<String> {
    let mut args = vec!["ls", "--json"];
    if !dir.is_empty() {
        args.push(dir);
    }
    let out = run_td_ok(root, &args);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn test_init_then_empty_listing() {
    let tmp = tempfile::TempDir::new().unwrap();
    let root = tmp.path().join("markdown");

    let out = run_td_ok(&root, &["init"]);
    assert!(out.contains("initialized"));
    assert!(root.join(".terdo.toml").is_file());
    assert_eq!(run_td_ok(&root, &["ls"]), "");
}

#[test]
fn test_missing_root_is_reported() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(&tmp.path().join("nowhere"), &["ls"]);
    assert!(stderr.starts_with("error:"));
    assert!(stderr.contains("td init"));
}

#[test]
fn test_root_from_environment() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let output = Command::new(td_bin())
        .arg("ls")
        .env("TERDO_ROOT", tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Groceries"));
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_ls_orders_by_recursive_recency() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    // Taxes counts as edited when Form.md was
    assert_eq!(ls_names(tmp.path(), ""), vec!["Taxes", "Groceries"]);

    write_at(tmp.path(), "Groceries.md", "- bread\n", 3_000);
    assert_eq!(ls_names(tmp.path(), ""), vec!["Groceries", "Taxes"]);
}

#[test]
fn test_ls_text_marks_directory_tasks() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let out = run_td_ok(tmp.path(), &["ls"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("▸ Taxes"));
    assert!(lines[0].contains("(1)"));
    assert!(lines[1].starts_with("  Groceries"));
    assert!(!out.contains("_index"));
}

#[test]
fn test_ls_json_fields() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let out = run_td_ok(tmp.path(), &["ls", "Taxes", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["name"], "Form");
    assert_eq!(arr[0]["path"], "Taxes/Form");
    assert_eq!(arr[0]["kind"], "file");
    assert_eq!(arr[0]["subtasks"], 0);
}

#[test]
fn test_show_prints_content() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    assert_eq!(run_td_ok(tmp.path(), &["show", "Groceries"]), "- milk\n- eggs\n");
    assert_eq!(run_td_ok(tmp.path(), &["show", "Taxes"]), "File before April\n");
    assert_eq!(run_td_ok(tmp.path(), &["show", "Taxes/Form"]), "W-2\n");
}

#[test]
fn test_show_unknown_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let stderr = run_td_err(tmp.path(), &["show", "Nope"]);
    assert!(stderr.contains("not a task"));
    let stderr = run_td_err(tmp.path(), &["show", "_index"]);
    assert!(stderr.contains("not a task"));
}

#[test]
fn test_parent_and_children() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    assert_eq!(run_td_ok(tmp.path(), &["children", "Taxes"]), "Taxes\n");
    assert_eq!(run_td_ok(tmp.path(), &["parent", "Taxes"]), ".\n");

    let stderr = run_td_err(tmp.path(), &["parent"]);
    assert!(stderr.contains("root"));
    let stderr = run_td_err(tmp.path(), &["children", "Groceries"]);
    assert!(stderr.contains("not a directory"));
}

#[test]
fn test_find() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let out = run_td_ok(tmp.path(), &["find", "W-2"]);
    assert_eq!(out, "Taxes/Form: content (1 match)\n");

    let out = run_td_ok(tmp.path(), &["find", "(?i)taxes", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["task"], "Taxes");
    assert_eq!(parsed[0]["field"], "name");
    assert_eq!(parsed[0]["spans"][0][0], 0);
    assert_eq!(parsed[0]["spans"][0][1], 5);

    let stderr = run_td_err(tmp.path(), &["find", "("]);
    assert!(stderr.contains("invalid regex"));
}

#[test]
fn test_tree() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let out = run_td_ok(tmp.path(), &["tree"]);
    assert_eq!(out, "- Taxes/\n  - Form\n- Groceries\n");

    let out = run_td_ok(tmp.path(), &["tree", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["children"][0]["name"], "Form");
    assert!(parsed[1].get("children").is_none());
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

#[test]
fn test_write_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    run_td_ok(tmp.path(), &["write", "Groceries", "  - bread\n- butter  \n\n"]);
    assert_eq!(
        fs::read_to_string(tmp.path().join("Groceries.md")).unwrap(),
        "- bread\n- butter"
    );
    assert_eq!(run_td_ok(tmp.path(), &["show", "Groceries"]), "- bread\n- butter\n");
}

#[test]
fn test_write_from_stdin() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let mut child = Command::new(td_bin())
        .arg("-C")
        .arg(tmp.path())
        .args(["write", "Taxes"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Filed on time\n")
        .unwrap();
    assert!(child.wait().unwrap().success());
    assert_eq!(
        fs::read_to_string(tmp.path().join("Taxes/_index.md")).unwrap(),
        "Filed on time"
    );
}

#[test]
fn test_new_uses_default_names() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    assert_eq!(run_td_ok(tmp.path(), &["new"]), "created New markdown file 0\n");
    assert_eq!(run_td_ok(tmp.path(), &["new"]), "created New markdown file 1\n");
    assert_eq!(
        run_td_ok(tmp.path(), &["new", "Taxes"]),
        "created Taxes/New markdown file 0\n"
    );
    assert!(tmp.path().join("New markdown file 1.md").is_file());
}

#[test]
fn test_config_set_changes_default_name() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["init"]);

    run_td_ok(tmp.path(), &["config", "set", "tasks.default_name", "Todo"]);
    assert_eq!(run_td_ok(tmp.path(), &["new"]), "created Todo 0\n");

    let out = run_td_ok(tmp.path(), &["config", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["tasks"]["default_name"], "Todo");

    let stderr = run_td_err(tmp.path(), &["config", "set", "tasks.colour", "red"]);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_sub_turns_file_into_directory() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let out = run_td_ok(tmp.path(), &["sub", "Groceries"]);
    assert_eq!(out, "created Groceries/New markdown file 0\n");
    assert!(!tmp.path().join("Groceries.md").exists());
    assert_eq!(
        fs::read_to_string(tmp.path().join("Groceries/_index.md")).unwrap(),
        "- milk\n- eggs\n"
    );
    assert_eq!(ls_names(tmp.path(), "Groceries"), vec!["New markdown file 0"]);
}

#[test]
fn test_adopt_moves_task_under_parent() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());
    write_at(tmp.path(), "Form2024.md", "2024 return", 1_500);

    let out = run_td_ok(tmp.path(), &["adopt", "Taxes", "Form2024"]);
    assert_eq!(out, "moved Form2024 -> Taxes/Form2024\n");
    assert_eq!(ls_names(tmp.path(), ""), vec!["Taxes", "Groceries"]);
    assert_eq!(ls_names(tmp.path(), "Taxes"), vec!["Form", "Form2024"]);

    let stderr = run_td_err(tmp.path(), &["adopt", "Taxes", "Taxes/Form2024"]);
    assert!(stderr.contains("already in"));
}

#[test]
fn test_mv_and_collision() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());
    write_at(tmp.path(), "Form.md", "duplicate name", 100);

    let stderr = run_td_err(tmp.path(), &["mv", "Form", "Taxes"]);
    assert!(stderr.contains("name already taken"));
    assert_eq!(fs::read_to_string(tmp.path().join("Form.md")).unwrap(), "duplicate name");
    assert_eq!(fs::read_to_string(tmp.path().join("Taxes/Form.md")).unwrap(), "W-2");

    run_td_ok(tmp.path(), &["mv", "Groceries", "Taxes"]);
    assert!(tmp.path().join("Taxes/Groceries.md").is_file());

    let stderr = run_td_err(tmp.path(), &["mv", "Taxes", "Taxes"]);
    assert!(stderr.contains("own subtree"));
}

#[test]
fn test_mv_last_subtask_out_collapses_parent() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    run_td_ok(tmp.path(), &["mv", "Taxes/Form", "."]);
    assert_eq!(ls_names(tmp.path(), ""), vec!["Form", "Groceries", "Taxes"]);
    // The empty directory task was collapsed while listing
    assert!(tmp.path().join("Taxes.md").is_file());
    assert!(!tmp.path().join("Taxes").exists());
}

#[test]
fn test_rename() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let out = run_td_ok(tmp.path(), &["rename", "Taxes", "Taxes 2024"]);
    assert_eq!(out, "renamed Taxes -> Taxes 2024\n");
    assert!(tmp.path().join("Taxes 2024/Form.md").is_file());
    assert_eq!(run_td_ok(tmp.path(), &["show", "Taxes 2024/Form"]), "W-2\n");

    let stderr = run_td_err(tmp.path(), &["rename", "Groceries", "_index"]);
    assert!(stderr.contains("invalid task name"));
    let stderr = run_td_err(tmp.path(), &["rename", "Groceries", "Taxes 2024"]);
    assert!(stderr.contains("name already taken"));
}

#[test]
fn test_rm_directory_task_needs_recursive() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let stderr = run_td_err(tmp.path(), &["rm", "Taxes"]);
    assert!(stderr.contains("still has 1 subtask"));
    assert!(stderr.contains("--recursive"));
    assert!(tmp.path().join("Taxes/_index.md").exists());

    run_td_ok(tmp.path(), &["rm", "Taxes", "--recursive"]);
    assert!(!tmp.path().join("Taxes").exists());

    run_td_ok(tmp.path(), &["rm", "Groceries"]);
    assert_eq!(ls_names(tmp.path(), ""), Vec::<String>::new());
}

#[test]
fn test_promote_and_demote() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tree(tmp.path());

    let out = run_td_ok(tmp.path(), &["promote", "Groceries"]);
    assert_eq!(out, "Groceries is now a directory task\n");
    assert_eq!(
        fs::read_to_string(tmp.path().join("Groceries/_index.md")).unwrap(),
        "- milk\n- eggs\n"
    );

    run_td_ok(tmp.path(), &["demote", "Groceries"]);
    assert!(!tmp.path().join("Groceries").exists());
    assert_eq!(
        fs::read_to_string(tmp.path().join("Groceries.md")).unwrap(),
        "- milk\n- eggs\n"
    );

    let stderr = run_td_err(tmp.path(), &["demote", "Taxes"]);
    assert!(stderr.contains("still has 1 subtask"));
    let stderr = run_td_err(tmp.path(), &["show", "Taxes/../Groceries"]);
    assert!(stderr.contains("inside the task tree"));
}
