use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const DEMO_PAGE: &str = "demos/login-page.yaml";
const DEMO_CHAIN: &str = "demos/login-chain.json";

// Each invocation reads its configuration from an isolated directory.
fn webatoms(workdir: &TempDir) -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("webatoms");
    let mut cmd = Command::new(bin);
    cmd.arg("--config")
        .arg(workdir.path().join("config.yaml"))
        .env("RUST_LOG", "warn");
    cmd
}

fn write(workdir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = workdir.path().join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("utf8 output");
    serde_json::from_str(&stdout).expect("valid json")
}

fn run_json(workdir: &TempDir, request: &Path, page: &Path) -> assert_cmd::assert::Assert {
    webatoms(workdir)
        .args(["--output", "json", "run", "--request"])
        .arg(request)
        .arg("--page")
        .arg(page)
        .assert()
}

#[test]
fn demo_chain_runs_to_terminal_value() {
    let workdir = TempDir::new().unwrap();
    let assert = run_json(&workdir, Path::new(DEMO_CHAIN), Path::new(DEMO_PAGE)).success();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["steps_executed"].as_u64(), Some(10));
    assert_eq!(value["value"].as_str(), Some("Welcome back"));

    let events = value["events"].as_array().unwrap();
    let kinds: Vec<&str> = events.iter().filter_map(|e| e["event"].as_str()).collect();
    assert_eq!(kinds, vec!["javascript_enabled", "keys", "keys", "click"]);
    assert_eq!(events[1]["text"].as_str(), Some("alice"));
}

#[test]
fn failing_chain_reports_kind_and_exits_non_zero() {
    let workdir = TempDir::new().unwrap();
    let request = write(
        &workdir,
        "chain.yaml",
        "methodChain:\n  - name: reset\n  - name: tapOn\n  - name: get\n",
    );

    let assert = run_json(&workdir, &request, Path::new(DEMO_PAGE)).failure();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["kind"].as_str(), Some("UnknownInteraction"));
    assert_eq!(value["code"].as_str(), Some("unknown_interaction"));
    assert_eq!(value["step"].as_u64(), Some(1));
    assert!(value["message"].as_str().unwrap().contains("tapOn"));
}

#[test]
fn unknown_webview_element_fails_before_any_step() {
    let workdir = TempDir::new().unwrap();
    let request = write(
        &workdir,
        "chain.json",
        r#"{ "webviewElement": "el-404", "methodChain": [{ "name": "reset" }] }"#,
    );

    let assert = run_json(&workdir, &request, Path::new(DEMO_PAGE)).failure();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["code"].as_str(), Some("element_not_found"));
    assert!(value.get("step").is_none());
}

#[test]
fn human_output_prints_value() {
    let workdir = TempDir::new().unwrap();
    let assert = webatoms(&workdir)
        .args(["run", "--request", DEMO_CHAIN, "--page", DEMO_PAGE])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Steps executed: 10"));
    assert!(stdout.contains("Value: \"Welcome back\""));
}

#[test]
fn configured_timeout_is_accepted() {
    let workdir = TempDir::new().unwrap();
    write(
        &workdir,
        "config.yaml",
        "logging:\n  level: error\nchain:\n  timeout_ms: 0\n",
    );

    run_json(&workdir, Path::new(DEMO_CHAIN), Path::new(DEMO_PAGE)).success();
}

#[test]
fn validate_accepts_demo_chain() {
    let workdir = TempDir::new().unwrap();
    let assert = webatoms(&workdir)
        .args(["validate", "--request", DEMO_CHAIN])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Request is valid (10 steps)"));
}

#[test]
fn validate_rejects_unknown_atom() {
    let workdir = TempDir::new().unwrap();
    let request = write(
        &workdir,
        "chain.json",
        r#"{ "methodChain": [{ "name": "perform", "atom": { "name": "webClik", "args": [] } }] }"#,
    );

    let assert = webatoms(&workdir)
        .args(["--output", "json", "validate", "--request"])
        .arg(&request)
        .assert()
        .failure();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["code"].as_str(), Some("atom_not_found"));
    assert_eq!(value["step"].as_u64(), Some(0));
}

#[test]
fn unsupported_document_is_rejected() {
    let workdir = TempDir::new().unwrap();
    let request = write(&workdir, "chain.txt", "{}");

    let assert = webatoms(&workdir)
        .args(["validate", "--request"])
        .arg(&request)
        .assert()
        .failure();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("unsupported document format"));
}

#[test]
fn atoms_lists_the_catalog() {
    let workdir = TempDir::new().unwrap();
    let assert = webatoms(&workdir)
        .args(["--output", "json", "atoms"])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());

    let atoms = value.as_array().unwrap();
    assert_eq!(atoms.len(), 13);
    let find = atoms
        .iter()
        .find(|atom| atom["name"] == "findElement")
        .unwrap();
    assert_eq!(find["kind"].as_str(), Some("element"));
    assert_eq!(
        find["signature"].as_str(),
        Some("findElement(Locator, String) -> element")
    );
    let script = atoms.iter().find(|atom| atom["name"] == "script").unwrap();
    assert!(script["variadic"].is_string());
}

#[test]
fn interactions_lists_the_vocabulary() {
    let workdir = TempDir::new().unwrap();
    let assert = webatoms(&workdir).arg("interactions").assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.contains(&"withElement(element atom)"));
    assert!(lines.contains(&"get()"));
    assert_eq!(lines.len(), 8);
}
