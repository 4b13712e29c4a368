use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("desugarcube-parser")
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Copy a fixture into `dir` so the output lands next to it
fn stage(dir: &Path, name: &str) -> PathBuf {
    let target = dir.join(name);
    std::fs::copy(fixture_path(name), &target).unwrap();
    target
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn convert_writes_sibling_json() {
    let dir = tempfile::tempdir().unwrap();
    let source = stage(dir.path(), "crossroads.html");

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg(&source).current_dir(dir.path());
    cmd.assert().success().stdout(predicate::str::is_empty());

    let json = read_json(&dir.path().join("crossroads.json"));
    assert_eq!(json["name"], "Crossroads");
    let passages = json["passages"].as_array().unwrap();
    assert_eq!(passages.len(), 4);
    assert_eq!(passages[0]["links"][0]["pid"], "2");
}

#[test]
fn convert_replaces_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = stage(dir.path(), "empty.html");
    let target = dir.path().join("empty.json");
    std::fs::write(&target, "stale").unwrap();

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg(&source).current_dir(dir.path());
    cmd.assert().success();

    let json = read_json(&target);
    assert_eq!(json["passages"], serde_json::json!([]));
}

#[test]
fn convert_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let source = stage(dir.path(), "crossroads.html");

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg(&source).arg("--stdout").current_dir(dir.path());
    cmd.assert().success().stdout(
        predicate::str::contains(r#""name":"Crossroads""#)
            .and(predicate::str::contains("Café")),
    );

    assert!(!dir.path().join("crossroads.json").exists());
}

#[test]
fn convert_pretty_to_explicit_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = stage(dir.path(), "crossroads.html");
    let target = dir.path().join("graph.json");

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg(&source)
        .arg("--pretty")
        .arg("--output")
        .arg(&target)
        .current_dir(dir.path());
    cmd.assert().success();

    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.contains("\n  \"passages\": ["));
    assert!(!dir.path().join("crossroads.json").exists());
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg("nowhere.html").current_dir(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist at:"));
}

#[test]
fn unbound_link_keeps_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = stage(dir.path(), "unbound_link.html");
    let target = dir.path().join("unbound_link.json");
    std::fs::write(&target, "previous").unwrap();

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg(&source).current_dir(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Found unbound link: Hallway"));

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous");
}

#[test]
fn unbound_expression_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = stage(dir.path(), "unbound_expression.html");

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg(&source).current_dir(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Found unbound expression: mana"));

    assert!(!dir.path().join("unbound_expression.json").exists());
}

#[test]
fn local_config_file_is_layered() {
    let dir = tempfile::tempdir().unwrap();
    let source = stage(dir.path(), "crossroads.html");
    std::fs::write(
        dir.path().join("desugarcube.toml"),
        "[parse]\npassage_exclude = [\"size\"]\n\n[output]\nextension = \"story.json\"\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg(&source).current_dir(dir.path());
    cmd.assert().success();

    let json = read_json(&dir.path().join("crossroads.story.json"));
    assert_eq!(json["passages"][0]["position"], "100,100");
    assert!(json["passages"][0].get("size").is_none());
}

#[test]
fn explicit_config_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let source = stage(dir.path(), "crossroads.html");

    let mut cmd = cargo_bin_cmd!("desugarcube");
    cmd.arg(&source)
        .arg("--config")
        .arg("missing.toml")
        .current_dir(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
