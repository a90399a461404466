//! Command-line tests that need neither an embedding server nor an API key

use assert_cmd::Command;
use predicates::prelude::*;

fn newsrag(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("newsrag").unwrap();
    // Run outside the repo so no .env is picked up
    cmd.current_dir(dir).env_remove("OPENAI_API_KEY");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();

    newsrag(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("retrieve"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("embedding-dim"));
}

#[test]
fn test_ask_without_api_key_fails() {
    let dir = tempfile::tempdir().unwrap();

    newsrag(dir.path())
        .args(["ask", "--source-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_inspect_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readme.md"), "not a spreadsheet").unwrap();

    newsrag(dir.path())
        .args(["inspect", "--source-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Documents: 0"))
        .stdout(predicate::str::contains("Base Node Num: 0"));
}

#[test]
fn test_inspect_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();

    newsrag(dir.path())
        .args(["inspect", "--source-dir", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read does-not-exist"));
}

#[test]
fn test_invalid_arguments_rejected() {
    let dir = tempfile::tempdir().unwrap();

    newsrag(dir.path())
        .args(["inspect", "--top-k", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pipeline arguments"));

    newsrag(dir.path())
        .args(["inspect", "--chunk-size", "10", "--chunk-overlap", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pipeline arguments"));

    newsrag(dir.path())
        .args(["ask", "--date", "2023/11/13"])
        .env("OPENAI_API_KEY", "sk-unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("2023/11/13"));
}
