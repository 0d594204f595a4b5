//! Smoke tests to verify command wiring without a database

use assert_cmd::Command;
use predicates::prelude::*;

fn heapharbor() -> Command {
    let mut cmd = Command::cargo_bin("heapharbor").unwrap();
    cmd.env_remove("DATABASE_URL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_top_level_help_lists_commands() {
    heapharbor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("vote"))
        .stdout(predicate::str::contains("save"));
}

#[test]
fn test_ask_help() {
    heapharbor()
        .arg("ask")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("at most 5"));
}

#[test]
fn test_vote_question_help() {
    heapharbor()
        .args(["vote", "question", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("downvote"));
}

#[test]
fn test_delete_help() {
    heapharbor()
        .args(["delete", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("question"))
        .stdout(predicate::str::contains("answer"));
}

#[test]
fn test_user_add_requires_email() {
    heapharbor()
        .args(["user", "add", "--external-id", "x", "--name", "Ada", "--username", "ada"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn test_vote_rejects_non_numeric_id() {
    heapharbor()
        .args(["vote", "answer", "abc", "--user", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_version() {
    heapharbor()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("heapharbor"));
}

#[test]
fn test_broken_config_fails_before_connecting() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join(".heapharbor");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[database\nurl = ").unwrap();

    heapharbor()
        .env("HOME", home.path())
        .current_dir(home.path())
        .arg("migrate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}
