use assert_cmd::Command;
use predicates::str::contains;

mod support;

use support::TestWorkspace;

fn plsync() -> Command {
    Command::cargo_bin("plsync").expect("binary")
}

#[test]
fn help_works() {
    plsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Plane sync cache"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["sync", "issue", "link", "unlink", "discover", "show"];

    for cmd in subcommands {
        plsync().arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn touch_emits_success_envelope() {
    let ws = TestWorkspace::new();

    plsync()
        .arg("sync")
        .arg("--touch")
        .arg("--json")
        .arg("--cache")
        .arg(ws.cache_path())
        .assert()
        .success()
        .stdout(contains("\"success\": true"))
        .stdout(contains("\"touched\": true"));

    assert!(ws.cache_path().exists());
}

#[test]
fn sync_link_show_flow() {
    let ws = TestWorkspace::new();
    let cache = ws.cache_path();
    let data = r#"{
        "project": {"id": "p1", "identifier": "CCPRISM", "name": "Prism"},
        "states": [{"id": "s1", "name": "Todo", "group": "unstarted"}],
        "issues": [{"id": "u27", "sequence_id": 27, "name": "Implement feature",
                    "state": "s1", "updated_at": "2025-12-11T10:00:00Z"}]
    }"#;

    plsync()
        .args(["sync", "--json", "--data", data, "--cache"])
        .arg(&cache)
        .assert()
        .success()
        .stdout(contains("CCPRISM-27"));

    plsync()
        .args(["link", "CCPRISM-27", "m-feature.md", "--json", "--cache"])
        .arg(&cache)
        .assert()
        .success()
        .stdout(contains("\"success\": true"));

    plsync()
        .args(["show", "issue", "CCPRISM-27", "--json", "--cache"])
        .arg(&cache)
        .assert()
        .success()
        .stdout(contains("m-feature.md"));
}

#[test]
fn link_conflict_exits_with_policy_code() {
    let ws = TestWorkspace::new();
    let cache = ws.cache_path();
    let data = r#"{
        "project": {"identifier": "CCPRISM"},
        "issues": [
            {"id": "u1", "sequence_id": 1, "name": "One"},
            {"id": "u2", "sequence_id": 2, "name": "Two"}
        ]
    }"#;

    plsync()
        .args(["sync", "--data", data, "--cache"])
        .arg(&cache)
        .assert()
        .success();

    plsync()
        .args(["link", "CCPRISM-1", "a.md", "--cache"])
        .arg(&cache)
        .assert()
        .success();

    plsync()
        .args(["link", "CCPRISM-2", "a.md", "--json", "--cache"])
        .arg(&cache)
        .assert()
        .failure()
        .code(3)
        .stdout(contains("\"success\": false"));
}

#[test]
fn unknown_issue_exits_with_user_error() {
    let ws = TestWorkspace::new();

    plsync()
        .args(["sync", "--touch", "--cache"])
        .arg(ws.cache_path())
        .assert()
        .success();

    plsync()
        .args(["unlink", "CCPRISM-1", "--cache"])
        .arg(ws.cache_path())
        .assert()
        .failure()
        .code(2)
        .stderr(contains("not linked"));
}

#[test]
fn show_summary_without_cache_fails_cleanly() {
    let ws = TestWorkspace::new();

    plsync()
        .args(["show", "summary", "--cache"])
        .arg(ws.cache_path())
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Cache not found"));
}
