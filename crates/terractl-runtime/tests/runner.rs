//! `ScriptRunner` against real shell scripts.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use terractl_core::ports::{CommandRunner, CommandSpec};
use terractl_runtime::ScriptRunner;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn captures_output_and_exit_status() {
    let tmp = tempfile::tempdir().unwrap();
    let path = script(tmp.path(), "ok.sh", "echo \"args: $*\"\necho oops >&2\nexit 0");

    let output = ScriptRunner
        .run(CommandSpec::new(&path).args(["create", "Alpha"]))
        .await;
    assert!(output.success);
    assert_eq!(output.exit_code, Some(0));
    assert_eq!(output.stdout, "args: create Alpha\n");
    assert_eq!(output.stderr, "oops\n");
}

#[tokio::test]
async fn non_zero_exit_is_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let path = script(tmp.path(), "fail.sh", "echo broken >&2\nexit 3");

    let output = ScriptRunner.run(CommandSpec::new(&path)).await;
    assert!(!output.success);
    assert_eq!(output.exit_code, Some(3));
    assert_eq!(output.diagnostic(), "broken\n");
}

#[tokio::test]
async fn passes_term_and_extra_environment() {
    let tmp = tempfile::tempdir().unwrap();
    let path = script(tmp.path(), "env.sh", "echo \"$TERM $WORLD_NAME\"");

    let output = ScriptRunner
        .run(CommandSpec::new(&path).env("WORLD_NAME", "Gamma"))
        .await;
    assert_eq!(output.stdout.trim(), "dumb Gamma");
}

#[tokio::test]
async fn missing_script_is_reported() {
    let output = ScriptRunner
        .run(CommandSpec::new("/nonexistent/scripts/backup.sh"))
        .await;
    assert!(!output.success);
    assert_eq!(output.exit_code, None);
    assert_eq!(output.stderr, "Script not found: /nonexistent/scripts/backup.sh");
}

#[tokio::test]
async fn timeout_is_reported_as_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let path = script(tmp.path(), "slow.sh", "sleep 5");

    let output = ScriptRunner
        .run(CommandSpec::new(&path).with_timeout(Duration::from_secs(1)))
        .await;
    assert!(!output.success);
    assert_eq!(output.stderr, "Script timed out after 1 seconds");
}

#[tokio::test]
async fn timed_out_script_is_killed_before_later_steps() {
    let tmp = tempfile::tempdir().unwrap();
    let marker = tmp.path().join("marker");
    let body = format!("sleep 2\necho step-done\ntouch {}", marker.display());
    let path = script(tmp.path(), "progress.sh", &body);

    let output = ScriptRunner
        .run(CommandSpec::new(&path).with_timeout(Duration::from_secs(1)))
        .await;
    assert!(!output.success);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!marker.exists());
}

#[tokio::test]
async fn timed_out_silent_script_is_killed_too() {
    let tmp = tempfile::tempdir().unwrap();
    let marker = tmp.path().join("marker");
    let body = format!("sleep 2\ntouch {}", marker.display());
    let path = script(tmp.path(), "quiet.sh", &body);

    let output = ScriptRunner
        .run(CommandSpec::new(&path).with_timeout(Duration::from_secs(1)))
        .await;
    assert!(!output.success);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!marker.exists());
}

#[tokio::test]
async fn launch_failure_for_unknown_command() {
    let output = ScriptRunner
        .run(CommandSpec::new("terractl-definitely-not-a-command"))
        .await;
    assert!(!output.success);
    assert!(!output.stderr.is_empty());
}
