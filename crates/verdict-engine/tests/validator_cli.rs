//! Exit-contract tests for the `verdict_run_validator` binary.
//!
//! Exit code 0 on full completion, exit code 1 with a single stderr
//! diagnostic on any fatal condition, and a silent stdout throughout.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_root(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("verdict_engine_{label}_{nanos}_{}", std::process::id()))
}

fn scaffold_workspace(label: &str) -> PathBuf {
    let root = temp_root(label);
    fs::create_dir_all(root.join("input")).expect("mkdir input");
    fs::write(root.join("input").join("snapshot.bin"), b"cli snapshot").expect("write snapshot");
    fs::create_dir_all(root.join("schemas")).expect("mkdir schemas");
    fs::write(
        root.join("schemas").join("decision_allowlist.json"),
        r#"["uncertainty.decision.json", "language_boundary.decision.json"]"#,
    )
    .expect("write allowlist");
    fs::create_dir_all(root.join("rules")).expect("mkdir rules");
    fs::write(
        root.join("rules").join("claims.json"),
        r#"[
            {"claim": "Foo occurs", "status": "unknown"},
            {"claim": "Bar happens", "status": "unknown"}
        ]"#,
    )
    .expect("write claims");
    root
}

fn run_validator(root: &PathBuf) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_verdict_run_validator"))
        .arg("--root")
        .arg(root)
        .output()
        .expect("spawn validator")
}

#[test]
fn successful_run_exits_zero_with_silent_stdout() {
    let root = scaffold_workspace("cli_success");
    let output = run_validator(&root);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty(), "stdout must stay silent");
    assert!(output.stderr.is_empty(), "stderr must stay silent on success");
    assert!(root.join("runs").join("README.invalid").is_file());

    fs::remove_dir_all(&root).expect("cleanup");
}

#[test]
fn missing_snapshot_exits_one_with_single_diagnostic() {
    let root = temp_root("cli_missing_snapshot");
    fs::create_dir_all(&root).expect("mkdir");
    let output = run_validator(&root);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.trim(), "Input file input/snapshot.bin is missing");
    assert_eq!(stderr.lines().count(), 1);

    fs::remove_dir_all(&root).expect("cleanup");
}

#[test]
fn allowlist_violation_exits_one_naming_the_artifact() {
    let root = scaffold_workspace("cli_undeclared");
    fs::write(
        root.join("schemas").join("decision_allowlist.json"),
        r#"["language_boundary.decision.json"]"#,
    )
    .expect("write");
    let output = run_validator(&root);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.trim(),
        "Decision artifact uncertainty.decision.json not in allowlist"
    );

    fs::remove_dir_all(&root).expect("cleanup");
}

#[test]
fn unknown_argument_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_verdict_run_validator"))
        .arg("--bogus")
        .output()
        .expect("spawn validator");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--bogus"));
}
