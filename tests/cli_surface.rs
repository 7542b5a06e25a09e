//! Integration tests for the `art` CLI surface.
//!
//! These run the real binary against scratch workspaces, sticking to the
//! paths that need no external toolchain: `--which`, completion generation,
//! and fetch-side validation failures.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn scratch_root() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".artisan-root"), "").unwrap();
    temp
}

fn art_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_art"))
}

fn run_art(project_dir: &Path, args: &[&str]) -> Output {
    Command::new(art_binary())
        .args(args)
        .current_dir(project_dir)
        .output()
        .expect("Failed to execute art")
}

#[test]
fn test_which_prints_resolved_exe_path() {
    let temp = scratch_root();
    let output = run_art(temp.path(), &["build", "--which"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.trim();
    assert!(line.contains("build"));
    assert!(line.contains("runtime"));
    // Resolved against the project root, not printed relative.
    assert!(Path::new(line).is_absolute());
}

#[test]
fn test_which_honors_release_config() {
    let temp = scratch_root();
    let output = run_art(temp.path(), &["run", "--which", "--config", "release"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("release"));
    assert!(!stdout.contains("debug"));
}

#[test]
fn test_unknown_target_is_a_single_line_error() {
    let temp = scratch_root();
    let output = run_art(temp.path(), &["build", "banjo", "--which"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("banjo"));
    assert!(!stderr.contains("panicked"));
}

#[test]
fn test_outside_a_checkout_is_a_single_line_error() {
    if std::env::var("ARTISAN_ROOT_DIR").is_ok() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let output = run_art(temp.path(), &["build", "--which"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(".artisan-root"));
    assert!(!stderr.contains("panicked"));
}

#[test]
fn test_fetch_with_no_manifests_succeeds() {
    let temp = scratch_root();
    let output = run_art(temp.path(), &["fetch"]);
    assert!(output.status.success());
}

#[test]
fn test_fetch_rejects_invalid_manifest_before_any_git_work() {
    let temp = scratch_root();
    let deps = temp.path().join("deps");
    fs::create_dir_all(&deps).unwrap();
    fs::write(
        deps.join("broken.toml"),
        "[dependency]\nbranch = \"main\"\nrevision = \"abc123\"\n",
    )
    .unwrap();

    let output = run_art(temp.path(), &["fetch"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.toml"));
    assert!(stderr.contains("remote"));
    // Validation failed before any clone could have created a checkout.
    assert!(!deps.join("broken").exists());
}

#[test]
fn test_completion_generation() {
    let temp = scratch_root();
    let output = run_art(temp.path(), &["completion", "bash"]);

    assert!(output.status.success());
    assert!(!output.stdout.is_empty());
}

#[test]
fn test_subcommand_aliases_are_accepted() {
    let temp = scratch_root();
    for alias in ["tune", "craft", "play"] {
        let output = run_art(temp.path(), &[alias, "--which"]);
        assert!(
            output.status.success(),
            "alias {} failed: {}",
            alias,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
