//! Declarative dependency fetching.
//!
//! Dependencies are pinned by TOML manifests under `deps/`; each manifest
//! drives a shallow git clone (or an update of an existing checkout) to the
//! pinned revision. The checkout on disk is the only durable state — the
//! resolver never records anything else.
//!
//! ## Flow
//!
//! 1. Discover `deps/*.toml` in sorted file-name order
//! 2. Parse and validate every manifest (before any git process runs)
//! 3. Detect the git client's version once
//! 4. Fetch each descriptor, failing fast on the first nonzero status

pub mod git;
pub mod manifest;

use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding both the manifests and the checkouts they describe.
pub const DEPS_DIR: &str = "deps";

/// Manifest paths under `deps/`, sorted by file name for a stable order.
pub fn discover_manifests(root: &Path) -> Result<Vec<PathBuf>> {
    let deps_dir = root.join(DEPS_DIR);
    if !deps_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut manifests = Vec::new();
    let entries = fs::read_dir(&deps_dir)
        .with_context(|| format!("Failed to list {}", deps_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            manifests.push(path);
        }
    }

    manifests.sort();
    Ok(manifests)
}

/// Fetch every declared dependency.
///
/// Returns the exit status to forward: zero on success, otherwise the first
/// nonzero git status. Descriptor validation errors surface before the first
/// external process is spawned.
pub fn fetch_all(root: &Path, verbose: bool) -> Result<i32> {
    let manifests = discover_manifests(root)?;
    if manifests.is_empty() {
        println!("{} No dependency manifests under {}/", "ℹ".blue(), DEPS_DIR);
        return Ok(0);
    }

    let descriptors = manifests
        .iter()
        .map(|path| manifest::load_descriptor(path))
        .collect::<Result<Vec<_>>>()?;

    println!("{} Checking {} dependencies...", "📦".blue(), descriptors.len());
    let version = git::detect_version()?;

    for descriptor in &descriptors {
        let status = fetch_one(root, descriptor, &version, verbose)?;
        if status != 0 {
            println!(
                "{} Fetch failed for '{}' (exit status {})",
                "x".red(),
                descriptor.name,
                status
            );
            return Ok(status);
        }
    }

    println!("{} Dependencies ready.", "✓".green());
    Ok(0)
}

fn fetch_one(
    root: &Path,
    descriptor: &manifest::Descriptor,
    version: &git::GitVersion,
    verbose: bool,
) -> Result<i32> {
    let checkout = root.join(DEPS_DIR).join(&descriptor.name);
    let exists = checkout.is_dir();
    let plan = git::plan_fetch(
        descriptor,
        &checkout,
        exists,
        version.supports_shallow_clone_by_revision(),
    );

    let action = if exists { "Updating" } else { "Downloading" };
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"),
    );
    pb.set_message(format!(
        "{} {} @ {}...",
        action,
        descriptor.name,
        short_hash(&descriptor.revision)
    ));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    for command in &plan {
        let status = git::run(command, verbose)?;
        if status != 0 {
            pb.finish_with_message(format!("{} Failed {}", "x".red(), descriptor.name));
            return Ok(status);
        }
    }

    pb.finish_with_message(format!(
        "{} {} @ {}",
        "✓".green(),
        descriptor.name,
        short_hash(&descriptor.revision)
    ));
    Ok(0)
}

fn short_hash(rev: &str) -> &str {
    if rev.len() > 7 { &rev[..7] } else { rev }
}
