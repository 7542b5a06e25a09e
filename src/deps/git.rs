//! Git client detection and invocation planning.
//!
//! Clone strategy depends on the installed git: shallow-cloning an arbitrary
//! revision (`git clone --revision`) only exists since git 2.49, so older
//! clients fall back to cloning the branch tip. The branching lives in a
//! pure planning function over a parsed [`GitVersion`], keeping it testable
//! without an actual git binary; execution is a thin captured-output wrapper
//! that forwards the numeric exit status.

use super::manifest::Descriptor;
use anyhow::{Context, Result, bail};
use regex::Regex;
use semver::Version;
use std::path::{Path, PathBuf};
use std::process::Command;

/// First release able to shallow-clone an arbitrary revision.
const REVISION_CLONE_MINIMUM: Version = Version::new(2, 49, 0);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitVersion(Version);

impl GitVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// Parse the output of `git --version`, tolerating vendor suffixes like
    /// "git version 2.39.5 (Apple Git-154)".
    pub fn parse(text: &str) -> Result<Self> {
        let re = Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").unwrap();
        let caps = re
            .captures(text)
            .with_context(|| format!("Could not find a version number in '{}'", text.trim()))?;

        let major = caps[1].parse::<u64>()?;
        let minor = caps[2].parse::<u64>()?;
        let patch = caps
            .get(3)
            .map(|m| m.as_str().parse::<u64>())
            .transpose()?
            .unwrap_or(0);

        Ok(Self::new(major, minor, patch))
    }

    pub fn supports_shallow_clone_by_revision(&self) -> bool {
        self.0 >= REVISION_CLONE_MINIMUM
    }
}

/// Ask the installed client for its version.
pub fn detect_version() -> Result<GitVersion> {
    let output = Command::new("git")
        .arg("--version")
        .output()
        .context("Failed to run git; is it installed and on PATH?")?;

    if !output.status.success() {
        bail!(
            "git --version exited with status {}",
            output.status.code().unwrap_or(1)
        );
    }

    GitVersion::parse(&String::from_utf8_lossy(&output.stdout))
}

/// One planned git invocation: argument vector plus working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitCommand {
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl GitCommand {
    fn new<const N: usize>(cwd: &Path, args: [&str; N]) -> Self {
        Self {
            args: args.iter().map(|s| s.to_string()).collect(),
            cwd: cwd.to_path_buf(),
        }
    }
}

/// Plan the invocations that bring a checkout to its pinned revision.
///
/// Existing checkout: shallow fetch of the revision, then check it out; a
/// failed fetch aborts before the checkout step runs. Missing checkout: one
/// shallow clone, by revision on capable clients and by branch otherwise.
pub fn plan_fetch(
    descriptor: &Descriptor,
    checkout: &Path,
    checkout_exists: bool,
    supports_revision_clone: bool,
) -> Vec<GitCommand> {
    if checkout_exists {
        return vec![
            GitCommand::new(
                checkout,
                ["fetch", "--depth", "1", "origin", &descriptor.revision],
            ),
            GitCommand::new(checkout, ["checkout", &descriptor.revision]),
        ];
    }

    let parent = checkout.parent().unwrap_or(checkout);
    let destination = checkout.to_string_lossy();

    if supports_revision_clone {
        vec![GitCommand::new(
            parent,
            [
                "clone",
                "--depth",
                "1",
                "--revision",
                &descriptor.revision,
                &descriptor.remote,
                &destination,
            ],
        )]
    } else {
        vec![GitCommand::new(
            parent,
            [
                "clone",
                "--depth",
                "1",
                "--branch",
                &descriptor.branch,
                &descriptor.remote,
                &destination,
            ],
        )]
    }
}

/// Run one planned command with captured output.
///
/// Returns the numeric exit status unchanged; stderr is surfaced only when
/// the command fails. The working directory is passed to the child, never
/// set on this process.
pub fn run(command: &GitCommand, verbose: bool) -> Result<i32> {
    if verbose {
        eprintln!("> git {}", command.args.join(" "));
    }

    let output = Command::new("git")
        .args(&command.args)
        .current_dir(&command.cwd)
        .output()
        .context("Failed to run git; is it installed and on PATH?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }
    }

    Ok(output.status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> Descriptor {
        Descriptor {
            name: "widget".to_string(),
            remote: "https://example.com/vendor/widget.git".to_string(),
            branch: "main".to_string(),
            revision: "a3f5c2e9d1b4a3f5c2e9d1b4a3f5c2e9d1b4a3f5".to_string(),
        }
    }

    #[test]
    fn test_parse_plain_version() {
        let v = GitVersion::parse("git version 2.49.0").unwrap();
        assert_eq!(v, GitVersion::new(2, 49, 0));
    }

    #[test]
    fn test_parse_vendor_suffix() {
        let v = GitVersion::parse("git version 2.39.5 (Apple Git-154)").unwrap();
        assert_eq!(v, GitVersion::new(2, 39, 5));
    }

    #[test]
    fn test_parse_two_component_version() {
        let v = GitVersion::parse("git version 2.50").unwrap();
        assert_eq!(v, GitVersion::new(2, 50, 0));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(GitVersion::parse("not a version at all").is_err());
    }

    #[test]
    fn test_revision_clone_capability_boundary() {
        assert!(!GitVersion::new(2, 48, 5).supports_shallow_clone_by_revision());
        assert!(GitVersion::new(2, 49, 0).supports_shallow_clone_by_revision());
        assert!(GitVersion::new(2, 49, 1).supports_shallow_clone_by_revision());
        assert!(GitVersion::new(3, 0, 0).supports_shallow_clone_by_revision());
    }

    #[test]
    fn test_plan_existing_checkout_fetches_then_checks_out() {
        let d = descriptor();
        let checkout = Path::new("/proj/deps/widget");
        let plan = plan_fetch(&d, checkout, true, true);

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan[0].args,
            vec!["fetch", "--depth", "1", "origin", d.revision.as_str()]
        );
        assert_eq!(plan[0].cwd, checkout);
        assert_eq!(plan[1].args, vec!["checkout", d.revision.as_str()]);
        assert_eq!(plan[1].cwd, checkout);
    }

    #[test]
    fn test_plan_missing_checkout_new_git_clones_by_revision() {
        let d = descriptor();
        let checkout = Path::new("/proj/deps/widget");
        let plan = plan_fetch(&d, checkout, false, true);

        assert_eq!(plan.len(), 1);
        let args = &plan[0].args;
        assert_eq!(args[0], "clone");
        assert!(args.contains(&"--revision".to_string()));
        assert!(args.contains(&d.revision));
        assert!(!args.contains(&"--branch".to_string()));
        assert_eq!(plan[0].cwd, Path::new("/proj/deps"));
    }

    #[test]
    fn test_plan_missing_checkout_old_git_clones_by_branch() {
        let d = descriptor();
        let checkout = Path::new("/proj/deps/widget");
        let plan = plan_fetch(&d, checkout, false, false);

        assert_eq!(plan.len(), 1);
        let args = &plan[0].args;
        assert_eq!(args[0], "clone");
        assert!(args.contains(&"--branch".to_string()));
        assert!(args.contains(&d.branch));
        assert!(!args.contains(&"--revision".to_string()));
    }
}
