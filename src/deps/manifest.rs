//! Dependency manifest parsing and validation.
//!
//! Each dependency is declared by one TOML file under `deps/` whose stem
//! names the checkout directory:
//!
//! ```toml
//! [dependency]
//! remote = "https://example.com/vendor/lib.git"
//! branch = "main"
//! revision = "0123456789abcdef0123456789abcdef01234567"
//! ```
//!
//! Validation happens here, before any git process is spawned: a manifest
//! missing the `[dependency]` table or any of its keys is rejected with a
//! single user-facing message.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Default)]
struct ManifestFile {
    dependency: Option<DependencyTable>,
}

#[derive(Deserialize, Debug, Default)]
struct DependencyTable {
    remote: Option<String>,
    branch: Option<String>,
    revision: Option<String>,
}

/// A validated dependency pin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub remote: String,
    pub branch: String,
    pub revision: String,
}

/// Parse and validate one manifest file.
pub fn load_descriptor(path: &Path) -> Result<Descriptor> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .with_context(|| format!("Manifest {} has no usable file name", path.display()))?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dependency manifest {}", path.display()))?;

    parse_descriptor(&name, &content)
        .with_context(|| format!("Invalid dependency manifest {}", path.display()))
}

/// Validate manifest text into a descriptor named `name`.
pub fn parse_descriptor(name: &str, content: &str) -> Result<Descriptor> {
    let manifest: ManifestFile = toml::from_str(content).context("Not valid TOML")?;

    let Some(table) = manifest.dependency else {
        bail!("Missing the [dependency] table");
    };

    let remote = require(table.remote, "remote")?;
    let branch = require(table.branch, "branch")?;
    let revision = require(table.revision, "revision")?;

    Ok(Descriptor {
        name: name.to_string(),
        remote,
        branch,
        revision,
    })
}

fn require(value: Option<String>, key: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("Missing '{}' in the [dependency] table", key),
    }
}
