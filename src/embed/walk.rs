//! Deterministic directory-tree traversal for the embed pipeline.
//!
//! Both the fingerprint and the generated tables consume the same walk, so
//! the ordering here is the single source of truth: pre-order, siblings in
//! lexicographic file-name order, independent of what the filesystem reports.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEntryKind {
    Directory,
    File,
}

/// One entry of a tree walk. `relative` is relative to the walked root.
#[derive(Clone, Debug)]
pub struct TreeEntry {
    pub relative: PathBuf,
    pub kind: TreeEntryKind,
}

impl TreeEntry {
    /// The relative path with forward slashes, regardless of platform.
    pub fn slash_path(&self) -> String {
        let parts: Vec<String> = self
            .relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        parts.join("/")
    }
}

/// Walk `root` in pre-order with sorted siblings.
///
/// Entries named `exclude_segment` are pruned together with their subtrees;
/// the CLI embed target uses this to keep its own generated output out of
/// the table. The root itself is not reported. Traversal errors (missing
/// root, unreadable directory, entry vanishing mid-walk) propagate.
pub fn walk_tree(root: &Path, exclude_segment: Option<&str>) -> Result<Vec<TreeEntry>> {
    if !root.is_dir() {
        bail!("Tree root {} does not exist or is not a directory", root.display());
    }

    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match exclude_segment {
            Some(segment) => entry.file_name().to_string_lossy() != segment,
            None => true,
        });

    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to walk tree at {}", root.display()))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .context("Walked entry escaped the tree root")?
            .to_path_buf();
        let kind = if entry.file_type().is_dir() {
            TreeEntryKind::Directory
        } else {
            TreeEntryKind::File
        };
        entries.push(TreeEntry { relative, kind });
    }

    Ok(entries)
}
