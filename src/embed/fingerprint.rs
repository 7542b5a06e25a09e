//! Content fingerprinting and staleness detection for embed targets.
//!
//! A tree's fingerprint is a SHA-256 digest over a canonical encoding of the
//! sorted walk: every entry contributes a kind tag and its length-prefixed,
//! forward-slash-normalized relative path; files additionally contribute
//! their length-prefixed bytes. The digest therefore changes when any file's
//! content, name, or presence changes, and when an empty directory appears
//! or disappears, but not when timestamps or listing order change.
//!
//! The persisted record is a single line of lowercase hex next to the
//! generated artifacts. A missing record always reads as stale.

use super::walk::{TreeEntry, TreeEntryKind, walk_tree};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

fn hash_entry(hasher: &mut Sha256, root: &Path, entry: &TreeEntry) -> Result<()> {
    let path = entry.slash_path();
    let tag: &[u8] = match entry.kind {
        TreeEntryKind::Directory => b"dir",
        TreeEntryKind::File => b"file",
    };
    hasher.update(tag);
    hasher.update((path.len() as u64).to_be_bytes());
    hasher.update(path.as_bytes());

    if entry.kind == TreeEntryKind::File {
        let content = fs::read(root.join(&entry.relative)).with_context(|| {
            format!("Failed to read {} while fingerprinting", entry.relative.display())
        })?;
        hasher.update((content.len() as u64).to_be_bytes());
        hasher.update(&content);
    }
    Ok(())
}

/// Fingerprint of the tree under `root`, honoring the same exclusion the
/// generator uses.
pub fn tree_fingerprint(root: &Path, exclude_segment: Option<&str>) -> Result<String> {
    let entries = walk_tree(root, exclude_segment)?;
    let mut hasher = Sha256::new();
    for entry in &entries {
        hash_entry(&mut hasher, root, entry)?;
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// The previously persisted fingerprint, if any.
pub fn read_record(record_path: &Path) -> Result<Option<String>> {
    if !record_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(record_path)
        .with_context(|| format!("Failed to read hash record {}", record_path.display()))?;
    Ok(Some(content.trim().to_string()))
}

/// Overwrite the record wholesale. Call only after the artifact pair has
/// been fully written, so a crash can at worst force a spurious (safe)
/// regeneration on the next run.
pub fn write_record(record_path: &Path, digest: &str) -> Result<()> {
    fs::write(record_path, format!("{}\n", digest))
        .with_context(|| format!("Failed to write hash record {}", record_path.display()))
}

/// Does the tree under `root` differ from what the record says was last
/// generated? A missing record is unconditionally stale.
pub fn is_stale(root: &Path, exclude_segment: Option<&str>, record_path: &Path) -> Result<bool> {
    match read_record(record_path)? {
        None => Ok(true),
        Some(persisted) => {
            let current = tree_fingerprint(root, exclude_segment)?;
            Ok(persisted != current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("task")).unwrap();
        fs::write(root.join("task").join("spawn.luau"), "return spawn").unwrap();
        fs::write(root.join("time.luau"), "return time").unwrap();
        temp
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let temp = sample_tree();
        let a = tree_fingerprint(temp.path(), None).unwrap();
        let b = tree_fingerprint(temp.path(), None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_content_change_flips_fingerprint() {
        let temp = sample_tree();
        let before = tree_fingerprint(temp.path(), None).unwrap();
        fs::write(temp.path().join("time.luau"), "return time2").unwrap();
        let after = tree_fingerprint(temp.path(), None).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_added_file_flips_fingerprint() {
        let temp = sample_tree();
        let before = tree_fingerprint(temp.path(), None).unwrap();
        fs::write(temp.path().join("task").join("wait.luau"), "").unwrap();
        let after = tree_fingerprint(temp.path(), None).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_removed_file_flips_fingerprint() {
        let temp = sample_tree();
        let before = tree_fingerprint(temp.path(), None).unwrap();
        fs::remove_file(temp.path().join("time.luau")).unwrap();
        let after = tree_fingerprint(temp.path(), None).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_renamed_file_flips_fingerprint() {
        let temp = sample_tree();
        let before = tree_fingerprint(temp.path(), None).unwrap();
        fs::rename(
            temp.path().join("time.luau"),
            temp.path().join("clock.luau"),
        )
        .unwrap();
        let after = tree_fingerprint(temp.path(), None).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_empty_directory_flips_fingerprint() {
        let temp = sample_tree();
        let before = tree_fingerprint(temp.path(), None).unwrap();
        fs::create_dir(temp.path().join("net")).unwrap();
        let after = tree_fingerprint(temp.path(), None).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_touch_does_not_flip_fingerprint() {
        let temp = sample_tree();
        let before = tree_fingerprint(temp.path(), None).unwrap();
        // Rewriting identical bytes updates mtime but not content.
        fs::write(temp.path().join("time.luau"), "return time").unwrap();
        let after = tree_fingerprint(temp.path(), None).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_missing_record_is_stale() {
        let temp = sample_tree();
        let record = temp.path().join("absent.hash");
        assert!(is_stale(temp.path(), None, &record).unwrap());
    }

    #[test]
    fn test_record_round_trip_is_fresh() {
        let temp = sample_tree();
        let record_dir = TempDir::new().unwrap();
        let record = record_dir.path().join("tree.hash");

        let digest = tree_fingerprint(temp.path(), None).unwrap();
        write_record(&record, &digest).unwrap();

        assert_eq!(read_record(&record).unwrap().as_deref(), Some(digest.as_str()));
        assert!(!is_stale(temp.path(), None, &record).unwrap());

        fs::write(temp.path().join("extra.luau"), "x").unwrap();
        assert!(is_stale(temp.path(), None, &record).unwrap());
    }
}
