//! Generation of the embedded module tables.
//!
//! Each embed target turns one directory tree of text modules into a pair of
//! C++ artifacts: a definition file holding an array of
//! `(aliased path, payload)` string pairs, and a declaration header exposing
//! the array symbol and its element count. Directories appear in the table
//! as a `#directory` sentinel so the runtime can answer "is this a module or
//! a namespace" without touching the filesystem.
//!
//! Regeneration is gated on the tree fingerprint and is idempotent: the same
//! tree always renders byte-identical artifacts, and the hash record is only
//! written once both artifacts are on disk.

use super::fingerprint;
use super::walk::{TreeEntryKind, walk_tree};
use anyhow::{Context, Result};
use colored::*;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Table payload marking a directory rather than a module.
pub const DIRECTORY_SENTINEL: &str = "#directory";

/// A directory tree compiled into the final program as a literal table.
#[derive(Clone, Copy, Debug)]
pub struct EmbedTarget {
    /// Human-readable name for status output.
    pub label: &'static str,
    /// Tree root, relative to the project root.
    pub tree: &'static str,
    /// Replaces the tree root in every emitted path.
    pub virtual_prefix: &'static str,
    /// Path segment pruned from the walk (the CLI target keeps its own
    /// generated output out of its table this way).
    pub exclude_segment: Option<&'static str>,
    /// Artifact directory, relative to the project root.
    pub out_dir: &'static str,
    /// Base file name for the artifact trio.
    pub base_name: &'static str,
    /// Array symbol in the generated sources.
    pub symbol: &'static str,
    /// Element-count symbol in the generated header.
    pub count_symbol: &'static str,
}

impl EmbedTarget {
    pub fn definition_file(&self) -> String {
        format!("{}.cpp", self.base_name)
    }

    pub fn declaration_file(&self) -> String {
        format!("{}.h", self.base_name)
    }

    pub fn record_file(&self) -> String {
        format!("{}.hash", self.base_name)
    }

    pub fn record_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.out_dir).join(self.record_file())
    }
}

/// The runtime-library tree, addressed as `@std/...`.
pub const STDLIB_EMBED: EmbedTarget = EmbedTarget {
    label: "standard library",
    tree: "std/libs",
    virtual_prefix: "@std",
    exclude_segment: None,
    out_dir: "std/gen",
    base_name: "stdlib_modules",
    symbol: "kStdLibModules",
    count_symbol: "kStdLibModuleCount",
};

/// The CLI-commands tree, addressed as `@cli/...`. Its generated output
/// lives inside the tree, hence the exclusion.
pub const CLI_EMBED: EmbedTarget = EmbedTarget {
    label: "CLI commands",
    tree: "cli",
    virtual_prefix: "@cli",
    exclude_segment: Some("gen"),
    out_dir: "cli/gen",
    base_name: "cli_modules",
    symbol: "kCliModules",
    count_symbol: "kCliModuleCount",
};

pub fn builtin_targets() -> [EmbedTarget; 2] {
    [STDLIB_EMBED, CLI_EMBED]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Directory,
    Contents(String),
}

/// A walk entry rewritten to its virtual path, carrying the file text for
/// modules.
#[derive(Clone, Debug)]
pub struct AliasedEntry {
    pub aliased: String,
    pub payload: Payload,
}

/// Alias the walk and load module contents, preserving walk order.
fn alias_entries(tree_root: &Path, target: &EmbedTarget) -> Result<Vec<AliasedEntry>> {
    let entries = walk_tree(tree_root, target.exclude_segment)?;

    entries
        .par_iter()
        .map(|entry| {
            let aliased = format!("{}/{}", target.virtual_prefix, entry.slash_path());
            let payload = match entry.kind {
                TreeEntryKind::Directory => Payload::Directory,
                TreeEntryKind::File => {
                    let text =
                        fs::read_to_string(tree_root.join(&entry.relative)).with_context(|| {
                            format!(
                                "Failed to read {} for embedding",
                                tree_root.join(&entry.relative).display()
                            )
                        })?;
                    Payload::Contents(text)
                }
            };
            Ok(AliasedEntry { aliased, payload })
        })
        .collect()
}

/// Wrap `content` in a C++ raw string literal whose delimiter cannot occur
/// in the content. The tag grows deterministically, so identical content
/// always renders identically.
pub fn raw_literal(content: &str) -> String {
    let mut tag = String::new();
    while content.contains(&format!("){}\"", tag)) {
        tag.push('_');
    }
    format!("R\"{}({}){}\"", tag, content, tag)
}

/// Ordinary escaped string literal, used for the aliased paths.
fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn render_definition(target: &EmbedTarget, entries: &[AliasedEntry]) -> String {
    let mut out = String::new();
    out.push_str("// Generated by artisan -- do not edit by hand.\n");
    out.push_str(&format!("#include \"{}\"\n\n", target.declaration_file()));
    out.push_str(&format!(
        "const std::pair<const char*, const char*> {}[{}] = {{\n",
        target.symbol, target.count_symbol
    ));

    for entry in entries {
        let payload = match &entry.payload {
            Payload::Directory => quoted(DIRECTORY_SENTINEL),
            Payload::Contents(text) => raw_literal(text),
        };
        out.push_str(&format!("    {{{}, {}}},\n", quoted(&entry.aliased), payload));
    }

    out.push_str("};\n");
    out
}

fn render_declaration(target: &EmbedTarget, count: usize) -> String {
    let mut out = String::new();
    out.push_str("// Generated by artisan -- do not edit by hand.\n");
    out.push_str("#pragma once\n\n");
    out.push_str("#include <cstddef>\n");
    out.push_str("#include <utility>\n\n");
    out.push_str(&format!(
        "inline constexpr std::size_t {} = {};\n\n",
        target.count_symbol, count
    ));
    out.push_str(&format!(
        "extern const std::pair<const char*, const char*> {}[{}];\n",
        target.symbol, target.count_symbol
    ));
    out
}

/// Regenerate one target unconditionally. Both artifacts are fully written
/// before the hash record, so an interrupted run can at worst trigger a
/// spurious regeneration later, never a stale-but-fresh-looking table.
pub fn regenerate(project_root: &Path, target: &EmbedTarget) -> Result<()> {
    let tree_root = project_root.join(target.tree);
    let out_dir = project_root.join(target.out_dir);

    let entries = alias_entries(&tree_root, target)?;
    let definition = render_definition(target, &entries);
    let declaration = render_declaration(target, entries.len());

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let definition_path = out_dir.join(target.definition_file());
    fs::write(&definition_path, definition)
        .with_context(|| format!("Failed to write {}", definition_path.display()))?;

    let declaration_path = out_dir.join(target.declaration_file());
    fs::write(&declaration_path, declaration)
        .with_context(|| format!("Failed to write {}", declaration_path.display()))?;

    let digest = fingerprint::tree_fingerprint(&tree_root, target.exclude_segment)?;
    fingerprint::write_record(&target.record_path(project_root), &digest)?;

    Ok(())
}

/// Regenerate one target if its tree changed since the last successful pass.
/// Returns whether a regeneration happened.
pub fn regenerate_if_stale(project_root: &Path, target: &EmbedTarget) -> Result<bool> {
    let tree_root = project_root.join(target.tree);
    let record = target.record_path(project_root);

    if !fingerprint::is_stale(&tree_root, target.exclude_segment, &record)? {
        println!("   {} {} table up to date", "⚡".green(), target.label);
        return Ok(false);
    }

    println!("   {} Regenerating {} table...", "🔨".yellow(), target.label);
    regenerate(project_root, target)?;
    Ok(true)
}

/// Refresh every embed table. Runs before any build-generator invocation;
/// the two targets are independent and never share freshness state.
pub fn generate_all(project_root: &Path) -> Result<()> {
    for target in builtin_targets() {
        regenerate_if_stale(project_root, &target)?;
    }
    Ok(())
}
