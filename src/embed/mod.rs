//! Content-addressed embedding of directory trees into compilable sources.
//!
//! Two trees in the workspace (the runtime standard library and the CLI
//! commands) are serialized into C++ table literals so the final program
//! needs no filesystem access to load them. A SHA-256 fingerprint of each
//! tree decides whether the tables must be regenerated.

mod fingerprint;
mod generate;
mod walk;

pub use fingerprint::{is_stale, tree_fingerprint};
pub use generate::{
    CLI_EMBED, DIRECTORY_SENTINEL, EmbedTarget, STDLIB_EMBED, builtin_targets, generate_all,
    raw_literal, regenerate, regenerate_if_stale,
};
pub use walk::{TreeEntry, TreeEntryKind, walk_tree};
