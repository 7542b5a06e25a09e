//! # artisan - Build Orchestrator for the Runtime Workspace
//!
//! artisan drives the workspace's CMake/Ninja pipeline and keeps its
//! generated sources honest.
//!
//! ## Features
//!
//! - **Content-Addressed Codegen**: The standard-library and CLI-command
//!   trees are embedded into C++ table literals, regenerated only when a
//!   SHA-256 tree fingerprint says they changed
//! - **Pinned Dependencies**: Declarative TOML manifests drive shallow git
//!   clones to exact revisions
//! - **Build Drive-Through**: `configure`, `build`, and `run` chain
//!   automatically, per-platform build trees included
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch pinned dependencies
//! art fetch
//!
//! # Build and run the runtime
//! art run
//! ```
//!
//! ## Module Organization
//!
//! - [`embed`] - Tree walking, fingerprinting, and table generation
//! - [`deps`] - Manifest parsing and git fetch planning
//! - [`build`] - CMake/Ninja orchestration
//! - [`project`] - Root discovery and path computation

/// CMake/Ninja orchestration for configure, build, and run.
pub mod build;

/// Declarative dependency fetching.
pub mod deps;

/// Content-addressed embedding of directory trees into compilable sources.
pub mod embed;

/// Project discovery and build-path computation.
pub mod project;
