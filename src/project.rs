//! Project discovery and build-path computation.
//!
//! The orchestrator runs from anywhere inside a checkout. The project root is
//! found by walking up from the invocation directory until the sentinel file
//! appears, with an environment-variable escape hatch for out-of-tree use.
//! All path computation here is a pure function of the settings; nothing in
//! this module mutates the process working directory.

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// Marker file that identifies the workspace root.
pub const ROOT_SENTINEL: &str = ".artisan-root";

/// Fallback when the sentinel cannot be found by ascending from the cwd.
pub const ROOT_ENV: &str = "ARTISAN_ROOT_DIR";

/// Targets this workspace knows how to build, mapped to executable base names.
const TARGETS: &[(&str, &str)] = &[("runtime", "runtime")];

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BuildConfig {
    Debug,
    Release,
}

impl BuildConfig {
    /// Directory component under `build/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            BuildConfig::Debug => "debug",
            BuildConfig::Release => "release",
        }
    }

    /// Value handed to `-DCMAKE_BUILD_TYPE=`.
    pub fn cmake_name(self) -> &'static str {
        match self {
            BuildConfig::Debug => "Debug",
            BuildConfig::Release => "Release",
        }
    }
}

/// Everything the configure/build/run steps need to know, resolved once from
/// the command line.
#[derive(Clone, Debug)]
pub struct BuildSettings {
    pub target: String,
    pub config: BuildConfig,
    pub verbose: bool,
    pub clean: bool,
    pub cxx_compiler: Option<String>,
    pub c_compiler: Option<String>,
    pub vs2017: bool,
    pub vs2022: bool,
}

/// Where the tool was started and where the project lives.
///
/// Both are carried explicitly so subprocesses get their working directory as
/// a parameter; the launched program under `run` must still observe the
/// user's original cwd.
#[derive(Clone, Debug)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub invocation_dir: PathBuf,
}

impl ProjectContext {
    pub fn locate() -> Result<Self> {
        let invocation_dir =
            std::env::current_dir().context("Failed to determine the current directory")?;
        let root = find_project_root(&invocation_dir)?;
        Ok(Self {
            root,
            invocation_dir,
        })
    }
}

/// Ascend from `start` looking for the sentinel file.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(ROOT_SENTINEL).is_file() {
            return Ok(dir);
        }
        if !dir.pop() {
            break;
        }
    }

    if let Ok(root) = std::env::var(ROOT_ENV) {
        return Ok(PathBuf::from(root));
    }

    bail!(
        "Could not locate the project root. Your cwd must be inside a checkout \
         (marked by {}), or the {} environment variable must be set.",
        ROOT_SENTINEL,
        ROOT_ENV
    )
}

/// Executable file name for a target, with the platform suffix applied.
pub fn exe_name(target: &str) -> Result<String> {
    let base = TARGETS
        .iter()
        .find(|(name, _)| *name == target)
        .map(|(_, exe)| *exe)
        .ok_or_else(|| {
            let valid: Vec<&str> = TARGETS.iter().map(|(name, _)| *name).collect();
            anyhow!(
                "Unknown target '{}'. Valid targets: {}",
                target,
                valid.join(", ")
            )
        })?;

    if cfg!(windows) {
        Ok(format!("{}.exe", base))
    } else {
        Ok(base.to_string())
    }
}

/// Compiler label used as a build-tree path component on macOS/Windows.
pub fn compiler_label(settings: &BuildSettings) -> &'static str {
    if cfg!(target_os = "macos") {
        "xcode"
    } else if settings.vs2017 {
        "vs2017"
    } else if settings.vs2022 {
        "vs2022"
    } else {
        "vs2019"
    }
}

/// Build tree for this configuration, relative to the project root.
///
/// Linux builds key only on configuration; macOS and Windows interpose the
/// compiler label so toolchains do not stomp on each other's trees.
pub fn project_path(settings: &BuildSettings) -> PathBuf {
    let config = settings.config.dir_name();
    if cfg!(target_os = "linux") {
        Path::new("build").join(config)
    } else {
        Path::new("build")
            .join(compiler_label(settings))
            .join(config)
    }
}

/// Executable location for this configuration, relative to the project root.
pub fn exe_path(settings: &BuildSettings) -> Result<PathBuf> {
    Ok(project_path(settings).join(exe_name(&settings.target)?))
}
