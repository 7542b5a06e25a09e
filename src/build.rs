//! CMake/Ninja orchestration for configure, build, and run.
//!
//! Every external tool gets its working directory passed explicitly; this
//! process never changes its own cwd, so the program launched by `run` still
//! observes the directory the user started from. Embed-table generation runs
//! before any build-generator invocation. Exit statuses from cmake, ninja,
//! and the launched executable propagate unchanged.

use crate::embed;
use crate::project::{self, BuildSettings, ProjectContext};
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Run an external tool with inherited stdio, returning its exit status.
fn run_tool(program: &str, args: &[String], cwd: &Path, verbose: bool) -> Result<i32> {
    if verbose {
        eprintln!("> {} {}", program, args.join(" "));
    }

    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .with_context(|| format!("Failed to run {}; is it installed and on PATH?", program))?;
    Ok(status.code().unwrap_or(1))
}

fn cmake_arguments(settings: &BuildSettings) -> Vec<String> {
    let project_path = project::project_path(settings);
    let mut args = vec![
        "-G".to_string(),
        "Ninja".to_string(),
        "-B".to_string(),
        project_path.to_string_lossy().into_owned(),
        format!("-DCMAKE_BUILD_TYPE={}", settings.config.cmake_name()),
        "-DCMAKE_EXPORT_COMPILE_COMMANDS=1".to_string(),
    ];

    if let Some(cxx) = &settings.cxx_compiler {
        args.push(format!("-DCMAKE_CXX_COMPILER={}", cxx));
    }
    if let Some(cc) = &settings.c_compiler {
        args.push(format!("-DCMAKE_C_COMPILER={}", cc));
    }

    args
}

fn run_cmake(ctx: &ProjectContext, settings: &BuildSettings) -> Result<i32> {
    let project_path = ctx.root.join(project::project_path(settings));
    if settings.clean && project_path.exists() {
        println!("{} Removing {}", "🧹".yellow(), project_path.display());
        fs::remove_dir_all(&project_path)
            .with_context(|| format!("Failed to remove {}", project_path.display()))?;
    }

    println!(
        "{} Configuring {} ({})...",
        "🔧".cyan(),
        settings.target,
        settings.config.cmake_name()
    );
    run_tool("cmake", &cmake_arguments(settings), &ctx.root, settings.verbose)
}

fn ensure_configured(ctx: &ProjectContext, settings: &BuildSettings) -> Result<i32> {
    if ctx.root.join(project::project_path(settings)).is_dir() {
        return Ok(0);
    }
    run_cmake(ctx, settings)
}

fn run_ninja(ctx: &ProjectContext, settings: &BuildSettings) -> Result<i32> {
    let project = project::project_path(settings).to_string_lossy().into_owned();
    let target_name = project::exe_name(&settings.target)?;

    if settings.clean {
        // A failed clean does not stop the build.
        run_tool(
            "ninja",
            &["-C".to_string(), project.clone(), "clean".to_string()],
            &ctx.root,
            settings.verbose,
        )?;
    }

    println!("{} Building {}...", "🔨".yellow(), settings.target);
    run_tool(
        "ninja",
        &["-C".to_string(), project, target_name],
        &ctx.root,
        settings.verbose,
    )
}

/// The `configure` subcommand: refresh embed tables, then generate build files.
pub fn configure(ctx: &ProjectContext, settings: &BuildSettings) -> Result<i32> {
    embed::generate_all(&ctx.root)?;
    run_cmake(ctx, settings)
}

/// The `build` subcommand. Configures first when the build tree is missing.
pub fn build(ctx: &ProjectContext, settings: &BuildSettings) -> Result<i32> {
    embed::generate_all(&ctx.root)?;

    let status = ensure_configured(ctx, settings)?;
    if status != 0 {
        return Ok(status);
    }

    run_ninja(ctx, settings)
}

/// The `run` subcommand. Configures and builds as needed, then launches the
/// target executable from the user's original invocation directory with any
/// trailing arguments.
pub fn run(ctx: &ProjectContext, settings: &BuildSettings, extra_args: &[String]) -> Result<i32> {
    embed::generate_all(&ctx.root)?;

    let status = ensure_configured(ctx, settings)?;
    if status != 0 {
        return Ok(status);
    }

    let exe = ctx.root.join(project::exe_path(settings)?);
    if settings.clean || !exe.is_file() {
        let status = run_ninja(ctx, settings)?;
        if status != 0 {
            return Ok(status);
        }
    }

    println!("{} Running {}\n", "▶".green(), exe.display());
    if settings.verbose {
        eprintln!("> {} {}", exe.display(), extra_args.join(" "));
    }

    let status = Command::new(&exe)
        .args(extra_args)
        .current_dir(&ctx.invocation_dir)
        .status()
        .with_context(|| format!("Failed to launch {}", exe.display()))?;
    Ok(status.code().unwrap_or(1))
}
