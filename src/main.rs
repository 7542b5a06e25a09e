//! # artisan CLI Entry Point
//!
//! This is the main executable for the `art` command-line tool.
//! It parses CLI arguments using clap and routes subcommands to the library.
//!
//! ## Command Structure
//!
//! - **Dependencies**: `fetch`
//! - **Build**: `configure` (`tune`), `build` (`craft`), `run` (`play`)
//! - **Shell**: `completion`
//!
//! Exit codes from external tools (git, cmake, ninja, the launched program)
//! are forwarded unchanged; user-correctable errors print a single line.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;

use artisan::build;
use artisan::deps;
use artisan::project::{self, BuildConfig, BuildSettings, ProjectContext};

#[derive(Parser)]
#[command(name = "art")]
#[command(about = "Build orchestrator for the runtime workspace", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct BuildArgs {
    /// The thing to build or run
    #[arg(default_value = "runtime")]
    target: String,
    /// Show verbose output, including external command lines
    #[arg(short, long)]
    verbose: bool,
    /// Configuration (default is debug)
    #[arg(long, value_enum, default_value_t = BuildConfig::Debug)]
    config: BuildConfig,
    /// Perform a clean build
    #[arg(long)]
    clean: bool,
    /// Print out the path to the compiled binary and exit
    #[arg(short = 'w', long)]
    which: bool,
    /// C++ compiler to use
    #[arg(long)]
    cxx_compiler: Option<String>,
    /// C compiler to use
    #[arg(long)]
    c_compiler: Option<String>,
    /// Build with VS 2017 (Windows only; default is VS 2019)
    #[arg(long, conflicts_with = "vs2022")]
    vs2017: bool,
    /// Build with VS 2022 (Windows only; default is VS 2019)
    #[arg(long)]
    vs2022: bool,
}

impl BuildArgs {
    fn to_settings(&self) -> BuildSettings {
        BuildSettings {
            target: self.target.clone(),
            config: self.config,
            verbose: self.verbose,
            clean: self.clean,
            cxx_compiler: self.cxx_compiler.clone(),
            c_compiler: self.c_compiler.clone(),
            vs2017: self.vs2017,
            vs2022: self.vs2022,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch pinned dependencies declared under deps/
    Fetch {
        /// Show verbose output, including external command lines
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate build files for a target
    #[command(visible_alias = "tune")]
    Configure {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Compile a target
    #[command(visible_alias = "craft")]
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Compile and run a target
    #[command(visible_alias = "play")]
    Run {
        #[command(flatten)]
        args: BuildArgs,
        /// Arguments passed to the target program (after `--`)
        #[arg(last = true)]
        program_args: Vec<String>,
    },
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

/// Handle `--which` before doing any work: print the resolved executable
/// path and report that the subcommand is done.
fn print_which(ctx: &ProjectContext, settings: &BuildSettings) -> Result<()> {
    let exe = ctx.root.join(project::exe_path(settings)?);
    println!("{}", exe.display());
    Ok(())
}

fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(0)
        }

        Commands::Fetch { verbose } => {
            let ctx = ProjectContext::locate()?;
            deps::fetch_all(&ctx.root, verbose)
        }

        Commands::Configure { args } => {
            let ctx = ProjectContext::locate()?;
            let settings = args.to_settings();
            if args.which {
                print_which(&ctx, &settings)?;
                return Ok(0);
            }
            build::configure(&ctx, &settings)
        }

        Commands::Build { args } => {
            let ctx = ProjectContext::locate()?;
            let settings = args.to_settings();
            if args.which {
                print_which(&ctx, &settings)?;
                return Ok(0);
            }
            build::build(&ctx, &settings)
        }

        Commands::Run { args, program_args } => {
            let ctx = ProjectContext::locate()?;
            let settings = args.to_settings();
            if args.which {
                print_which(&ctx, &settings)?;
                return Ok(0);
            }
            build::run(&ctx, &settings, &program_args)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "x".red(), err);
            1
        }
    };
    std::process::exit(code);
}
