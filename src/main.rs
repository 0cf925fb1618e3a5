//! xhep-build command-line interface
//!
//! Builds the xhep C++ extension module and copies it next to the Python package

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process;

/// Display an error with optional backtrace information
fn display_error(err: &anyhow::Error, backtrace_enabled: bool) {
    eprintln!("error: {err}");

    // Show error chain
    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }

    if backtrace_enabled {
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:");
            eprintln!("{backtrace}");
        }
    }
}

#[derive(Parser)]
#[command(name = "xhep-build")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build the xhep native extension module", long_about = None)]
pub(crate) struct Cli {
    /// Print debug logging to stderr (also enabled by `XHEP_BUILD_DEBUG=1`)
    #[arg(long, global = true)]
    debug: bool,

    /// Show a backtrace when an error is reported (needs `RUST_BACKTRACE=1`)
    #[arg(long, global = true)]
    backtrace: bool,

    /// Defaults to `build` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the project lives and which config file describes it
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ProjectArgs {
    /// Project root holding the sources (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/xhep-build.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Link an optional library (pythia8, HepMC, fastjet); repeatable
    #[arg(long, value_name = "LIB")]
    enable: Vec<String>,

    /// Do not link an optional library even if the config enables it
    #[arg(long, value_name = "LIB")]
    disable: Vec<String>,

    /// Keep the previous build tree and skip the build when nothing changed
    #[arg(long)]
    no_clean: bool,

    /// Print the compiler and linker commands without running them
    #[arg(long)]
    dry_run: bool,

    /// Show every compiler invocation and the toolchain output
    #[arg(long, short)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, short, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the extension module and publish it
    Build(BuildArgs),

    /// Remove the build-output directory
    Clean {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// List the discovered sources and headers
    Sources {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Show the resolved build configuration
    Config {
        #[command(flatten)]
        project: ProjectArgs,

        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    xhep_build::init_debug(cli.debug);

    let result = match cli.command.unwrap_or_else(|| Commands::Build(BuildArgs::default())) {
        Commands::Build(args) => commands::build::run(&args),
        Commands::Clean { project } => commands::clean::run(&project),
        Commands::Sources { project } => commands::sources::run(&project),
        Commands::Config { project, json } => commands::config::run(&project, json),
        Commands::Completion { shell } => commands::completion::run(shell),
    };

    if let Err(e) = result {
        display_error(&e, cli.backtrace);
        process::exit(1);
    }
}

mod commands;
