#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]

mod commands;
mod logging;

use clap::Parser;
use hxp_core::{Config, Target};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hxp")]
#[command(author, version, about = "Compiler and interpreter for the Hyper language", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Compile a .hxp file to C or JavaScript
    Compile {
        /// Source file
        file: PathBuf,

        /// Output file (defaults to the input with the target's extension)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Target language: c, js, bytecode, asm, llvm
        #[arg(short, long)]
        target: Option<Target>,

        /// Enable optimizations
        #[arg(short = 'O', long)]
        optimize: bool,

        /// Include source file information in the output
        #[arg(short = 'g', long = "debug")]
        debug_info: bool,

        /// Print the generated code instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Run a .hxp file with the interpreter
    Run {
        /// File to run (.hxp; .hyb and .c are recognized but not runnable yet)
        file: PathBuf,
    },

    /// Print the tokens of a .hxp file
    Tokens {
        /// Source file
        file: PathBuf,
    },

    /// Parse a .hxp file and print its syntax tree
    Ast {
        /// Source file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // Project file first, then command-line flags on top
    let config = Config::discover(cwd).into_diagnostic()?;
    let verbosity = cli.verbose.max(config.verbosity);
    let json_logs = cli.json || config.json_logs;
    let config = config.with_verbosity(verbosity).with_json_logs(json_logs);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Compile {
            file,
            output,
            target,
            optimize,
            debug_info,
            stdout,
        }) => {
            let span = tracing::info_span!("compile", cmd = "compile", cwd = %config.cwd.display());
            let _guard = span.enter();
            let action = commands::compile::CompileAction {
                file,
                output,
                target: target.unwrap_or(config.target),
                optimize: optimize || config.optimize,
                debug_info: debug_info || config.debug_info,
                stdout,
            };
            commands::compile::run(&config, action, cli.json)
        }
        Some(Commands::Run { file }) => {
            let span = tracing::info_span!("run", cmd = "run", cwd = %config.cwd.display());
            let _guard = span.enter();
            commands::run::run(&config, &file, cli.json)
        }
        Some(Commands::Tokens { file }) => commands::tokens::run(&config, &file, cli.json),
        Some(Commands::Ast { file }) => commands::ast::run(&config, &file, cli.json),
    }
}
