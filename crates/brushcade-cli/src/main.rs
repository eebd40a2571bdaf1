//! Brushcade CLI - generate brush packages from declarative specs.

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::process::ExitCode;

use brushcade_cli::commands;

/// Brushcade - procedural brush package generator
#[derive(Parser)]
#[command(name = "brushcade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a .brush package from a spec
    Generate {
        /// Path to the JSON spec, or - for stdin
        #[arg(short, long, default_value = "-")]
        spec: String,

        /// Output path (default: the spec's output, or <name>.brush)
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Validate a spec without generating anything
    Validate {
        /// Path to the JSON spec, or - for stdin
        #[arg(short, long, default_value = "-")]
        spec: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::builder()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .init();

    let result = match cli.command {
        Commands::Generate { spec, output, json } => {
            commands::generate::run(&spec, output.as_deref(), json)
        }
        Commands::Validate { spec, json } => commands::validate::run(&spec, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
