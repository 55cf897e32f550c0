//! Karl CLI - Command-line interface
//!
//! Warms images and icon glyphs through the karl preloader and reports how
//! requests were deduplicated.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::config::ConfigArgs;
use commands::icons::IconsArgs;
use commands::images::ImagesArgs;
use runner::CliRunner;

/// Preload images and icon glyphs ahead of use.
#[derive(Debug, Parser)]
#[command(name = "karl", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Preload image sources (URLs or local paths)
    Images {
        /// Image sources to preload
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Preload Material icon glyphs by name
    Icons {
        /// Icon names to preload (e.g. favorite, home)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show the effective configuration
    Config {
        /// Print only the config file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Images { sources } => CliRunner::new(cli.config.as_deref(), cli.verbose)
            .and_then(|runner| commands::images::run(&runner, ImagesArgs { sources })),
        Commands::Icons { names } => CliRunner::new(cli.config.as_deref(), cli.verbose)
            .and_then(|runner| commands::icons::run(&runner, IconsArgs { names })),
        Commands::Config { path } => commands::config::run(ConfigArgs {
            config_path: cli.config,
            path_only: path,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", console::style("error:").red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}
