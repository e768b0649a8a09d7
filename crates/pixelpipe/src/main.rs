//! Pixelpipe CLI - apply an ordered pipeline of pixel transforms to an image.
//!
//! Loads one image, runs the operations in order, and writes the result. The
//! process exits 0 when the pipeline reports `SUCCESS` and 1 otherwise.
//!
//! # Usage
//!
//! ```bash
//! # Inline operations
//! pixelpipe run in.png out.png --op grayscale --op brightness:factor=1.2
//!
//! # Operations from a pipeline document, machine-readable result
//! pixelpipe run in.jpg out.jpg --pipeline thumbs.toml --json
//!
//! # View configuration
//! pixelpipe config show
//! ```

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod cli;
mod logging;

/// Pixelpipe - apply an ordered pipeline of pixel transforms to an image.
#[derive(Parser, Debug)]
#[command(name = "pixelpipe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a pipeline on one image
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match pixelpipe_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixelpipe config path`."
            );
            pixelpipe_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Pixelpipe v{}", pixelpipe_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config),
        Commands::Config(args) => cli::config::execute(args, &config).map(|()| ExitCode::SUCCESS),
    }
}
