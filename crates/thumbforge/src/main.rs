//! Thumbforge CLI - Turn any file into a fixed-size thumbnail.
//!
//! Thumbforge picks a generator for the source file (ffmpeg for video,
//! LibreOffice for office documents, pdftoppm for PDFs, ...), then crops or
//! fits the result into the requested box and writes it in the requested
//! image format.
//!
//! # Usage
//!
//! ```bash
//! # Thumbnail a video with the configured defaults
//! thumbforge generate movie.mp4 thumbs/movie.webp
//!
//! # Letterbox a PDF onto a 300x300 canvas
//! thumbforge generate report.pdf report.png --format image/png -W 300 -H 300 --mode canvas
//!
//! # Which generators would handle a mime type
//! thumbforge generators --mime application/msword
//!
//! # View configuration
//! thumbforge config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Thumbforge - Turn any file into a fixed-size thumbnail.
#[derive(Parser, Debug)]
#[command(name = "thumbforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "THUMBFORGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a thumbnail for one file
    Generate(cli::generate::GenerateArgs),

    /// List generators in dispatch order
    Generators(cli::generators::GeneratorsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let loaded = match &cli.config {
        Some(path) => thumbforge_core::Config::load_from(path),
        None => thumbforge_core::Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `thumbforge config path`."
            );
            thumbforge_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Thumbforge v{}", thumbforge_core::VERSION);

    match cli.command {
        Commands::Generate(args) => cli::generate::execute(args, config).await,
        Commands::Generators(args) => cli::generators::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()).await,
    }
}
