//! # bannerline CLI Module
//!
//! This module implements the CLI interface for bannerline.
//!
//! ## Available Commands
//!
//! - `build` - Run a source tree through the pipeline (default)
//! - `transform` - Run a single file through the pipeline
//! - `inspect` - Show which stages a path is routed through
//! - `banner` - Print the built-in license banner
//! - `init` - Write a default `bannerline.toml`

mod commands;

use bannerline_core::BannerlineError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// bannerline - license banners for a whole source tree
///
/// Routes files through text-transform stages by path, the way a bundler
/// routes modules through loaders.
#[derive(Parser, Debug)]
#[command(name = "bannerline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a source tree
    Build {
        /// Source root (overrides config)
        #[arg(long)]
        context: Option<PathBuf>,

        /// Output root (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Files processed at once (overrides config)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Run one file through the pipeline
    Transform {
        /// File to transform
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the stage chain for a path
    Inspect {
        /// Path relative to the context, with `/` separators
        path: String,
    },

    /// Print the built-in license banner
    Banner,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), BannerlineError> {
    let config = cli.config.as_deref();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Build {
            context,
            output,
            jobs,
        }) => {
            let overrides = BuildOverrides {
                context,
                output,
                jobs,
            };
            cmd_build(config, overrides, json_mode, cli.quiet).await
        }
        Some(Commands::Transform { file, output }) => {
            cmd_transform(config, &file, output.as_deref()).await
        }
        Some(Commands::Inspect { path }) => cmd_inspect(config, &path, json_mode),
        Some(Commands::Banner) => cmd_banner(),
        Some(Commands::Init { force }) => cmd_init(config, force),
        None => {
            // No subcommand - build with the configured defaults
            cmd_build(config, BuildOverrides::default(), json_mode, cli.quiet).await
        }
    }
}
