//! # bannerline - License Banner Pipeline
//!
//! The main binary for bannerline.
//!
//! This application provides:
//! - A build command that runs a whole source tree through the pipeline
//! - Single-file transforms and rule inspection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   apps/bannerline (THE BINARY)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   Config    │    │   Build Runner   │    │
//! │  │  (clap)     │    │   (toml)    │    │ (tokio, walkdir) │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                  ┌──────────────────┐                          │
//! │                  │ bannerline-core  │                          │
//! │                  │   (THE LOGIC)    │                          │
//! │                  └──────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Build using ./bannerline.toml
//! bannerline build
//!
//! # One-off transform
//! bannerline transform src/main.tsx -o out.tsx
//!
//! # Which stages would a path go through?
//! bannerline inspect src/logo.svg
//! ```

use bannerline::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing — BANNERLINE_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("BANNERLINE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "bannerline=debug"
    } else if cli.quiet {
        "bannerline=warn"
    } else {
        "bannerline=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so `transform` and `banner` output can be piped.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
