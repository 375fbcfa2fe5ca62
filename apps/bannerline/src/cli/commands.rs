//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::{BuildConfig, CONFIG_TEMPLATE, DEFAULT_CONFIG_FILE, load_config};
use crate::host::{BuildReport, BuildRunner, transform_file};
use bannerline_core::{BannerlineError, LICENSE_BANNER, Pipeline};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Validate output path for security.
///
/// For output files, we validate the parent directory exists and is a directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, BannerlineError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Canonicalize parent to resolve ".." and symlinks
    let canonical_parent = parent.canonicalize().map_err(|e| {
        BannerlineError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(BannerlineError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| BannerlineError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// BUILD COMMAND
// =============================================================================

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOverrides {
    pub context: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub jobs: Option<usize>,
}

impl BuildOverrides {
    /// Apply these overrides on top of `config`.
    #[must_use]
    pub fn apply(self, mut config: BuildConfig) -> BuildConfig {
        if let Some(context) = self.context {
            config.context = context;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.jobs.is_some() {
            config.jobs = self.jobs;
        }
        config
    }
}

/// Process a source tree.
pub async fn cmd_build(
    config_path: Option<&Path>,
    overrides: BuildOverrides,
    json_mode: bool,
    quiet: bool,
) -> Result<(), BannerlineError> {
    let config = overrides.apply(load_config(config_path)?);
    let runner = BuildRunner::from_config(&config)?;
    let report = runner.run().await?;

    if json_mode {
        let output = serde_json::to_string_pretty(&report)
            .map_err(|e| BannerlineError::SerializationError(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    if !quiet {
        print_report(&report, &config);
    }

    Ok(())
}

fn print_report(report: &BuildReport, config: &BuildConfig) {
    println!("bannerline Build");
    println!("================");
    println!("Context: {}", config.context.display());
    println!("Output:  {}", config.output.display());
    println!();
    println!("Transformed:    {}", report.transformed);
    println!("Passed through: {}", report.passed_through);
    println!("Copied:         {}", report.copied);
    println!("Elapsed:        {} ms", report.elapsed_ms);
}

// =============================================================================
// TRANSFORM COMMAND
// =============================================================================

/// Run one file through the configured pipeline.
pub async fn cmd_transform(
    config_path: Option<&Path>,
    file: &Path,
    output: Option<&Path>,
) -> Result<(), BannerlineError> {
    let config = load_config(config_path)?;
    let pipeline = config.pipeline()?;

    tracing::info!("Transforming {}", file.display());
    let content = transform_file(&pipeline, &config.context, file).await?;

    match output {
        Some(path) => {
            let validated = validate_output_path(path)?;
            tokio::fs::write(&validated, content.as_bytes())
                .await
                .map_err(|e| {
                    BannerlineError::IoError(format!(
                        "Cannot write '{}': {}",
                        validated.display(),
                        e
                    ))
                })?;
            tracing::info!("Wrote {}", validated.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// How one path is routed through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInspection {
    pub path: String,
    /// Indices of matching rules, in declaration order.
    pub matched_rules: Vec<usize>,
    /// Stage names in declaration order.
    pub chain: Vec<String>,
    /// Stage names in the order they run (right to left).
    pub execution_order: Vec<String>,
}

/// Work out which rules route `path` and the order its stages run in.
#[must_use]
pub fn inspect_route(pipeline: &Pipeline, path: &str) -> RouteInspection {
    let matched_rules = pipeline
        .rules()
        .matching(path)
        .map(|rule| rule.index())
        .collect();
    let chain: Vec<String> = pipeline
        .rules()
        .chain_for(path)
        .into_iter()
        .map(str::to_string)
        .collect();
    let execution_order = chain.iter().rev().cloned().collect();

    RouteInspection {
        path: path.to_string(),
        matched_rules,
        chain,
        execution_order,
    }
}

/// Show which rules match a path and the order its stages run in.
pub fn cmd_inspect(
    config_path: Option<&Path>,
    path: &str,
    json_mode: bool,
) -> Result<(), BannerlineError> {
    let config = load_config(config_path)?;
    let inspection = inspect_route(&config.pipeline()?, path);

    if json_mode {
        let output = serde_json::to_string_pretty(&inspection)
            .map_err(|e| BannerlineError::SerializationError(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    println!("Path: {}", inspection.path);
    if inspection.matched_rules.is_empty() {
        println!("No rule matches; the file passes through unchanged.");
        return Ok(());
    }

    println!(
        "Matched rules: {}",
        inspection
            .matched_rules
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Execution order:");
    for (step, name) in inspection.execution_order.iter().enumerate() {
        println!("  {}. {}", step + 1, name);
    }

    Ok(())
}

// =============================================================================
// BANNER COMMAND
// =============================================================================

/// Print the built-in banner exactly as it is prepended.
pub fn cmd_banner() -> Result<(), BannerlineError> {
    print!("{}", LICENSE_BANNER);
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write the default config template.
pub fn cmd_init(config_path: Option<&Path>, force: bool) -> Result<(), BannerlineError> {
    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    write_config_template(path, force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Write [`CONFIG_TEMPLATE`] to `path`, refusing to overwrite unless `force`.
pub fn write_config_template(path: &Path, force: bool) -> Result<(), BannerlineError> {
    if path.exists() && !force {
        return Err(BannerlineError::Config(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let validated = validate_output_path(path)?;
    std::fs::write(&validated, CONFIG_TEMPLATE).map_err(|e| {
        BannerlineError::IoError(format!("Cannot write '{}': {}", validated.display(), e))
    })
}
