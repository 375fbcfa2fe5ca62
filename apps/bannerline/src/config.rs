//! # Build Configuration
//!
//! Loads `bannerline.toml`: where sources live, where output goes, and which
//! files are routed to which stages.
//!
//! ## Lookup Order
//!
//! 1. `--config <PATH>` (must exist)
//! 2. `BANNERLINE_CONFIG` environment variable
//! 3. `./bannerline.toml`
//! 4. Built-in default: every file under `.` through `banner`, into `dist`
//!
//! Relative `context` and `output` paths are resolved against the directory
//! holding the config file. The banner text itself is never configurable.

use bannerline_core::{BannerlineError, Pipeline, RuleSpec, StageRegistry};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bannerline.toml";

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "BANNERLINE_CONFIG";

/// Template written by `bannerline init`.
pub const CONFIG_TEMPLATE: &str = r#"# bannerline configuration

# Source root, relative to this file.
context = "src"

# Output root, relative to this file.
output = "dist"

# Files processed at once. Defaults to the number of CPUs.
# jobs = 8

# Every file goes through the license banner stage.
[[rules]]
test = ".*"
use = ["banner"]

# Rules are matched against paths relative to `context`, with `/` separators.
# A file matched by several rules runs through all of their stages.
# [[rules]]
# test = "\\.svg$"
# exclude = "^vendor/"
# use = ["banner"]
"#;

fn default_context() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

fn default_rules() -> Vec<RuleSpec> {
    vec![RuleSpec::catch_all()]
}

/// Parsed `bannerline.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Source root.
    #[serde(default = "default_context")]
    pub context: PathBuf,

    /// Output root.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Maximum number of files processed at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Routing rules, in declaration order.
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleSpec>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            context: default_context(),
            output: default_output(),
            jobs: None,
            rules: default_rules(),
        }
    }
}

impl BuildConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, BannerlineError> {
        let config: Self =
            toml::from_str(text).map_err(|e| BannerlineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self, BannerlineError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BannerlineError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;

        let config = Self::from_toml_str(&text).map_err(|e| match e {
            BannerlineError::Config(message) => {
                BannerlineError::Config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })?;

        let base = path.parent().unwrap_or(Path::new("."));
        Ok(config.relative_to(base))
    }

    /// Resolve relative `context` and `output` against `base`.
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.context.is_relative() {
            self.context = base.join(&self.context);
        }
        if self.output.is_relative() {
            self.output = base.join(&self.output);
        }
        self
    }

    /// Check the config for inconsistencies the parser cannot catch.
    ///
    /// Rule patterns and stage names are checked when the pipeline is built.
    pub fn validate(&self) -> Result<(), BannerlineError> {
        if self.jobs == Some(0) {
            return Err(BannerlineError::Config("jobs must be at least 1".to_string()));
        }

        if self.rules.is_empty() {
            return Err(BannerlineError::Config(
                "at least one [[rules]] entry is required".to_string(),
            ));
        }

        if self.context == self.output {
            return Err(BannerlineError::Config(format!(
                "context and output must differ (both are '{}')",
                self.context.display()
            )));
        }

        Ok(())
    }

    /// Number of files to process at once.
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4)
        })
    }

    /// Build the stage pipeline for this config's rules.
    pub fn pipeline(&self) -> Result<Pipeline, BannerlineError> {
        Pipeline::from_specs(&self.rules, &StageRegistry::with_builtins())
    }
}

/// Find the config file to use, if any.
///
/// Lookup order: `explicit`, then `$BANNERLINE_CONFIG`, then
/// `./bannerline.toml`. Only an explicit or env-provided path that does not
/// exist is an error.
pub fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, BannerlineError> {
    let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    resolve_config_file(explicit, from_env, Path::new("."))
}

/// [`find_config_file`] with the environment value and working directory
/// passed in.
pub fn resolve_config_file(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    dir: &Path,
) -> Result<Option<PathBuf>, BannerlineError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(BannerlineError::Config(format!(
            "config file '{}' not found",
            path.display()
        )));
    }

    if let Some(path) = from_env {
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(BannerlineError::Config(format!(
            "{} points to '{}', which does not exist",
            CONFIG_ENV_VAR,
            path.display()
        )));
    }

    let local = dir.join(DEFAULT_CONFIG_FILE);
    Ok(local.is_file().then_some(local))
}

/// Load the config found by [`find_config_file`], or the built-in default.
pub fn load_config(explicit: Option<&Path>) -> Result<BuildConfig, BannerlineError> {
    match find_config_file(explicit)? {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            BuildConfig::load(&path)
        }
        None => {
            tracing::debug!("No config file found, using built-in defaults");
            Ok(BuildConfig::default())
        }
    }
}
