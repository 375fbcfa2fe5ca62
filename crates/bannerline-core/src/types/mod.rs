//! # Core Type Definitions
//!
//! This module contains the shared types of the bannerline pipeline:
//! - The unit of work (`SourceUnit`) and its result (`Processed`)
//! - The stage plugin contract (`TextTransform`)
//! - Error types (`BannerlineError`)
//!
//! ## Ownership
//!
//! A `SourceUnit` is owned by the pipeline for the duration of one call.
//! Stages only ever borrow its content and return a freshly allocated
//! `String`; nothing is mutated in place.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// SOURCE UNIT
// =============================================================================

/// The content of one file as it flows through the pipeline.
///
/// `path` is the `/`-separated path relative to the build context. It is
/// used for routing and reporting only; stages never see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    path: String,
    content: String,
}

impl SourceUnit {
    /// Create a new source unit.
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// The routing path of this unit.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The text content of this unit.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Size of the content in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the content is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

// =============================================================================
// PROCESSED OUTPUT
// =============================================================================

/// Result of running one `SourceUnit` through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processed {
    /// The transformed content.
    pub content: String,
    /// How many stages ran. Zero means the unit passed through untouched.
    pub stages_applied: usize,
}

impl Processed {
    /// Whether any stage touched the content.
    #[must_use]
    pub fn is_transformed(&self) -> bool {
        self.stages_applied > 0
    }
}

// =============================================================================
// TEXT TRANSFORM TRAIT
// =============================================================================

/// The plugin contract between a host pipeline and a stage.
///
/// - `transform`: maps the content of one file to new content
///
/// Stages must be `Send + Sync`: a host may call the same stage from many
/// threads at once, for different files, without coordination.
///
/// # Extension Point
///
/// Any host that can hand a `&str` to this trait can drive a stage; the
/// stage knows nothing about paths, rules or the host itself.
pub trait TextTransform: Send + Sync {
    /// Transform the content of one file.
    ///
    /// This is a pure, total function: no side effects, no failure.
    fn transform(&self, content: &str) -> String;

    /// Diagnostic name, used in logs and `inspect` output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur around the pipeline.
///
/// Stages themselves never fail. These cover routing configuration and the
/// host's file handling.
#[derive(Debug, Error)]
pub enum BannerlineError {
    /// A `test` or `exclude` pattern is not a valid regular expression.
    #[error("Invalid pattern in rule {rule}: {message}")]
    InvalidPattern { rule: usize, message: String },

    /// A rule lists no stages, or too many.
    #[error(
        "Rule {0} must list between 1 and {max} stages",
        max = crate::primitives::MAX_STAGES_PER_RULE
    )]
    EmptyRule(usize),

    /// A rule references a stage name the registry does not know.
    #[error("Unknown stage '{name}' in rule {rule}")]
    UnknownStage { rule: usize, name: String },

    /// The configuration file is missing, malformed, or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source file exceeds the size limit.
    #[error("Source file {path} is {size} bytes, maximum is {max} bytes")]
    SourceTooLarge { path: String, size: u64, max: u64 },

    /// A file that must be transformed is not UTF-8 text.
    #[error("'{0}' is not UTF-8 text")]
    NotText(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
