//! # bannerline-core
//!
//! The pure transform engine for bannerline - THE LOGIC.
//!
//! This crate implements text-transform pipeline stages and the rules that
//! route source files to them. Its one built-in stage prepends a fixed
//! license banner to every file it is handed.
//!
//! ## Architecture
//!
//! ```text
//!   SourceUnit ──► RuleSet (test / exclude) ──► stage chain ──► Processed
//!                                                   │
//!                                       StageRegistry ("banner", ...)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Stages are pure: `&str` in, new `String` out, no failure
//! - Stages are `Send + Sync` and hold no mutable state
//! - No async, no I/O, no logging (the host owns all of that)
//! - The banner is a compile-time constant

// =============================================================================
// MODULES
// =============================================================================

pub mod pipeline;
pub mod primitives;
pub mod registry;
pub mod rule;
pub mod stage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{BannerlineError, Processed, SourceUnit, TextTransform};

// =============================================================================
// RE-EXPORTS: Stages and Routing
// =============================================================================

pub use pipeline::Pipeline;
pub use primitives::{BANNER_STAGE_NAME, LICENSE_BANNER, MAX_SOURCE_SIZE};
pub use registry::StageRegistry;
pub use rule::{Rule, RuleSet, RuleSpec};
pub use stage::BannerInjectionStage;
