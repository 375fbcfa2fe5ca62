//! # Innate Primitives
//!
//! Hardcoded constants for the bannerline CORE.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! Nothing here is read from configuration.
//!
//! ## Primitives
//!
//! 1. **License Banner**: the text every routed source file is prefixed with.
//! 2. **Built-in Stage Name**: the name configuration uses to reach the banner stage.
//! 3. **Input Limits**: bounds on what the host will hand to a stage.

/// The license banner prepended by [`crate::BannerInjectionStage`].
///
/// The trailing newline is part of the banner; the stage adds no separator
/// of its own.
pub const LICENSE_BANNER: &str = "/**
 * MIT Licensed
 * Copyright (c) 2022-present ByteDance, Inc. and its affiliates.
 * https://github.com/modern-js-dev/rspack/blob/main/LICENSE
 */
";

/// Registry name of the built-in banner stage.
pub const BANNER_STAGE_NAME: &str = "banner";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a single source file (64 MiB).
///
/// Files larger than this are rejected before being read into memory.
pub const MAX_SOURCE_SIZE: u64 = 64 * 1024 * 1024;

/// Maximum length of a `test` or `exclude` pattern.
pub const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum number of stages a single rule may list.
pub const MAX_STAGES_PER_RULE: usize = 32;
