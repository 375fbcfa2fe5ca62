//! # Banner Injection Stage
//!
//! Prepends a fixed license banner to the content of every file routed to it.
//!
//! ## Contract
//!
//! | Input | Output |
//! |-------|--------|
//! | `S` | `BANNER + S` |
//! | `""` | `BANNER` |
//! | `BANNER + S` | `BANNER + BANNER + S` |
//!
//! The stage never inspects the content. In particular it does not look for
//! an existing banner: a file routed through it twice carries two banners.

use crate::TextTransform;
use crate::primitives::{BANNER_STAGE_NAME, LICENSE_BANNER};

/// A stage that prepends a compile-time banner to file content.
///
/// The banner is a `&'static str`; it cannot be changed after construction
/// and is shared read-only between every call, on every thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BannerInjectionStage {
    banner: &'static str,
}

impl BannerInjectionStage {
    /// Create a stage that prepends [`LICENSE_BANNER`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            banner: LICENSE_BANNER,
        }
    }

    /// Create a stage that prepends another compile-time banner.
    #[must_use]
    pub const fn with_banner(banner: &'static str) -> Self {
        Self { banner }
    }

    /// The banner this stage prepends.
    #[must_use]
    pub const fn banner(&self) -> &'static str {
        self.banner
    }
}

impl Default for BannerInjectionStage {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTransform for BannerInjectionStage {
    fn transform(&self, content: &str) -> String {
        let mut out = String::with_capacity(self.banner.len() + content.len());
        out.push_str(self.banner);
        out.push_str(content);
        out
    }

    fn name(&self) -> &str {
        BANNER_STAGE_NAME
    }
}

// =============================================================================
// TESTS
// =============================================================================
