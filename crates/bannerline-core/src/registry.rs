//! # Stage Registry
//!
//! Maps the stage names used in routing rules (`use = ["banner"]`) to stage
//! instances. Lookups are ordered (`BTreeMap`) so listings are stable.

use crate::primitives::BANNER_STAGE_NAME;
use crate::{BannerInjectionStage, BannerlineError, TextTransform};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Named collection of stages available to a pipeline.
#[derive(Clone, Default)]
pub struct StageRegistry {
    stages: BTreeMap<String, Arc<dyn TextTransform>>,
}

impl StageRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in stages.
    ///
    /// Built-ins: `banner` -> [`BannerInjectionStage::new`].
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(BANNER_STAGE_NAME, Arc::new(BannerInjectionStage::new()));
        registry
    }

    /// Register a stage under `name`, returning the stage it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        stage: Arc<dyn TextTransform>,
    ) -> Option<Arc<dyn TextTransform>> {
        self.stages.insert(name.into(), stage)
    }

    /// Look up a stage by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn TextTransform>> {
        self.stages.get(name).cloned()
    }

    /// Resolve a stage referenced by rule number `rule`.
    pub fn resolve(
        &self,
        rule: usize,
        name: &str,
    ) -> Result<Arc<dyn TextTransform>, BannerlineError> {
        self.get(name).ok_or_else(|| BannerlineError::UnknownStage {
            rule,
            name: name.to_string(),
        })
    }

    /// Registered names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(String::as_str)
    }

    /// Number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether no stages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.stages.keys().collect::<Vec<_>>())
            .finish()
    }
}
