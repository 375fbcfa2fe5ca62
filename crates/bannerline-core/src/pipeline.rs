//! # Pipeline
//!
//! Runs one `SourceUnit` through the stages its path is routed to.
//!
//! ## Chain Order
//!
//! Matching rules contribute their stages in declaration order; the chain is
//! then applied right to left, so the last listed stage sees the raw content
//! first. With `use = ["a", "b"]`, the output is `a(b(content))`.
//!
//! Stage names are resolved when the pipeline is built, never mid-build.

use crate::registry::StageRegistry;
use crate::rule::{RuleSet, RuleSpec};
use crate::{BannerlineError, Processed, SourceUnit, TextTransform};
use std::fmt;
use std::sync::Arc;

/// A compiled rule together with its resolved stages.
struct Route {
    stages: Vec<Arc<dyn TextTransform>>,
}

/// Rule-routed stage pipeline.
///
/// Immutable once built; share it behind an `Arc` to process files from
/// many tasks at once.
pub struct Pipeline {
    rules: RuleSet,
    routes: Vec<Route>,
}

impl Pipeline {
    /// Build a pipeline, resolving every stage name against `registry`.
    pub fn new(rules: RuleSet, registry: &StageRegistry) -> Result<Self, BannerlineError> {
        let routes = rules
            .iter()
            .map(|rule| {
                let stages = rule
                    .stages()
                    .iter()
                    .map(|name| registry.resolve(rule.index(), name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Route { stages })
            })
            .collect::<Result<Vec<_>, BannerlineError>>()?;

        Ok(Self { rules, routes })
    }

    /// Compile `specs` and build a pipeline from them.
    pub fn from_specs(
        specs: &[RuleSpec],
        registry: &StageRegistry,
    ) -> Result<Self, BannerlineError> {
        Self::new(RuleSet::compile(specs)?, registry)
    }

    /// The pipeline every file goes through by default: one catch-all
    /// banner rule.
    pub fn banner_only() -> Result<Self, BannerlineError> {
        Self::from_specs(&[RuleSpec::catch_all()], &StageRegistry::with_builtins())
    }

    /// The routing rules.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Stages `path` is routed through, in declaration order.
    #[must_use]
    pub fn chain_for(&self, path: &str) -> Vec<Arc<dyn TextTransform>> {
        self.rules
            .iter()
            .zip(&self.routes)
            .filter(|(rule, _)| rule.matches(path))
            .flat_map(|(_, route)| route.stages.iter().cloned())
            .collect()
    }

    /// Run `unit` through its chain.
    ///
    /// A unit no rule matches comes back with identical content and
    /// `stages_applied == 0`.
    #[must_use]
    pub fn process(&self, unit: &SourceUnit) -> Processed {
        let chain = self.chain_for(unit.path());

        let content = chain
            .iter()
            .rev()
            .fold(unit.content().to_string(), |content, stage| {
                stage.transform(&content)
            });

        Processed {
            content,
            stages_applied: chain.len(),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("rules", &self.rules.len())
            .finish()
    }
}
