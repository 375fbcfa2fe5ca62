//! # Routing Rules
//!
//! Rules decide which files reach which stages. Stages themselves carry no
//! matching logic.
//!
//! - A rule matches a path when `test` matches and `exclude` (if set) does not
//! - Paths are `/`-separated and relative to the build context
//! - Every matching rule contributes its stages, in declaration order

use crate::BannerlineError;
use crate::primitives::{BANNER_STAGE_NAME, MAX_PATTERN_LENGTH, MAX_STAGES_PER_RULE};
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// RULE SPEC (uncompiled, as written in configuration)
// =============================================================================

/// A routing rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Regular expression a path must match.
    pub test: String,

    /// Regular expression that vetoes a match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// Stage names, listed in configuration order.
    #[serde(rename = "use")]
    pub stages: Vec<String>,
}

impl RuleSpec {
    /// Create a rule spec without an `exclude` pattern.
    #[must_use]
    pub fn new<I, S>(test: impl Into<String>, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            test: test.into(),
            exclude: None,
            stages: stages.into_iter().map(Into::into).collect(),
        }
    }

    /// Add an `exclude` pattern.
    #[must_use]
    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    /// The catch-all rule: every file goes through the banner stage.
    #[must_use]
    pub fn catch_all() -> Self {
        Self::new(".*", [BANNER_STAGE_NAME])
    }
}

// =============================================================================
// COMPILED RULE
// =============================================================================

/// A rule with its patterns compiled.
#[derive(Debug, Clone)]
pub struct Rule {
    index: usize,
    test: Regex,
    exclude: Option<Regex>,
    stages: Vec<String>,
}

impl Rule {
    /// Compile the spec found at position `index` in the rule list.
    pub fn compile(index: usize, spec: &RuleSpec) -> Result<Self, BannerlineError> {
        if spec.stages.is_empty() || spec.stages.len() > MAX_STAGES_PER_RULE {
            return Err(BannerlineError::EmptyRule(index));
        }

        let test = compile_pattern(index, &spec.test)?;
        let exclude = spec
            .exclude
            .as_deref()
            .map(|pattern| compile_pattern(index, pattern))
            .transpose()?;

        Ok(Self {
            index,
            test,
            exclude,
            stages: spec.stages.clone(),
        })
    }

    /// Position of this rule in the rule list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Stage names listed by this rule.
    #[must_use]
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    /// Whether this rule routes `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.test.is_match(path) && !self.exclude.as_ref().is_some_and(|re| re.is_match(path))
    }
}

fn compile_pattern(index: usize, pattern: &str) -> Result<Regex, BannerlineError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(BannerlineError::InvalidPattern {
            rule: index,
            message: format!(
                "pattern is {} bytes, maximum is {}",
                pattern.len(),
                MAX_PATTERN_LENGTH
            ),
        });
    }

    Regex::new(pattern).map_err(|e| BannerlineError::InvalidPattern {
        rule: index,
        message: e.to_string(),
    })
}

// =============================================================================
// RULE SET
// =============================================================================

/// An ordered list of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile every spec; the first invalid one aborts.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, BannerlineError> {
        let rules = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Rule::compile(index, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Rules that route `path`, in declaration order.
    pub fn matching<'s, 'p>(
        &'s self,
        path: &'p str,
    ) -> impl Iterator<Item = &'s Rule> + use<'s, 'p> {
        self.rules.iter().filter(move |rule| rule.matches(path))
    }

    /// Stage names `path` is routed through, in declaration order.
    #[must_use]
    pub fn chain_for(&self, path: &str) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .flat_map(|rule| rule.stages.iter().map(String::as_str))
            .collect()
    }

    /// All rules.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
