//! Per-test-type rules.

use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::pattern::PathPattern;

/// How far a matching rule extends the test scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Only modules that own a changed file
    ChangedModulesOnly,
    /// Changed modules and everything that depends on them
    #[default]
    AllDependents,
}

/// When to run one category of tests.
#[derive(Debug, Clone)]
pub struct TestTypeRule {
    enabled: bool,
    patterns: Vec<PathPattern>,
    propagation: Propagation,
}

impl TestTypeRule {
    /// Start building a rule.
    pub fn builder() -> TestTypeRuleBuilder {
        TestTypeRuleBuilder::default()
    }

    /// Whether this category takes part in analysis at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Compiled patterns, in declaration order.
    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    /// Propagation mode.
    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    /// Whether a changed file triggers this rule. A rule without patterns
    /// matches every file.
    pub fn matches_file(&self, path: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(path))
    }

    /// Serializable description of this rule.
    pub fn to_spec(&self) -> RuleSpec {
        RuleSpec {
            patterns: self.patterns.iter().map(|p| p.as_str().to_string()).collect(),
            run_only_in_changed_modules: self.propagation == Propagation::ChangedModulesOnly,
            enabled: self.enabled,
        }
    }
}

/// Rule as written in a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Path patterns that trigger the rule
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Restrict the scope to changed modules
    #[serde(default)]
    pub run_only_in_changed_modules: bool,

    /// Whether the rule is active
    #[serde(default)]
    pub enabled: bool,
}

impl RuleSpec {
    /// Compile into a rule, rejecting malformed patterns.
    pub fn compile(&self) -> Result<TestTypeRule> {
        let patterns = self
            .patterns
            .iter()
            .map(|p| PathPattern::parse(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(TestTypeRule {
            enabled: self.enabled,
            patterns,
            propagation: if self.run_only_in_changed_modules {
                Propagation::ChangedModulesOnly
            } else {
                Propagation::AllDependents
            },
        })
    }
}

/// Builder for [`TestTypeRule`]. Patterns are compiled by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct TestTypeRuleBuilder {
    spec: RuleSpec,
}

impl TestTypeRuleBuilder {
    /// Add a path pattern.
    pub fn when_changed(mut self, pattern: impl Into<String>) -> Self {
        self.spec.patterns.push(pattern.into());
        self
    }

    /// Add several path patterns.
    pub fn when_changed_any<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Restrict the scope to changed modules.
    pub fn only_changed_modules(mut self) -> Self {
        self.spec.run_only_in_changed_modules = true;
        self
    }

    /// Enable or disable the rule.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.spec.enabled = enabled;
        self
    }

    /// The uncompiled rule.
    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    /// Compile the rule.
    pub fn build(self) -> Result<TestTypeRule> {
        self.spec.compile()
    }
}

impl From<RuleSpec> for TestTypeRuleBuilder {
    fn from(spec: RuleSpec) -> Self {
        Self { spec }
    }
}
