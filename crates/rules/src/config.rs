//! Impact analysis configuration.
//!
//! [`ImpactConfig`] is assembled once per invocation, either through
//! [`ImpactConfig::builder`] or from a JSON [`ConfigFile`], and is immutable
//! afterwards. Every pattern is compiled while the config is assembled, so
//! malformed input never reaches the matching loop.

use impactscope_core::TestType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use crate::error::{ConfigError, Result};
use crate::rule::{RuleSpec, TestTypeRule, TestTypeRuleBuilder};

/// Root-scope path fragments that force a full run by default.
pub const DEFAULT_CRITICAL_PATHS: [&str; 6] = [
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "settings.gradle.kts",
    "gradle.properties",
    "gradle/",
];

/// File extensions linted by default.
pub const DEFAULT_LINT_EXTENSIONS: [&str; 3] = ["kt", "java", "xml"];

/// Build variant used by default for task resolution.
pub const DEFAULT_VARIANT: &str = "Debug";

/// Build variants used to resolve concrete task names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildVariants {
    /// Variant for JVM unit tests, e.g. `Debug` for `testDebugUnitTest`
    pub unit: String,

    /// Variant for instrumented tests, e.g. `Debug` for `connectedDebugAndroidTest`
    pub instrumented: String,

    /// Variant for compilation, e.g. `Debug` for `compileDebugKotlin`
    pub compile: String,
}

impl Default for BuildVariants {
    fn default() -> Self {
        Self {
            unit: DEFAULT_VARIANT.to_string(),
            instrumented: DEFAULT_VARIANT.to_string(),
            compile: DEFAULT_VARIANT.to_string(),
        }
    }
}

/// Configuration file layout.
///
/// Absent keys take the same defaults as [`ImpactConfig::default`]. Rules
/// are keyed by test-type name, case-insensitively; two keys naming the
/// same type are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Run every enabled test type everywhere on critical changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_all_tests_on_critical_changes: Option<bool>,

    /// Fall back to unit tests of affected modules when no rule matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_unit_tests_by_default: Option<bool>,

    /// Root-scope critical fragments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_paths: Option<Vec<String>>,

    /// Extensions of files to lint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint_file_extensions: Option<Vec<String>>,

    /// Build variants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<BuildVariants>,

    /// Rules keyed by test-type name
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSpec>,
}

/// Immutable impact analysis configuration.
#[derive(Debug, Clone)]
pub struct ImpactConfig {
    run_all_tests_on_critical_changes: bool,
    run_unit_tests_by_default: bool,
    critical_paths: Vec<String>,
    lint_file_extensions: Vec<String>,
    variants: BuildVariants,
    rules: BTreeMap<TestType, TestTypeRule>,
}

impl ImpactConfig {
    /// Create a builder seeded with defaults.
    pub fn builder() -> ImpactConfigBuilder {
        ImpactConfigBuilder::new()
    }

    /// Assemble from a parsed configuration file.
    pub fn from_file(file: ConfigFile) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(v) = file.run_all_tests_on_critical_changes {
            builder = builder.run_all_tests_on_critical_changes(v);
        }
        if let Some(v) = file.run_unit_tests_by_default {
            builder = builder.run_unit_tests_by_default(v);
        }
        if let Some(paths) = file.critical_paths {
            builder = builder.critical_paths(paths);
        }
        if let Some(exts) = file.lint_file_extensions {
            builder = builder.lint_file_extensions(exts);
        }
        if let Some(variants) = file.variants {
            builder = builder.variants(variants);
        }

        let mut seen = BTreeSet::new();
        for (name, spec) in file.rules {
            let test_type: TestType = name
                .parse()
                .map_err(|_| ConfigError::UnknownTestType(name.clone()))?;
            if !seen.insert(test_type) {
                return Err(ConfigError::DuplicateTestType(name));
            }
            builder = builder.test_type(test_type, spec);
        }

        builder.build()
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        tracing::debug!(
            "Loaded config from {} with {} rules",
            path.as_ref().display(),
            config.rules.len()
        );
        Ok(config)
    }

    /// Whether critical changes escalate to a whole-project run.
    pub fn run_all_tests_on_critical_changes(&self) -> bool {
        self.run_all_tests_on_critical_changes
    }

    /// Whether unit tests are selected when no rule matches.
    pub fn run_unit_tests_by_default(&self) -> bool {
        self.run_unit_tests_by_default
    }

    /// Root-scope critical fragments.
    pub fn critical_paths(&self) -> &[String] {
        &self.critical_paths
    }

    /// Extensions of files to lint.
    pub fn lint_file_extensions(&self) -> &[String] {
        &self.lint_file_extensions
    }

    /// Build variants.
    pub fn variants(&self) -> &BuildVariants {
        &self.variants
    }

    /// All configured rules.
    pub fn rules(&self) -> &BTreeMap<TestType, TestTypeRule> {
        &self.rules
    }

    /// Rule for one category.
    pub fn rule(&self, test_type: TestType) -> Option<&TestTypeRule> {
        self.rules.get(&test_type)
    }

    /// Whether a category has an enabled rule. Categories without a rule
    /// are disabled.
    pub fn is_enabled(&self, test_type: TestType) -> bool {
        self.rule(test_type).map(|r| r.is_enabled()).unwrap_or(false)
    }

    /// Serializable form of this configuration.
    pub fn to_file(&self) -> ConfigFile {
        ConfigFile {
            run_all_tests_on_critical_changes: Some(self.run_all_tests_on_critical_changes),
            run_unit_tests_by_default: Some(self.run_unit_tests_by_default),
            critical_paths: Some(self.critical_paths.clone()),
            lint_file_extensions: Some(self.lint_file_extensions.clone()),
            variants: Some(self.variants.clone()),
            rules: self
                .rules
                .iter()
                .map(|(t, r)| (t.as_str().to_string(), r.to_spec()))
                .collect(),
        }
    }
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            run_all_tests_on_critical_changes: true,
            run_unit_tests_by_default: true,
            critical_paths: DEFAULT_CRITICAL_PATHS.iter().map(|s| s.to_string()).collect(),
            lint_file_extensions: DEFAULT_LINT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            variants: BuildVariants::default(),
            rules: BTreeMap::new(),
        }
    }
}

/// Builder for [`ImpactConfig`].
#[derive(Debug, Clone)]
pub struct ImpactConfigBuilder {
    run_all_tests_on_critical_changes: bool,
    run_unit_tests_by_default: bool,
    critical_paths: Vec<String>,
    lint_file_extensions: Vec<String>,
    variants: BuildVariants,
    rules: BTreeMap<TestType, TestTypeRuleBuilder>,
}

impl ImpactConfigBuilder {
    /// Create a builder seeded with defaults.
    pub fn new() -> Self {
        let defaults = ImpactConfig::default();
        Self {
            run_all_tests_on_critical_changes: defaults.run_all_tests_on_critical_changes,
            run_unit_tests_by_default: defaults.run_unit_tests_by_default,
            critical_paths: defaults.critical_paths,
            lint_file_extensions: defaults.lint_file_extensions,
            variants: defaults.variants,
            rules: BTreeMap::new(),
        }
    }

    /// Escalate to a whole-project run on critical changes.
    pub fn run_all_tests_on_critical_changes(mut self, enabled: bool) -> Self {
        self.run_all_tests_on_critical_changes = enabled;
        self
    }

    /// Select unit tests of affected modules when no rule matches.
    pub fn run_unit_tests_by_default(mut self, enabled: bool) -> Self {
        self.run_unit_tests_by_default = enabled;
        self
    }

    /// Replace the root-scope critical fragments.
    pub fn critical_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.critical_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the lintable extensions. A leading `.` is dropped.
    pub fn lint_file_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lint_file_extensions = extensions
            .into_iter()
            .map(|e| {
                let e: String = e.into();
                e.trim_start_matches('.').to_string()
            })
            .collect();
        self
    }

    /// Replace all build variants.
    pub fn variants(mut self, variants: BuildVariants) -> Self {
        self.variants = variants;
        self
    }

    /// Variant used for unit test tasks.
    pub fn unit_variant(mut self, variant: impl Into<String>) -> Self {
        self.variants.unit = variant.into();
        self
    }

    /// Variant used for instrumented test tasks.
    pub fn instrumented_variant(mut self, variant: impl Into<String>) -> Self {
        self.variants.instrumented = variant.into();
        self
    }

    /// Variant used for compile tasks.
    pub fn compile_variant(mut self, variant: impl Into<String>) -> Self {
        self.variants.compile = variant.into();
        self
    }

    /// Set the rule for a category, replacing any earlier one. One rule per
    /// category keeps per-type results independent.
    pub fn test_type(mut self, test_type: TestType, rule: impl Into<TestTypeRuleBuilder>) -> Self {
        self.rules.insert(test_type, rule.into());
        self
    }

    /// Rule for unit tests.
    pub fn unit_tests(self, rule: impl Into<TestTypeRuleBuilder>) -> Self {
        self.test_type(TestType::Unit, rule)
    }

    /// Rule for integration tests.
    pub fn integration_tests(self, rule: impl Into<TestTypeRuleBuilder>) -> Self {
        self.test_type(TestType::Integration, rule)
    }

    /// Rule for UI tests.
    pub fn ui_tests(self, rule: impl Into<TestTypeRuleBuilder>) -> Self {
        self.test_type(TestType::Ui, rule)
    }

    /// Rule for end-to-end tests.
    pub fn e2e_tests(self, rule: impl Into<TestTypeRuleBuilder>) -> Self {
        self.test_type(TestType::E2e, rule)
    }

    /// Rule for API tests.
    pub fn api_tests(self, rule: impl Into<TestTypeRuleBuilder>) -> Self {
        self.test_type(TestType::Api, rule)
    }

    /// Compile patterns and freeze the configuration.
    pub fn build(self) -> Result<ImpactConfig> {
        let rules = self
            .rules
            .into_iter()
            .map(|(test_type, rule)| rule.build().map(|r| (test_type, r)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(ImpactConfig {
            run_all_tests_on_critical_changes: self.run_all_tests_on_critical_changes,
            run_unit_tests_by_default: self.run_unit_tests_by_default,
            critical_paths: self.critical_paths,
            lint_file_extensions: self.lint_file_extensions,
            variants: self.variants,
            rules,
        })
    }
}

impl Default for ImpactConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ImpactConfig::default();
        assert!(config.run_all_tests_on_critical_changes());
        assert!(config.run_unit_tests_by_default());
        assert_eq!(config.critical_paths().len(), 6);
        assert_eq!(config.lint_file_extensions(), &["kt", "java", "xml"]);
        assert_eq!(config.variants().unit, "Debug");
        assert!(config.rules().is_empty());
        assert!(!config.is_enabled(TestType::Unit));
    }

    #[test]
    fn test_builder() {
        let config = ImpactConfig::builder()
            .run_all_tests_on_critical_changes(false)
            .critical_paths(["buildSrc/"])
            .lint_file_extensions([".kt"])
            .unit_variant("Release")
            .unit_tests(TestTypeRule::builder().when_changed("src/main/**").enabled(true))
            .ui_tests(TestTypeRule::builder().when_changed("**/ui/**"))
            .build()
            .unwrap();

        assert!(!config.run_all_tests_on_critical_changes());
        assert_eq!(config.critical_paths(), &["buildSrc/"]);
        assert_eq!(config.lint_file_extensions(), &["kt"]);
        assert_eq!(config.variants().unit, "Release");
        assert_eq!(config.variants().compile, "Debug");
        assert!(config.is_enabled(TestType::Unit));
        assert!(!config.is_enabled(TestType::Ui));
        assert!(config.rule(TestType::Ui).is_some());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "run_unit_tests_by_default": false,
            "variants": {"unit": "Prod"},
            "rules": {
                "Unit": {"patterns": ["**/*.kt"], "enabled": true},
                "integration": {"patterns": ["**/repository/**"], "run_only_in_changed_modules": true, "enabled": true}
            }
        }"#;

        let config = ImpactConfig::from_json(json).unwrap();
        assert!(!config.run_unit_tests_by_default());
        assert!(config.run_all_tests_on_critical_changes());
        assert_eq!(config.variants().unit, "Prod");
        assert_eq!(config.variants().instrumented, "Debug");
        assert!(config.is_enabled(TestType::Unit));
        assert_eq!(
            config.rule(TestType::Integration).unwrap().propagation(),
            crate::Propagation::ChangedModulesOnly
        );
    }

    #[test]
    fn test_unknown_test_type_fails_fast() {
        let json = r#"{"rules": {"smoke": {"patterns": [], "enabled": true}}}"#;
        let err = ImpactConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTestType(name) if name == "smoke"));
    }

    #[test]
    fn test_duplicate_rule_keys_fail_fast() {
        let json = r#"{"rules": {
            "unit": {"patterns": ["src/main/**"], "enabled": true},
            "Unit": {"patterns": [], "enabled": false}
        }}"#;
        let err = ImpactConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTestType(_)));
    }

    #[test]
    fn test_malformed_pattern_fails_fast() {
        let json = r#"{"rules": {"unit": {"patterns": ["**/"], "enabled": true}}}"#;
        let err = ImpactConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySegment(_)));
    }

    #[test]
    fn test_to_file_round_trip() {
        let config = ImpactConfig::builder()
            .api_tests(TestTypeRule::builder().when_changed("**/api/**").enabled(true))
            .build()
            .unwrap();

        let file = config.to_file();
        let back = ImpactConfig::from_file(file.clone()).unwrap();
        assert_eq!(back.to_file(), file);
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"critical_paths": ["ci/"]}}"#).unwrap();

        let config = ImpactConfig::load(file.path()).unwrap();
        assert_eq!(config.critical_paths(), &["ci/"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ImpactConfig::load("/nonexistent/impactscope.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
