//! Test-type rules and impact analysis configuration.
//!
//! Patterns, rules and the frozen [`ImpactConfig`] consumed by the
//! analysis engine.

#![warn(missing_docs)]

pub mod error;
pub mod pattern;
pub mod rule;
pub mod config;

pub use error::{ConfigError, Result};
pub use pattern::{PathPattern, PatternKind};
pub use rule::{Propagation, RuleSpec, TestTypeRule, TestTypeRuleBuilder};
pub use config::{
    BuildVariants, ConfigFile, ImpactConfig, ImpactConfigBuilder,
    DEFAULT_CRITICAL_PATHS, DEFAULT_LINT_EXTENSIONS, DEFAULT_VARIANT,
};
