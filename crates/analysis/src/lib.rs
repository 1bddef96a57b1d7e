//! Change impact analysis engine.
//!
//! Given a module graph snapshot, a set of changed files, an immutable
//! configuration and a test inventory, computes the minimal set of test
//! and compile tasks to run. Every stage is a pure function of its inputs.

#![warn(missing_docs)]

pub mod error;
pub mod graph;
pub mod classifier;
pub mod critical;
pub mod resolver;
pub mod scope;
pub mod report;
pub mod analyzer;

pub use error::{GraphError, Result};
pub use graph::{without_root, ModuleDependencyGraph};
pub use classifier::{is_config_file, is_root_level_config_file, is_test_file, ChangeClassifier};
pub use critical::CriticalPathDetector;
pub use resolver::TaskNameResolver;
pub use scope::{TestScope, TestScopeCalculator};
pub use report::{format_details, format_summary, ImpactReportGenerator, MINUTES_PER_TASK};
pub use analyzer::ImpactAnalyzer;
