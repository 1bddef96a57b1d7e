//! Impact analysis output.
//!
//! [`ImpactResult`] is the single hand-off artifact to executors and
//! persistence layers. Every collection is ordered so serializing the same
//! result twice yields identical bytes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use crate::change::ChangedFile;
use crate::module::ModulePath;
use crate::test_type::TestType;
use crate::Time;

/// Root-scope files that fired a critical trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalChanges {
    /// Root-level build/settings files and build-tooling metadata
    pub root_config_files: Vec<String>,

    /// Root-scope files containing a configured critical fragment
    pub critical_path_files: Vec<String>,
}

impl CriticalChanges {
    /// Whether either trigger fired.
    pub fn is_critical(&self) -> bool {
        !self.root_config_files.is_empty() || !self.critical_path_files.is_empty()
    }
}

/// Aggregate statistics about the computed test scope.
///
/// `total_to_run + total_skipped == total_available` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Test tasks available across all testable modules
    pub total_available: usize,

    /// Test tasks selected to run
    pub total_to_run: usize,

    /// Test tasks not selected
    pub total_skipped: usize,

    /// Modules with at least one selected task
    pub modules_to_run: BTreeSet<ModulePath>,

    /// Testable modules with no selected task
    pub skipped_modules: BTreeSet<ModulePath>,

    /// Linear estimate of time saved
    pub estimated_time_saved_minutes: f64,

    /// Selected task count per category
    pub tests_by_type: BTreeMap<TestType, usize>,

    /// Test methods in modules that run
    pub total_test_methods_to_run: u64,

    /// Test methods in modules that are skipped
    pub total_test_methods_skipped: u64,

    /// Test methods found per testable module
    pub test_methods_by_module: BTreeMap<ModulePath, u32>,
}

/// Outcome of one impact analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// Changed files with owning modules
    pub changed_files: Vec<ChangedFile>,

    /// Modules owning at least one changed file
    pub direct_modules: BTreeSet<ModulePath>,

    /// Direct modules plus their transitive dependents, root excluded
    pub affected_modules: BTreeSet<ModulePath>,

    /// Critical triggers that fired
    pub critical: CriticalChanges,

    /// Whether the scope was escalated to the whole project
    pub escalated: bool,

    /// Sorted, qualified test tasks per category
    pub tests_to_run: BTreeMap<TestType, Vec<String>>,

    /// Sorted, qualified compile tasks for affected modules
    pub compile_tasks: Vec<String>,

    /// Changed files eligible for linting
    pub files_to_lint: Vec<String>,

    /// Aggregate statistics
    pub report: ImpactReport,

    /// When the result was produced, stamped by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<Time>,
}

impl ImpactResult {
    /// Every selected test task across categories, deduplicated and sorted.
    pub fn all_test_tasks(&self) -> Vec<String> {
        let tasks: BTreeSet<&String> = self.tests_to_run.values().flatten().collect();
        tasks.into_iter().cloned().collect()
    }

    /// Whether no test task was selected.
    pub fn is_empty(&self) -> bool {
        self.tests_to_run.values().all(|tasks| tasks.is_empty())
    }
}
