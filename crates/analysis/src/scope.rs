//! Test scope calculation.
//!
//! One pass over the classified changes:
//! 1. split changed files into direct modules and root scope
//! 2. escalate to the whole project on critical root-scope changes
//! 3. otherwise close the direct set over dependents
//! 4. select modules per enabled rule whose patterns match a change
//! 5. fall back to unit tests of affected modules when nothing matched
//! 6. drop disabled test types
//! 7. emit tasks only for modules that actually have tests of that type

use impactscope_core::{ChangedFile, CriticalChanges, ModulePath, TestInventory, TestType};
use impactscope_rules::{ImpactConfig, Propagation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use crate::critical::CriticalPathDetector;
use crate::graph::{without_root, ModuleDependencyGraph};
use crate::resolver::TaskNameResolver;

/// Outcome of one scope calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestScope {
    /// Modules owning at least one changed file
    pub direct_modules: BTreeSet<ModulePath>,
    /// Direct modules plus transitive dependents, root excluded
    pub affected_modules: BTreeSet<ModulePath>,
    /// Critical triggers that fired
    pub critical: CriticalChanges,
    /// Whether the whole project was selected
    pub escalated: bool,
    /// Sorted, qualified tasks per enabled test type
    pub tests_to_run: BTreeMap<TestType, Vec<String>>,
}

/// Pure scope calculator over an immutable graph, config and inventory.
pub struct TestScopeCalculator<'a> {
    graph: &'a ModuleDependencyGraph,
    config: &'a ImpactConfig,
    inventory: &'a TestInventory,
    resolver: TaskNameResolver<'a>,
}

impl<'a> TestScopeCalculator<'a> {
    /// Create a calculator.
    pub fn new(
        graph: &'a ModuleDependencyGraph,
        config: &'a ImpactConfig,
        inventory: &'a TestInventory,
    ) -> Self {
        Self {
            graph,
            config,
            inventory,
            resolver: TaskNameResolver::new(config.variants()),
        }
    }

    /// Compute which tests to run for the given changes.
    pub fn calculate(&self, files: &[ChangedFile]) -> TestScope {
        let direct_modules: BTreeSet<ModulePath> = files
            .iter()
            .filter(|f| !f.is_root_scope())
            .filter_map(|f| f.module.clone())
            .collect();
        let affected_modules = without_root(self.graph.affected(&direct_modules));

        let critical = CriticalPathDetector::new(self.config.critical_paths()).detect(files);

        if critical.is_critical() && self.config.run_all_tests_on_critical_changes() {
            tracing::info!("Running all enabled test types in every module due to critical changes");
            let tests_to_run = self.whole_project();
            return TestScope {
                direct_modules,
                affected_modules,
                critical,
                escalated: true,
                tests_to_run,
            };
        }

        let mut tests_to_run = BTreeMap::new();

        for (test_type, rule) in self.config.rules() {
            if !rule.is_enabled() {
                continue;
            }
            if !files.iter().any(|f| rule.matches_file(&f.path)) {
                continue;
            }

            let modules = match rule.propagation() {
                Propagation::ChangedModulesOnly => &direct_modules,
                Propagation::AllDependents => &affected_modules,
            };
            if !modules.is_empty() {
                tracing::debug!("Rule {} selected {} modules", test_type, modules.len());
                tests_to_run.insert(*test_type, self.tasks_for(modules, *test_type));
            }
        }

        if tests_to_run.is_empty() && self.config.run_unit_tests_by_default() {
            tracing::debug!("No rule matched, defaulting to unit tests of affected modules");
            tests_to_run.insert(TestType::Unit, self.tasks_for(&affected_modules, TestType::Unit));
        }

        tests_to_run.retain(|test_type, _| self.config.is_enabled(*test_type));

        TestScope {
            direct_modules,
            affected_modules,
            critical,
            escalated: false,
            tests_to_run,
        }
    }

    /// Every enabled concrete test type over every non-root module.
    fn whole_project(&self) -> BTreeMap<TestType, Vec<String>> {
        let all_modules: BTreeSet<ModulePath> =
            self.graph.testable_modules().map(|m| m.path.clone()).collect();

        TestType::concrete()
            .filter(|t| self.config.is_enabled(*t))
            .map(|t| (t, self.tasks_for(&all_modules, t)))
            .collect()
    }

    /// Sorted, qualified tasks for modules that have tests of the given type.
    fn tasks_for(&self, modules: &BTreeSet<ModulePath>, test_type: TestType) -> Vec<String> {
        let mut tasks: Vec<String> = modules
            .iter()
            .filter(|path| !path.is_root())
            .filter(|path| self.inventory.has_tests(path, test_type))
            .filter_map(|path| self.graph.module(path))
            .filter_map(|module| self.resolver.resolve(module, test_type))
            .collect();

        tasks.sort();
        tasks.dedup();
        tasks
    }
}
