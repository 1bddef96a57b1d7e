//! Impact report aggregation and formatting.

use impactscope_core::{ImpactReport, ModulePath, TestInventory, TestType};
use std::collections::{BTreeMap, BTreeSet};
use crate::graph::ModuleDependencyGraph;

/// Estimated cost of one test task, in minutes.
pub const MINUTES_PER_TASK: f64 = 0.5;

/// Aggregates a computed scope into an [`ImpactReport`]. No I/O.
pub struct ImpactReportGenerator<'a> {
    graph: &'a ModuleDependencyGraph,
    inventory: &'a TestInventory,
}

impl<'a> ImpactReportGenerator<'a> {
    /// Create a generator.
    pub fn new(graph: &'a ModuleDependencyGraph, inventory: &'a TestInventory) -> Self {
        Self { graph, inventory }
    }

    /// Build the report for the selected tasks.
    pub fn generate(&self, tests_to_run: &BTreeMap<TestType, Vec<String>>) -> ImpactReport {
        // Testable modules: non-root modules exposing at least one task
        let testable: Vec<_> = self
            .graph
            .testable_modules()
            .filter(|m| !m.test_tasks.is_empty())
            .collect();

        let total_available: usize = testable.iter().map(|m| m.test_tasks.len()).sum();

        let emitted: BTreeSet<&String> = tests_to_run.values().flatten().collect();
        let total_to_run = emitted.len();
        let total_skipped = total_available.saturating_sub(total_to_run);

        let modules_to_run: BTreeSet<ModulePath> =
            emitted.iter().filter_map(|task| module_of_task(task)).collect();
        let skipped_modules: BTreeSet<ModulePath> = testable
            .iter()
            .map(|m| m.path.clone())
            .filter(|p| !modules_to_run.contains(p))
            .collect();

        let mut test_methods_by_module = BTreeMap::new();
        let mut total_test_methods_to_run = 0u64;
        let mut total_test_methods_skipped = 0u64;

        for module in &testable {
            if self.inventory.get(&module.path).is_none() {
                continue;
            }
            let count = self.inventory.test_methods(&module.path);
            test_methods_by_module.insert(module.path.clone(), count);

            if modules_to_run.contains(&module.path) {
                total_test_methods_to_run += u64::from(count);
            } else {
                total_test_methods_skipped += u64::from(count);
            }
        }

        let tests_by_type = tests_to_run.iter().map(|(t, tasks)| (*t, tasks.len())).collect();

        ImpactReport {
            total_available,
            total_to_run,
            total_skipped,
            modules_to_run,
            skipped_modules,
            estimated_time_saved_minutes: total_skipped as f64 * MINUTES_PER_TASK,
            tests_by_type,
            total_test_methods_to_run,
            total_test_methods_skipped,
            test_methods_by_module,
        }
    }
}

/// Module prefix of a qualified task, `None` for unprefixed root tasks.
fn module_of_task(task: &str) -> Option<ModulePath> {
    match task.rfind(':') {
        Some(index) if index > 0 => Some(ModulePath::new(&task[..index])),
        _ => None,
    }
}

fn join_modules(modules: &BTreeSet<ModulePath>) -> String {
    modules.iter().map(ModulePath::as_str).collect::<Vec<_>>().join(", ")
}

/// Plain summary lines for console output.
pub fn format_summary(report: &ImpactReport) -> Vec<String> {
    vec![
        "========== Impact Analysis Report ==========".to_string(),
        format!("Total tests to run: {}", report.total_to_run),
        format!("Total tests skipped: {}", report.total_skipped),
        format!(
            "Modules to run ({}): {}",
            report.modules_to_run.len(),
            join_modules(&report.modules_to_run)
        ),
        format!(
            "Skipped modules ({}): {}",
            report.skipped_modules.len(),
            join_modules(&report.skipped_modules)
        ),
        format!("Estimated time saved: {:.1} minutes", report.estimated_time_saved_minutes),
        format!("Total test methods to run: {}", report.total_test_methods_to_run),
        format!("Total test methods skipped: {}", report.total_test_methods_skipped),
        "============================================".to_string(),
    ]
}

/// Per-type counts and the ten modules with the most test methods.
pub fn format_details(report: &ImpactReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.tests_by_type.is_empty() {
        lines.push("Tests by type:".to_string());
        for (test_type, count) in &report.tests_by_type {
            lines.push(format!("  {}: {}", test_type, count));
        }
    }

    if !report.test_methods_by_module.is_empty() {
        let mut by_count: Vec<_> = report.test_methods_by_module.iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        lines.push("Test methods by module (top 10):".to_string());
        for (module, count) in by_count.into_iter().take(10) {
            let status = if report.modules_to_run.contains(module) { "run" } else { "skip" };
            lines.push(format!("  [{}] {}: {}", status, module, count));
        }
    }

    lines
}
