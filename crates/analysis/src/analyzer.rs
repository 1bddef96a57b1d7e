//! End-to-end impact analysis.

use impactscope_core::{extension_of, ChangeEntry, ChangedFile, ImpactResult, TestInventory};
use impactscope_rules::ImpactConfig;
use std::collections::HashSet;
use crate::classifier::ChangeClassifier;
use crate::graph::ModuleDependencyGraph;
use crate::report::ImpactReportGenerator;
use crate::resolver::TaskNameResolver;
use crate::scope::TestScopeCalculator;

/// Runs classification, scope calculation and reporting over one snapshot.
///
/// The analyzer holds only shared references and keeps no state between
/// calls, so one instance may serve concurrent callers.
pub struct ImpactAnalyzer<'a> {
    graph: &'a ModuleDependencyGraph,
    config: &'a ImpactConfig,
    inventory: &'a TestInventory,
}

impl<'a> ImpactAnalyzer<'a> {
    /// Create an analyzer.
    pub fn new(
        graph: &'a ModuleDependencyGraph,
        config: &'a ImpactConfig,
        inventory: &'a TestInventory,
    ) -> Self {
        Self {
            graph,
            config,
            inventory,
        }
    }

    /// Analyze raw change entries.
    pub fn analyze(&self, changes: &[ChangeEntry]) -> ImpactResult {
        let files = ChangeClassifier::new(self.graph).classify(changes);
        self.analyze_files(files)
    }

    /// Analyze files already attributed to modules.
    pub fn analyze_files(&self, files: Vec<ChangedFile>) -> ImpactResult {
        let scope = TestScopeCalculator::new(self.graph, self.config, self.inventory).calculate(&files);

        let resolver = TaskNameResolver::new(self.config.variants());
        let mut compile_tasks: Vec<String> = scope
            .affected_modules
            .iter()
            .filter(|m| self.graph.contains(m))
            .map(|m| resolver.compile_task(m))
            .collect();
        compile_tasks.sort();

        let files_to_lint = self.files_to_lint(&files);
        let report = ImpactReportGenerator::new(self.graph, self.inventory).generate(&scope.tests_to_run);

        tracing::info!(
            "Impact analysis: {} changed files, {} affected modules, {} tasks to run, {} skipped",
            files.len(),
            scope.affected_modules.len(),
            report.total_to_run,
            report.total_skipped
        );

        ImpactResult {
            changed_files: files,
            direct_modules: scope.direct_modules,
            affected_modules: scope.affected_modules,
            critical: scope.critical,
            escalated: scope.escalated,
            tests_to_run: scope.tests_to_run,
            compile_tasks,
            files_to_lint,
            report,
            generated_at: None,
        }
    }

    /// Changed files with a lintable extension, in input order.
    fn files_to_lint(&self, files: &[ChangedFile]) -> Vec<String> {
        let extensions = self.config.lint_file_extensions();
        let mut seen = HashSet::new();

        files
            .iter()
            .filter(|f| extensions.iter().any(|e| e == extension_of(&f.path)))
            .filter(|f| seen.insert(f.path.as_str()))
            .map(|f| f.path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impactscope_core::{ChangeKind, ModulePath, ModuleSnapshot, ModuleTests, TestType};
    use impactscope_rules::TestTypeRule;

    fn fixture() -> (ModuleDependencyGraph, TestInventory) {
        let graph = ModuleDependencyGraph::from_snapshots(vec![
            ModuleSnapshot::new(":", ""),
            ModuleSnapshot::new(":app", "app")
                .depends_on(":feature")
                .with_tasks(["test", "testDebugUnitTest", "connectedDebugAndroidTest"]),
            ModuleSnapshot::new(":feature", "feature")
                .depends_on(":core")
                .with_tasks(["test", "testDebugUnitTest"]),
            ModuleSnapshot::new(":core", "core").with_tasks(["test"]),
        ])
        .unwrap();

        let tests = ModuleTests {
            unit_sources: true,
            instrumented_sources: false,
            test_methods: 4,
        };
        let inventory = graph
            .testable_modules()
            .map(|m| (m.path.clone(), tests))
            .collect();
        (graph, inventory)
    }

    fn config() -> ImpactConfig {
        ImpactConfig::builder()
            .unit_tests(TestTypeRule::builder().when_changed("src/main/**").enabled(true))
            .ui_tests(TestTypeRule::builder().when_changed("**/ui/**").enabled(true))
            .build()
            .unwrap()
    }

    fn entries(paths: &[&str]) -> Vec<ChangeEntry> {
        paths.iter().map(|p| ChangeEntry::new(*p, ChangeKind::Modified)).collect()
    }

    #[test]
    fn test_end_to_end() {
        let (graph, inventory) = fixture();
        let config = config();
        let analyzer = ImpactAnalyzer::new(&graph, &config, &inventory);

        let result = analyzer.analyze(&entries(&[
            "feature/src/main/kotlin/ui/Screen.kt",
            "feature/src/main/res/layout/screen.xml",
            "README.md",
        ]));

        assert_eq!(result.changed_files.len(), 3);
        assert_eq!(result.direct_modules, [ModulePath::new(":feature")].into_iter().collect());
        assert_eq!(result.affected_modules.len(), 2);
        assert_eq!(
            result.tests_to_run[&TestType::Unit],
            vec![":app:testDebugUnitTest".to_string(), ":feature:testDebugUnitTest".to_string()]
        );
        // ui tests resolve only where the module exposes them
        assert_eq!(
            result.tests_to_run[&TestType::Ui],
            vec![":app:connectedDebugAndroidTest".to_string()]
        );
        assert_eq!(
            result.compile_tasks,
            vec![":app:compileDebugKotlin".to_string(), ":feature:compileDebugKotlin".to_string()]
        );
        assert_eq!(
            result.files_to_lint,
            vec![
                "feature/src/main/kotlin/ui/Screen.kt".to_string(),
                "feature/src/main/res/layout/screen.xml".to_string(),
            ]
        );
        assert_eq!(
            result.report.total_to_run + result.report.total_skipped,
            result.report.total_available
        );
        assert!(result.generated_at.is_none());
    }

    #[test]
    fn test_lint_list_is_deduplicated() {
        let (graph, inventory) = fixture();
        let config = config();
        let analyzer = ImpactAnalyzer::new(&graph, &config, &inventory);

        let files = vec![
            ChangedFile {
                path: "core/A.kt".to_string(),
                module: Some(ModulePath::new(":core")),
                change_kind: ChangeKind::Modified,
                language: impactscope_core::FileLanguage::Kotlin,
            };
            2
        ];
        let result = analyzer.analyze_files(files);
        assert_eq!(result.files_to_lint, vec!["core/A.kt".to_string()]);
    }

    #[test]
    fn test_identical_inputs_give_identical_output() {
        let (graph, inventory) = fixture();
        let config = config();
        let analyzer = ImpactAnalyzer::new(&graph, &config, &inventory);
        let changes = entries(&["core/src/main/Core.kt", "app/src/main/App.kt"]);

        let first = serde_json::to_string(&analyzer.analyze(&changes)).unwrap();
        let second = serde_json::to_string(&analyzer.analyze(&changes)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_root_change_escalates_everything() {
        let (graph, inventory) = fixture();
        let config = config();
        let analyzer = ImpactAnalyzer::new(&graph, &config, &inventory);

        let result = analyzer.analyze(&entries(&["gradle/libs.versions.toml"]));
        assert!(result.escalated);
        assert_eq!(result.tests_to_run[&TestType::Unit].len(), 3);
        assert!(result.affected_modules.is_empty());
        assert!(result.files_to_lint.is_empty());
    }
}
