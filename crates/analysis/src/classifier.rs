//! Attributes changed files to their owning modules.

use impactscope_core::{normalize_path, ChangeEntry, ChangedFile, FileLanguage, ModulePath};
use std::collections::HashMap;
use crate::graph::ModuleDependencyGraph;

const TEST_DIRECTORIES: [&str; 4] = ["/test/", "/androidTest/", "/androidTestDebug/", "/androidTestRelease/"];
const TEST_FILE_SUFFIXES: [&str; 5] = ["Test.kt", "Test.java", "Tests.kt", "Tests.java", "Spec.kt"];
const BUILD_SCRIPTS: [&str; 5] = [
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "settings.gradle.kts",
    "gradle.properties",
];

/// Longest-prefix module resolution over module directories.
///
/// One classifier serves one invocation; its path cache is never shared.
pub struct ChangeClassifier<'g> {
    /// `(directory + "/", module)` pairs, longest directory first
    prefixes: Vec<(String, &'g ModulePath)>,
    cache: HashMap<String, Option<ModulePath>>,
}

impl<'g> ChangeClassifier<'g> {
    /// Create a classifier over the graph's module directories. Modules
    /// without a directory (the root) never own files.
    pub fn new(graph: &'g ModuleDependencyGraph) -> Self {
        let mut prefixes: Vec<(String, &'g ModulePath)> = graph
            .modules()
            .filter(|m| !m.directory.is_empty())
            .map(|m| (format!("{}/", m.directory), &m.path))
            .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self {
            prefixes,
            cache: HashMap::new(),
        }
    }

    /// Owning module of a repository-relative path, `None` for root scope.
    pub fn module_for(&mut self, path: &str) -> Option<ModulePath> {
        let path = normalize_path(path);
        if let Some(cached) = self.cache.get(&path) {
            return cached.clone();
        }

        let module = self
            .prefixes
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
            .map(|(_, module)| (*module).clone());

        self.cache.insert(path, module.clone());
        module
    }

    /// Attribute every change entry. Duplicate paths keep their first entry.
    pub fn classify(&mut self, entries: &[ChangeEntry]) -> Vec<ChangedFile> {
        let mut seen = std::collections::HashSet::new();
        let mut files = Vec::with_capacity(entries.len());

        for entry in entries {
            let path = normalize_path(&entry.path);
            if !seen.insert(path.clone()) {
                continue;
            }

            let module = self.module_for(&path);
            files.push(ChangedFile {
                language: FileLanguage::from_path(&path),
                path,
                module,
                change_kind: entry.kind,
            });
        }

        tracing::debug!(
            "Classified {} changed files, {} in root scope",
            files.len(),
            files.iter().filter(|f| f.is_root_scope()).count()
        );
        files
    }
}

/// Whether the path looks like a test source.
pub fn is_test_file(path: &str) -> bool {
    let path = normalize_path(path);
    TEST_DIRECTORIES.iter().any(|d| path.contains(d))
        || TEST_FILE_SUFFIXES.iter().any(|s| path.ends_with(s))
}

/// Whether the path is a build script or build configuration file.
pub fn is_config_file(path: &str) -> bool {
    let path = normalize_path(path);
    let name = file_name(&path);
    BUILD_SCRIPTS.contains(&name) || name.ends_with(".properties") || name.ends_with(".pro")
}

/// Whether a root-scope path is root-level build configuration: a config
/// file at the repository root, anything under `gradle/`, or a settings
/// script at any depth.
pub fn is_root_level_config_file(path: &str) -> bool {
    let path = normalize_path(path);
    let path = path.trim_start_matches("./");

    if !path.contains('/') && is_config_file(path) {
        return true;
    }
    if path.starts_with("gradle/") {
        return true;
    }
    matches!(file_name(path), "settings.gradle" | "settings.gradle.kts")
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
