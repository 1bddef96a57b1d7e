//! Module dependency graph.

use impactscope_core::{normalize_path, Module, ModulePath, ModuleSnapshot};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt::Write;
use crate::error::{GraphError, Result};

static NO_MODULES: BTreeSet<ModulePath> = BTreeSet::new();

/// Immutable module graph with forward and reverse edges.
#[derive(Debug, Clone, Default)]
pub struct ModuleDependencyGraph {
    modules: HashMap<ModulePath, Module>,
    /// Module paths in sorted order, for deterministic iteration
    order: Vec<ModulePath>,
}

impl ModuleDependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a graph from adapter snapshots, deriving reverse edges.
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = ModuleSnapshot>) -> Result<Self> {
        let mut modules: HashMap<ModulePath, Module> = HashMap::new();

        for snapshot in snapshots {
            if modules.contains_key(&snapshot.path) {
                return Err(GraphError::DuplicateModule(snapshot.path));
            }

            let module = Module {
                path: snapshot.path.clone(),
                directory: normalize_directory(&snapshot.directory),
                dependencies: snapshot.dependencies,
                dependents: BTreeSet::new(),
                test_tasks: snapshot.test_tasks,
            };
            modules.insert(snapshot.path, module);
        }

        // Derive reverse edges
        let mut edges = Vec::new();
        for module in modules.values() {
            for dependency in &module.dependencies {
                if !modules.contains_key(dependency) {
                    return Err(GraphError::UnknownDependency {
                        module: module.path.clone(),
                        dependency: dependency.clone(),
                    });
                }
                edges.push((dependency.clone(), module.path.clone()));
            }
        }
        for (dependency, dependent) in edges {
            if let Some(target) = modules.get_mut(&dependency) {
                target.dependents.insert(dependent);
            }
        }

        let mut order: Vec<ModulePath> = modules.keys().cloned().collect();
        order.sort();

        tracing::debug!("Assembled module graph with {} modules", order.len());

        Ok(Self { modules, order })
    }

    /// Look up a module.
    pub fn module(&self, path: &ModulePath) -> Option<&Module> {
        self.modules.get(path)
    }

    /// Whether the module is part of the graph.
    pub fn contains(&self, path: &ModulePath) -> bool {
        self.modules.contains_key(path)
    }

    /// All modules, sorted by path.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.order.iter().filter_map(|p| self.modules.get(p))
    }

    /// Modules that may own tests: everything except the root.
    pub fn testable_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules().filter(|m| !m.path.is_root())
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph has no modules.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Modules the given module depends on directly.
    pub fn direct_dependencies(&self, path: &ModulePath) -> &BTreeSet<ModulePath> {
        self.modules.get(path).map_or(&NO_MODULES, |m| &m.dependencies)
    }

    /// Modules that depend directly on the given module.
    pub fn direct_dependents(&self, path: &ModulePath) -> &BTreeSet<ModulePath> {
        self.modules.get(path).map_or(&NO_MODULES, |m| &m.dependents)
    }

    /// The seed set plus every transitive dependent.
    ///
    /// Seeds are always part of the result, even when unknown to the graph.
    /// Cycles terminate through the visited set.
    pub fn affected(&self, seeds: &BTreeSet<ModulePath>) -> BTreeSet<ModulePath> {
        let mut visited: BTreeSet<ModulePath> = seeds.clone();
        let mut queue: VecDeque<&ModulePath> = seeds.iter().collect();

        while let Some(current) = queue.pop_front() {
            for dependent in self.direct_dependents(current) {
                if visited.insert(dependent.clone()) {
                    queue.push_back(dependent);
                }
            }
        }

        visited
    }

    /// Render forward edges as a Graphviz digraph.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph modules {\n");

        for module in self.modules() {
            let _ = writeln!(out, "    \"{}\";", module.path);
        }
        for module in self.modules() {
            for dependency in &module.dependencies {
                let _ = writeln!(out, "    \"{}\" -> \"{}\";", module.path, dependency);
            }
        }

        out.push_str("}\n");
        out
    }
}

/// Drop the root module from a result set.
pub fn without_root(modules: BTreeSet<ModulePath>) -> BTreeSet<ModulePath> {
    modules.into_iter().filter(|m| !m.is_root()).collect()
}

/// Forward slashes, no leading `./`, no surrounding slashes. `.` is the root.
fn normalize_directory(directory: &str) -> String {
    let normalized = normalize_path(directory.trim());
    let trimmed = normalized.trim_start_matches("./").trim_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(paths: &[&str]) -> BTreeSet<ModulePath> {
        paths.iter().map(|p| ModulePath::new(*p)).collect()
    }

    /// app -> feature -> core, app -> core, tools standalone.
    fn sample_graph() -> ModuleDependencyGraph {
        ModuleDependencyGraph::from_snapshots(vec![
            ModuleSnapshot::new(":", ""),
            ModuleSnapshot::new(":app", "app").depends_on(":feature").depends_on(":core"),
            ModuleSnapshot::new(":feature", "feature").depends_on(":core"),
            ModuleSnapshot::new(":core", "core"),
            ModuleSnapshot::new(":tools", "tools"),
        ])
        .unwrap()
    }

    #[test]
    fn test_reverse_edges_are_derived() {
        let graph = sample_graph();
        assert_eq!(graph.direct_dependents(&":core".into()), &set(&[":app", ":feature"]));
        assert_eq!(graph.direct_dependencies(&":app".into()), &set(&[":core", ":feature"]));
        assert!(graph.direct_dependents(&":app".into()).is_empty());
        assert!(graph.direct_dependents(&":missing".into()).is_empty());
    }

    #[test]
    fn test_affected_follows_dependents_only() {
        let graph = sample_graph();
        assert_eq!(graph.affected(&set(&[":core"])), set(&[":app", ":core", ":feature"]));
        assert_eq!(graph.affected(&set(&[":feature"])), set(&[":app", ":feature"]));
        assert_eq!(graph.affected(&set(&[":app"])), set(&[":app"]));
        assert!(graph.affected(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_affected_is_closed() {
        let graph = sample_graph();
        for seed in [set(&[":core"]), set(&[":tools", ":feature"]), set(&[":unknown"])] {
            let once = graph.affected(&seed);
            assert!(once.is_superset(&seed));
            assert_eq!(graph.affected(&once), once);
        }
    }

    #[test]
    fn test_affected_terminates_on_cycles() {
        let graph = ModuleDependencyGraph::from_snapshots(vec![
            ModuleSnapshot::new(":a", "a").depends_on(":b"),
            ModuleSnapshot::new(":b", "b").depends_on(":c"),
            ModuleSnapshot::new(":c", "c").depends_on(":a"),
        ])
        .unwrap();

        assert_eq!(graph.affected(&set(&[":a"])), set(&[":a", ":b", ":c"]));
    }

    #[test]
    fn test_duplicate_module_is_rejected() {
        let err = ModuleDependencyGraph::from_snapshots(vec![
            ModuleSnapshot::new(":a", "a"),
            ModuleSnapshot::new(":a", "other"),
        ])
        .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateModule(p) if p.as_str() == ":a"));
    }

    #[test]
    fn test_unknown_dependency_is_rejected() {
        let err = ModuleDependencyGraph::from_snapshots(vec![
            ModuleSnapshot::new(":a", "a").depends_on(":ghost"),
        ])
        .unwrap_err();
        assert!(matches!(err, GraphError::UnknownDependency { .. }));
    }

    #[test]
    fn test_testable_modules_exclude_root() {
        let graph = sample_graph();
        let testable: Vec<_> = graph.testable_modules().map(|m| m.path.as_str()).collect();
        assert_eq!(testable, vec![":app", ":core", ":feature", ":tools"]);
        assert_eq!(graph.len(), 5);
        assert_eq!(without_root(set(&[":", ":app"])), set(&[":app"]));
    }

    #[test]
    fn test_directory_normalization() {
        let graph = ModuleDependencyGraph::from_snapshots(vec![
            ModuleSnapshot::new(":", "."),
            ModuleSnapshot::new(":lib", "./libs\\lib/"),
        ])
        .unwrap();
        assert_eq!(graph.module(&":".into()).unwrap().directory, "");
        assert_eq!(graph.module(&":lib".into()).unwrap().directory, "libs/lib");
    }

    #[test]
    fn test_dot_output_is_sorted() {
        let dot = sample_graph().to_dot();
        let app_core = dot.find("\":app\" -> \":core\"").unwrap();
        let app_feature = dot.find("\":app\" -> \":feature\"").unwrap();
        assert!(dot.starts_with("digraph modules {"));
        assert!(app_core < app_feature);
        assert_eq!(dot, sample_graph().to_dot());
    }

    #[test]
    fn test_empty_graph() {
        let graph = ModuleDependencyGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.affected(&set(&[":x"])), set(&[":x"]));
    }
}
