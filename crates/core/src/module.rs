//! Module identities and graph snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hierarchical module identifier, e.g. `:core:network`.
///
/// The synthetic root module is `:`. It owns files that live at the
/// repository root but never owns tests of its own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
    /// Path of the synthetic root module.
    pub const ROOT: &'static str = ":";

    /// Create a module path from its string form.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The root module.
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// Whether this is the root module.
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    /// String form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Qualify a task name with this module.
    ///
    /// The root module's tasks carry no prefix; every other module's task
    /// is `<path>:<task>`.
    pub fn qualify(&self, task: &str) -> String {
        if self.is_root() {
            task.to_string()
        } else {
            format!("{}:{}", self.0, task)
        }
    }
}

impl std::fmt::Display for ModulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ModulePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModulePath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A module as supplied by the build-system adapter.
///
/// Only forward edges are supplied; reverse edges are derived when the
/// graph is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    /// Module identifier
    pub path: ModulePath,

    /// Directory relative to the repository root (empty for the root module)
    #[serde(default)]
    pub directory: String,

    /// Modules this one depends on directly
    #[serde(default)]
    pub dependencies: BTreeSet<ModulePath>,

    /// Test task names available in this module
    #[serde(default)]
    pub test_tasks: Vec<String>,
}

impl ModuleSnapshot {
    /// Create a snapshot with no edges and no tasks.
    pub fn new(path: impl Into<ModulePath>, directory: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            directory: directory.into(),
            dependencies: BTreeSet::new(),
            test_tasks: Vec::new(),
        }
    }

    /// Add a direct dependency.
    pub fn depends_on(mut self, dependency: impl Into<ModulePath>) -> Self {
        self.dependencies.insert(dependency.into());
        self
    }

    /// Set the available test tasks.
    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_tasks = tasks.into_iter().map(Into::into).collect();
        self
    }
}

/// An assembled module with both edge directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Module identifier
    pub path: ModulePath,

    /// Directory relative to the repository root, forward slashes, no trailing slash
    pub directory: String,

    /// Direct dependencies
    pub dependencies: BTreeSet<ModulePath>,

    /// Direct dependents (reverse edges)
    pub dependents: BTreeSet<ModulePath>,

    /// Available test task names
    pub test_tasks: Vec<String>,
}

impl Module {
    /// Whether the module exposes the named task.
    pub fn has_task(&self, task: &str) -> bool {
        self.test_tasks.iter().any(|t| t == task)
    }
}
