//! Filesystem test-source scanner.

use async_trait::async_trait;
use impactscope_core::{ModuleTests, TestInventory};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinSet;
use crate::counter::MethodCounter;
use crate::error::Result;
use crate::source::{InventorySource, ModuleLocation};

/// Source sets holding JVM unit tests.
pub const UNIT_SOURCE_SETS: [&str; 1] = ["src/test"];

/// Source sets holding instrumentation tests.
pub const INSTRUMENTED_SOURCE_SETS: [&str; 3] =
    ["src/androidTest", "src/androidTestDebug", "src/androidTestRelease"];

/// Directories whose sources are counted for test methods.
pub const COUNTED_DIRECTORIES: [&str; 6] = [
    "src/test/kotlin",
    "src/test/java",
    "src/androidTest/kotlin",
    "src/androidTest/java",
    "src/androidTestDebug/kotlin",
    "src/androidTestDebug/java",
];

/// Scans module directories under a repository root.
#[derive(Debug, Clone)]
pub struct FsInventory {
    root: PathBuf,
    counter: Arc<MethodCounter>,
}

impl FsInventory {
    /// Create a scanner rooted at the repository directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            counter: Arc::new(MethodCounter::new()?),
        })
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn module_dir(&self, module: &ModuleLocation) -> PathBuf {
        if module.directory.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&module.directory)
        }
    }
}

#[async_trait]
impl InventorySource for FsInventory {
    async fn scan_module(&self, module: &ModuleLocation) -> Result<ModuleTests> {
        Ok(scan_dir(&self.module_dir(module), &self.counter).await)
    }

    /// Scan modules concurrently, keyed by module path.
    async fn scan_all(&self, modules: &[ModuleLocation]) -> Result<TestInventory> {
        let mut tasks = JoinSet::new();

        for module in modules {
            let path = module.path.clone();
            let dir = self.module_dir(module);
            let counter = Arc::clone(&self.counter);
            tasks.spawn(async move { (path, scan_dir(&dir, &counter).await) });
        }

        let mut inventory = TestInventory::new();
        while let Some(joined) = tasks.join_next().await {
            let (path, tests) = joined?;
            inventory.insert(path, tests);
        }

        tracing::info!("Scanned {} modules for test sources", inventory.len());
        Ok(inventory)
    }
}

async fn scan_dir(module_dir: &Path, counter: &MethodCounter) -> ModuleTests {
    let mut tests = ModuleTests::default();

    for set in UNIT_SOURCE_SETS {
        if has_sources(&module_dir.join(set)).await {
            tests.unit_sources = true;
        }
    }
    for set in INSTRUMENTED_SOURCE_SETS {
        if has_sources(&module_dir.join(set)).await {
            tests.instrumented_sources = true;
        }
    }

    for dir in COUNTED_DIRECTORIES {
        for file in source_files(&module_dir.join(dir)).await {
            tests.test_methods = tests.test_methods.saturating_add(count_file(&file, counter).await);
        }
    }

    tracing::debug!(
        "{}: unit={} instrumented={} methods={}",
        module_dir.display(),
        tests.unit_sources,
        tests.instrumented_sources,
        tests.test_methods
    );
    tests
}

async fn has_sources(dir: &Path) -> bool {
    !source_files(dir).await.is_empty()
}

/// Unreadable files count as zero.
async fn count_file(path: &Path, counter: &MethodCounter) -> u32 {
    match fs::read_to_string(path).await {
        Ok(content) => counter.count(&content, is_kotlin(path)),
        Err(e) => {
            tracing::warn!("Failed to count tests in {}: {}", path.display(), e);
            0
        }
    }
}

/// Every `.kt`/`.java` file below `dir`, sorted. Missing or unreadable
/// directories contribute nothing.
async fn source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!("Skipping {}: {}", current.display(), e);
                }
                continue;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            match entry.file_type().await {
                Ok(kind) if kind.is_dir() => pending.push(path),
                Ok(kind) if kind.is_file() && is_source(&path) => files.push(path),
                _ => {}
            }
        }
    }

    files.sort();
    files
}

fn is_source(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("kt") | Some("java"))
}

fn is_kotlin(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("kt")
}
