//! Inventory source abstraction.

use async_trait::async_trait;
use impactscope_core::{ModulePath, ModuleTests, TestInventory};
use std::path::{Path, PathBuf};
use crate::error::Result;

/// A module to inventory: its identifier and directory relative to the
/// repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    /// Module identifier
    pub path: ModulePath,
    /// Repository-relative directory
    pub directory: String,
}

impl ModuleLocation {
    /// Create a module location.
    pub fn new(path: impl Into<ModulePath>, directory: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            directory: directory.into(),
        }
    }
}

/// Where test-presence information comes from.
///
/// Sources run before scope calculation; their output is merged into a
/// [`TestInventory`] whose order does not depend on completion order.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Inventory a single module.
    async fn scan_module(&self, module: &ModuleLocation) -> Result<ModuleTests>;

    /// Inventory every module.
    async fn scan_all(&self, modules: &[ModuleLocation]) -> Result<TestInventory> {
        let mut inventory = TestInventory::new();
        for module in modules {
            let tests = self.scan_module(module).await?;
            inventory.insert(module.path.clone(), tests);
        }
        Ok(inventory)
    }
}

/// Precomputed inventory read from a JSON file.
pub struct JsonInventory {
    inventory: TestInventory,
}

impl JsonInventory {
    /// Wrap an inventory that is already in memory.
    pub fn new(inventory: TestInventory) -> Self {
        Self { inventory }
    }

    /// Load an inventory JSON document.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let json = tokio::fs::read_to_string(&path).await?;
        let inventory: TestInventory = serde_json::from_str(&json)?;
        tracing::debug!("Loaded inventory for {} modules from {}", inventory.len(), path.display());
        Ok(Self { inventory })
    }

    /// The loaded inventory.
    pub fn inventory(&self) -> &TestInventory {
        &self.inventory
    }
}

#[async_trait]
impl InventorySource for JsonInventory {
    async fn scan_module(&self, module: &ModuleLocation) -> Result<ModuleTests> {
        Ok(self.inventory.get(&module.path).copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impactscope_core::TestType;
    use std::io::Write;

    #[tokio::test]
    async fn test_json_inventory_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{":app": {{"unit_sources": true, "test_methods": 3}}}}"#).unwrap();

        let source = JsonInventory::load(file.path()).await.unwrap();
        assert_eq!(source.inventory().len(), 1);

        let app = source.scan_module(&ModuleLocation::new(":app", "app")).await.unwrap();
        assert!(app.supports(TestType::Unit));
        assert_eq!(app.test_methods, 3);
    }

    #[tokio::test]
    async fn test_json_inventory_unknown_module() {
        let source = JsonInventory::new(TestInventory::new());
        let modules = vec![ModuleLocation::new(":lib", "lib")];

        let inventory = source.scan_all(&modules).await.unwrap();
        assert!(!inventory.has_tests(&ModulePath::new(":lib"), TestType::Unit));
        assert_eq!(inventory.len(), 1);
    }

    #[tokio::test]
    async fn test_json_inventory_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = JsonInventory::load(file.path()).await;
        assert!(matches!(result, Err(crate::InventoryError::Serialization(_))));
    }
}
