//! Per-module test-source inventory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::module::ModulePath;
use crate::test_type::TestType;

/// Test sources found in one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTests {
    /// JVM test sources present (`src/test`)
    #[serde(default)]
    pub unit_sources: bool,

    /// Instrumentation test sources present (`src/androidTest*`)
    #[serde(default)]
    pub instrumented_sources: bool,

    /// Best-effort count of test methods
    #[serde(default)]
    pub test_methods: u32,
}

impl ModuleTests {
    /// Whether the module can run tests of the given category.
    pub fn supports(&self, test_type: TestType) -> bool {
        if test_type.is_instrumented() {
            self.unit_sources || self.instrumented_sources
        } else {
            self.unit_sources
        }
    }
}

/// Test-source inventory for a whole project, computed before scope decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestInventory {
    modules: BTreeMap<ModulePath, ModuleTests>,
}

impl TestInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the tests of one module, replacing any previous entry.
    pub fn insert(&mut self, module: ModulePath, tests: ModuleTests) {
        self.modules.insert(module, tests);
    }

    /// Look up a module.
    pub fn get(&self, module: &ModulePath) -> Option<&ModuleTests> {
        self.modules.get(module)
    }

    /// Whether a module has sources for the given category. Unknown modules have none.
    pub fn has_tests(&self, module: &ModulePath, test_type: TestType) -> bool {
        self.get(module).map(|t| t.supports(test_type)).unwrap_or(false)
    }

    /// Test-method count for a module, zero when unknown.
    pub fn test_methods(&self, module: &ModulePath) -> u32 {
        self.get(module).map(|t| t.test_methods).unwrap_or(0)
    }

    /// Iterate entries in module order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModulePath, &ModuleTests)> {
        self.modules.iter()
    }

    /// Number of modules recorded.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FromIterator<(ModulePath, ModuleTests)> for TestInventory {
    fn from_iter<I: IntoIterator<Item = (ModulePath, ModuleTests)>>(iter: I) -> Self {
        Self {
            modules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrumented_types_accept_android_sources() {
        let tests = ModuleTests {
            unit_sources: false,
            instrumented_sources: true,
            test_methods: 0,
        };
        assert!(tests.supports(TestType::Ui));
        assert!(tests.supports(TestType::E2e));
        assert!(!tests.supports(TestType::Unit));
        assert!(!tests.supports(TestType::Integration));
    }

    #[test]
    fn test_unknown_module_has_no_tests() {
        let inventory = TestInventory::new();
        assert!(!inventory.has_tests(&ModulePath::new(":app"), TestType::Unit));
        assert_eq!(inventory.test_methods(&ModulePath::new(":app")), 0);
    }

    #[test]
    fn test_inventory_json_shape() {
        let json = r#"{":app": {"unit_sources": true, "test_methods": 12}}"#;
        let inventory: TestInventory = serde_json::from_str(json).unwrap();
        assert!(inventory.has_tests(&ModulePath::new(":app"), TestType::Unit));
        assert_eq!(inventory.test_methods(&ModulePath::new(":app")), 12);
    }
}
