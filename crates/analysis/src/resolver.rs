//! Concrete task names per module, test type and build variant.

use impactscope_core::{Module, ModulePath, TestType};
use impactscope_rules::BuildVariants;

/// Resolves concrete task names from the configured build variants.
#[derive(Debug, Clone)]
pub struct TaskNameResolver<'v> {
    variants: &'v BuildVariants,
}

impl<'v> TaskNameResolver<'v> {
    /// Create a resolver for the given variants.
    pub fn new(variants: &'v BuildVariants) -> Self {
        Self { variants }
    }

    /// Unqualified task name for a module and test type.
    ///
    /// Prefers the variant task (`test<Variant>UnitTest`,
    /// `connected<Variant>AndroidTest`), then any available task of the
    /// same shape naming the variant, then the canonical suffix.
    pub fn task_name(&self, module: &Module, test_type: TestType) -> String {
        let Some((prefix, suffix, variant)) = self.variant_shape(test_type) else {
            return test_type.task_suffix().to_string();
        };

        let exact = format!("{}{}{}", prefix, capitalize(variant), suffix);
        if module.has_task(&exact) {
            return exact;
        }

        let variant = variant.to_lowercase();
        module
            .test_tasks
            .iter()
            .find(|t| {
                t.len() > prefix.len() + suffix.len()
                    && t.starts_with(prefix)
                    && t.ends_with(suffix)
                    && t.to_lowercase().contains(&variant)
            })
            .cloned()
            .unwrap_or_else(|| test_type.task_suffix().to_string())
    }

    /// Qualified task for a module and test type, or `None` when the module
    /// exposes neither the resolved name nor the canonical suffix.
    pub fn resolve(&self, module: &Module, test_type: TestType) -> Option<String> {
        let name = self.task_name(module, test_type);
        if module.has_task(&name) || module.has_task(test_type.task_suffix()) {
            Some(module.path.qualify(&name))
        } else {
            None
        }
    }

    /// Qualified Kotlin compile task for a module.
    pub fn compile_task(&self, module: &ModulePath) -> String {
        let task = if self.variants.compile.is_empty() {
            "compileKotlin".to_string()
        } else {
            format!("compile{}Kotlin", capitalize(&self.variants.compile))
        };
        module.qualify(&task)
    }

    fn variant_shape(&self, test_type: TestType) -> Option<(&'static str, &'static str, &'v str)> {
        let shape = match test_type {
            TestType::Unit => ("test", "UnitTest", self.variants.unit.as_str()),
            TestType::Ui | TestType::E2e => {
                ("connected", "AndroidTest", self.variants.instrumented.as_str())
            }
            _ => return None,
        };
        if shape.2.is_empty() {
            None
        } else {
            Some(shape)
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn module(path: &str, tasks: &[&str]) -> Module {
        Module {
            path: ModulePath::new(path),
            directory: path.trim_start_matches(':').replace(':', "/"),
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            test_tasks: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_plain_unit_task() {
        let variants = BuildVariants::default();
        let resolver = TaskNameResolver::new(&variants);
        let m = module(":feature", &["test"]);
        assert_eq!(resolver.task_name(&m, TestType::Unit), "test");
        assert_eq!(resolver.resolve(&m, TestType::Unit), Some(":feature:test".to_string()));
    }

    #[test]
    fn test_variant_unit_task_preferred() {
        let variants = BuildVariants::default();
        let resolver = TaskNameResolver::new(&variants);
        let m = module(":app", &["test", "testDebugUnitTest", "testReleaseUnitTest"]);
        assert_eq!(resolver.resolve(&m, TestType::Unit), Some(":app:testDebugUnitTest".to_string()));
    }

    #[test]
    fn test_generic_variant_search() {
        let variants = BuildVariants {
            unit: "debug".to_string(),
            ..Default::default()
        };
        let resolver = TaskNameResolver::new(&variants);
        let m = module(":app", &["testProdDebugUnitTest", "testProdReleaseUnitTest"]);
        assert_eq!(resolver.task_name(&m, TestType::Unit), "testProdDebugUnitTest");
    }

    #[test]
    fn test_instrumented_task() {
        let variants = BuildVariants::default();
        let resolver = TaskNameResolver::new(&variants);
        let m = module(":app", &["test", "connectedDebugAndroidTest"]);
        assert_eq!(
            resolver.resolve(&m, TestType::Ui),
            Some(":app:connectedDebugAndroidTest".to_string())
        );
        assert_eq!(
            resolver.resolve(&m, TestType::E2e),
            Some(":app:connectedDebugAndroidTest".to_string())
        );
    }

    #[test]
    fn test_other_types_use_suffix() {
        let variants = BuildVariants::default();
        let resolver = TaskNameResolver::new(&variants);
        let m = module(":api", &["test", "apiTest"]);
        assert_eq!(resolver.resolve(&m, TestType::Api), Some(":api:apiTest".to_string()));
        assert_eq!(resolver.resolve(&m, TestType::Integration), None);
    }

    #[test]
    fn test_missing_task_is_not_emitted() {
        let variants = BuildVariants::default();
        let resolver = TaskNameResolver::new(&variants);
        let m = module(":lib", &["lint"]);
        assert_eq!(resolver.resolve(&m, TestType::Unit), None);
    }

    #[test]
    fn test_root_module_is_unprefixed() {
        let variants = BuildVariants::default();
        let resolver = TaskNameResolver::new(&variants);
        let m = module(":", &["test"]);
        assert_eq!(resolver.resolve(&m, TestType::Unit), Some("test".to_string()));
    }

    #[test]
    fn test_compile_task() {
        let variants = BuildVariants {
            compile: "release".to_string(),
            ..Default::default()
        };
        let resolver = TaskNameResolver::new(&variants);
        assert_eq!(resolver.compile_task(&ModulePath::new(":app")), ":app:compileReleaseKotlin");

        let variants = BuildVariants {
            compile: String::new(),
            ..Default::default()
        };
        let resolver = TaskNameResolver::new(&variants);
        assert_eq!(resolver.compile_task(&ModulePath::new(":app")), ":app:compileKotlin");
    }
}
