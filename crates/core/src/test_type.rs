//! Test categories.

use serde::{Deserialize, Serialize};
use crate::error::ParseError;

/// A test category, each with its canonical task suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// JVM unit tests
    Unit,
    /// Integration tests
    Integration,
    /// On-device UI tests
    Ui,
    /// End-to-end tests
    E2e,
    /// API tests
    Api,
    /// Performance tests
    Performance,
    /// Contract tests
    Contract,
    /// Aggregate of every category
    All,
}

impl TestType {
    /// Every variant, in declaration order.
    pub const ALL_TYPES: [TestType; 8] = [
        TestType::Unit,
        TestType::Integration,
        TestType::Ui,
        TestType::E2e,
        TestType::Api,
        TestType::Performance,
        TestType::Contract,
        TestType::All,
    ];

    /// Canonical task name for this category.
    pub fn task_suffix(&self) -> &'static str {
        match self {
            TestType::Unit => "test",
            TestType::Integration => "integrationTest",
            TestType::Ui => "uiTest",
            TestType::E2e => "e2eTest",
            TestType::Api => "apiTest",
            TestType::Performance => "performanceTest",
            TestType::Contract => "contractTest",
            TestType::All => "allTests",
        }
    }

    /// Name used in configuration and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Unit => "unit",
            TestType::Integration => "integration",
            TestType::Ui => "ui",
            TestType::E2e => "e2e",
            TestType::Api => "api",
            TestType::Performance => "performance",
            TestType::Contract => "contract",
            TestType::All => "all",
        }
    }

    /// Concrete categories, excluding the `All` aggregate.
    pub fn concrete() -> impl Iterator<Item = TestType> {
        Self::ALL_TYPES.into_iter().filter(|t| *t != TestType::All)
    }

    /// Whether tests of this category run on a device and may live in
    /// instrumentation source sets.
    pub fn is_instrumented(&self) -> bool {
        matches!(self, TestType::Ui | TestType::E2e)
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TestType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_TYPES
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownTestType(s.to_string()))
    }
}
