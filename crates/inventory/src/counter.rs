//! Best-effort test-method counting.

use regex::Regex;
use crate::error::Result;

/// Counts test methods in JVM test sources by annotation.
#[derive(Debug, Clone)]
pub struct MethodCounter {
    test: Regex,
    repeated: Regex,
    parameterized: Regex,
    kotlin_named: Regex,
}

impl MethodCounter {
    /// Compile the counting patterns.
    pub fn new() -> Result<Self> {
        Ok(Self {
            test: Regex::new(r"@Test\s*(\(|\n|$)")?,
            repeated: Regex::new(r"@RepeatedTest\s*\(")?,
            parameterized: Regex::new(r"@ParameterizedTest\s*(\n|$)")?,
            kotlin_named: Regex::new(r"fun\s+`test\s+[^`]+`\s*\(")?,
        })
    }

    /// Count test methods in one source file. Backtick-named `test ...`
    /// functions are only counted in Kotlin sources.
    pub fn count(&self, content: &str, kotlin: bool) -> u32 {
        let mut count = self.test.find_iter(content).count()
            + self.repeated.find_iter(content).count()
            + self.parameterized.find_iter(content).count();

        if kotlin {
            count += self.kotlin_named.find_iter(content).count();
        }

        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_junit_annotations() {
        let counter = MethodCounter::new().unwrap();
        let source = r#"
class LoginTest {
    @Test
    fun validCredentials() {}

    @Test(expected = IllegalStateException::class)
    fun invalidCredentials() {}

    @RepeatedTest(3)
    fun flaky() {}

    @ParameterizedTest
    @ValueSource(strings = ["a", "b"])
    fun params(value: String) {}
}
"#;
        assert_eq!(counter.count(source, true), 4);
    }

    #[test]
    fn test_kotlin_named_functions() {
        let counter = MethodCounter::new().unwrap();
        let source = "fun `test login succeeds`() {}\nfun `test logout`() {}\nfun helper() {}\n";
        assert_eq!(counter.count(source, true), 2);
        assert_eq!(counter.count(source, false), 0);
    }

    #[test]
    fn test_similar_annotations_are_ignored() {
        let counter = MethodCounter::new().unwrap();
        let source = "@TestFactory\nfun dynamic() {}\n@TestInstance(PER_CLASS)\n";
        assert_eq!(counter.count(source, true), 0);
    }

    #[test]
    fn test_annotation_at_end_of_file() {
        let counter = MethodCounter::new().unwrap();
        assert_eq!(counter.count("@Test", false), 1);
        assert_eq!(counter.count("", false), 0);
    }
}
