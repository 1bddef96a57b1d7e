//! Configuration errors.

/// Error type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while assembling an [`ImpactConfig`](crate::ImpactConfig).
///
/// All of them surface at load time, before any changed file is matched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Rule keyed by a name outside the closed test-type set
    #[error("unknown test type in rules: {0}")]
    UnknownTestType(String),

    /// Two rule keys naming the same test type, e.g. `unit` and `Unit`
    #[error("duplicate rule for test type: {0}")]
    DuplicateTestType(String),

    /// Blank pattern
    #[error("empty pattern")]
    EmptyPattern,

    /// Glob pattern whose fixed part is empty, e.g. `**/` or `/**`
    #[error("pattern '{0}' has an empty segment")]
    EmptySegment(String),

    /// Glob that does not compile to a regex
    #[error("invalid pattern '{pattern}': {source}")]
    Regex {
        /// Offending pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
