//! Errors raised while parsing plain input data.

/// Errors that can occur when parsing input values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Test-type name not in the closed set
    #[error("unknown test type: {0}")]
    UnknownTestType(String),

    /// Change-status letter not understood
    #[error("unknown change status: {0}")]
    UnknownChangeStatus(String),

    /// Change-list line without a path column
    #[error("line {line}: missing path")]
    MissingPath {
        /// 1-based line number
        line: usize,
    },
}
