//! Inventory errors.

/// Error type for inventory sources.
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Errors that can occur while building a test inventory.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Counter pattern failed to compile
    #[error("Invalid counter pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A scan task panicked or was cancelled
    #[error("Scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
