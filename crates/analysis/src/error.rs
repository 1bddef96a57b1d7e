//! Graph assembly errors.

use impactscope_core::ModulePath;

/// Error type for graph assembly.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while assembling a module graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The same module id was declared twice
    #[error("duplicate module: {0}")]
    DuplicateModule(ModulePath),

    /// A dependency edge points at an undeclared module
    #[error("module {module} depends on unknown module {dependency}")]
    UnknownDependency {
        /// Declaring module
        module: ModulePath,
        /// Missing target
        dependency: ModulePath,
    },
}
