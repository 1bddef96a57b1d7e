//! impactscope core data models.
//!
//! This crate defines the plain data exchanged between the build-system
//! adapter, the impact-analysis engine and downstream executors.

#![warn(missing_docs)]

mod error;

// Graph snapshot
mod module;

// Changes and categories
mod change;
mod test_type;
mod inventory;

// Output
mod result;

// Re-exports
pub use error::ParseError;
pub use module::{Module, ModulePath, ModuleSnapshot};
pub use change::{normalize_path, extension_of, ChangeEntry, ChangeKind, ChangedFile, FileLanguage};
pub use test_type::TestType;
pub use inventory::{ModuleTests, TestInventory};
pub use result::{CriticalChanges, ImpactReport, ImpactResult};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
