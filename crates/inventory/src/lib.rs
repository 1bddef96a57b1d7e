//! Test-source inventory for impactscope.
//!
//! The inventory phase runs before any scope decision: it records, per
//! module, whether unit and instrumentation test sources exist and roughly
//! how many test methods they hold.

#![warn(missing_docs)]

pub mod error;
pub mod counter;
pub mod source;
pub mod fs;

pub use error::{InventoryError, Result};
pub use counter::MethodCounter;
pub use source::{InventorySource, JsonInventory, ModuleLocation};
pub use fs::FsInventory;
