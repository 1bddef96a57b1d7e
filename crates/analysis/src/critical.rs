//! Detection of root-scope changes that invalidate the whole project.

use impactscope_core::{ChangedFile, CriticalChanges};
use crate::classifier::is_root_level_config_file;

/// Checks root-scope files against both critical triggers. Files owned by a
/// module are never critical, whatever their name.
pub struct CriticalPathDetector<'c> {
    fragments: &'c [String],
}

impl<'c> CriticalPathDetector<'c> {
    /// Create a detector for the configured critical fragments.
    pub fn new(fragments: &'c [String]) -> Self {
        Self { fragments }
    }

    /// Collect the root-scope files that fired each trigger.
    pub fn detect(&self, files: &[ChangedFile]) -> CriticalChanges {
        let mut critical = CriticalChanges::default();

        for file in files.iter().filter(|f| f.is_root_scope()) {
            if is_root_level_config_file(&file.path) {
                critical.root_config_files.push(file.path.clone());
            }
            if self.fragments.iter().any(|f| !f.is_empty() && file.path.contains(f.as_str())) {
                critical.critical_path_files.push(file.path.clone());
            }
        }

        if critical.is_critical() {
            tracing::info!(
                "Critical changes: {} root config files, {} critical path files",
                critical.root_config_files.len(),
                critical.critical_path_files.len()
            );
        }
        critical
    }
}
