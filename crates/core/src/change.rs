//! Changed files and change lists.

use serde::{Deserialize, Serialize};
use crate::error::ParseError;
use crate::module::ModulePath;

/// Normalize a repository-relative path to forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Kind of change recorded for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// New file
    Added,
    /// Content or type changed
    Modified,
    /// Removed file
    Deleted,
    /// Moved, reported under the new path
    Renamed,
    /// Copied, reported under the new path
    Copied,
}

impl ChangeKind {
    /// Parse a `--name-status` letter (`A`, `M`, `D`, `R100`, `C75`, `T`).
    pub fn from_status(status: &str) -> Result<Self, ParseError> {
        match status.chars().next() {
            Some('A') => Ok(ChangeKind::Added),
            Some('M') | Some('T') => Ok(ChangeKind::Modified),
            Some('D') => Ok(ChangeKind::Deleted),
            Some('R') => Ok(ChangeKind::Renamed),
            Some('C') => Ok(ChangeKind::Copied),
            _ => Err(ParseError::UnknownChangeStatus(status.to_string())),
        }
    }
}

/// Language tag detected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileLanguage {
    /// Kotlin sources and scripts
    Kotlin,
    /// Java sources
    Java,
    /// Resources and manifests
    Xml,
    /// JSON documents
    Json,
    /// Groovy sources and Gradle scripts
    Groovy,
    /// Properties files
    Properties,
    /// YAML documents
    Yaml,
    /// Anything else
    Unknown,
}

impl FileLanguage {
    /// Extensions belonging to this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileLanguage::Kotlin => &["kt", "kts"],
            FileLanguage::Java => &["java"],
            FileLanguage::Xml => &["xml"],
            FileLanguage::Json => &["json"],
            FileLanguage::Groovy => &["groovy", "gradle"],
            FileLanguage::Properties => &["properties"],
            FileLanguage::Yaml => &["yaml", "yml"],
            FileLanguage::Unknown => &[],
        }
    }

    /// Detect from a bare extension, case-insensitively.
    pub fn from_extension(extension: &str) -> Self {
        const KNOWN: [FileLanguage; 7] = [
            FileLanguage::Kotlin,
            FileLanguage::Java,
            FileLanguage::Xml,
            FileLanguage::Json,
            FileLanguage::Groovy,
            FileLanguage::Properties,
            FileLanguage::Yaml,
        ];

        KNOWN
            .into_iter()
            .find(|lang| lang.extensions().iter().any(|ext| ext.eq_ignore_ascii_case(extension)))
            .unwrap_or(FileLanguage::Unknown)
    }

    /// Detect from a path.
    pub fn from_path(path: &str) -> Self {
        Self::from_extension(extension_of(path))
    }
}

/// Extension of the final path segment, or `""` when there is none.
pub fn extension_of(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

/// A change as reported by the VCS adapter, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Repository-relative path (the new path for renames and copies)
    pub path: String,

    /// Kind of change
    pub kind: ChangeKind,
}

impl ChangeEntry {
    /// Create an entry.
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Parse a change list in `git diff --name-status` form.
    ///
    /// Each non-blank line is `<status>\t<path>` or, for renames and copies,
    /// `<status>\t<old>\t<new>`. Whitespace-separated columns are also accepted.
    pub fn parse_name_status(text: &str) -> Result<Vec<ChangeEntry>, ParseError> {
        let mut entries = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let columns: Vec<&str> = if line.contains('\t') {
                line.split('\t').map(str::trim).filter(|c| !c.is_empty()).collect()
            } else {
                line.split_whitespace().collect()
            };

            let kind = ChangeKind::from_status(columns[0])?;
            let Some(path) = columns.last().filter(|_| columns.len() >= 2) else {
                return Err(ParseError::MissingPath { line: idx + 1 });
            };

            entries.push(ChangeEntry::new(normalize_path(path), kind));
        }

        Ok(entries)
    }
}

/// A changed file attributed to its owning module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Normalized repository-relative path
    pub path: String,

    /// Owning module, `None` for root-scope files
    pub module: Option<ModulePath>,

    /// Kind of change
    pub change_kind: ChangeKind,

    /// Detected language
    pub language: FileLanguage,
}

impl ChangedFile {
    /// Whether the file belongs to no module, or to the synthetic root.
    pub fn is_root_scope(&self) -> bool {
        self.module.as_ref().map_or(true, ModulePath::is_root)
    }
}
