//! File-path pattern matching for test-type rules.
//!
//! A pattern is classified once, when configuration is loaded, into one of
//! six structural categories. Categories are tried in this order:
//! - `**/mid/**` - path contains `/mid/`
//! - `**/suffix` - glob suffix anchored at the end of the path, or literal suffix;
//!   every `*` in the suffix stays within one segment
//! - `prefix/**` - path starts with `prefix` or contains `/prefix`
//! - glob containing `/` - full-path match
//! - glob without `/` - file-name match
//! - anything else - substring containment

use impactscope_core::normalize_path;
use regex::Regex;
use crate::error::{ConfigError, Result};

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    kind: PatternKind,
}

/// Structural category of a pattern.
#[derive(Debug, Clone)]
pub enum PatternKind {
    /// `**/mid/**`
    Directory {
        /// The `/mid/` needle
        needle: String,
    },
    /// `**/suffix` where the suffix holds a wildcard
    SuffixGlob {
        /// Anchored regex for the suffix
        regex: Regex,
    },
    /// `**/suffix` with a literal suffix
    Suffix {
        /// The literal suffix
        suffix: String,
    },
    /// `prefix/**`
    Prefix {
        /// The literal prefix
        prefix: String,
    },
    /// Glob with a directory separator, matched against the whole path
    PathGlob {
        /// Anchored regex for the path
        regex: Regex,
    },
    /// Glob without a separator, matched against the file name
    NameGlob {
        /// Anchored regex for the file name
        regex: Regex,
    },
    /// Plain text
    Substring {
        /// Text to look for
        text: String,
    },
}

impl PathPattern {
    /// Classify and compile a pattern.
    pub fn parse(pattern: &str) -> Result<Self> {
        let normalized = normalize_path(pattern.trim());
        if normalized.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }

        let kind = classify(&normalized)?;
        Ok(Self {
            source: normalized,
            kind,
        })
    }

    /// The pattern as written (separators normalized).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled category.
    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    /// Match a repository-relative path.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);

        match &self.kind {
            PatternKind::Directory { needle } => path.contains(needle.as_str()),
            PatternKind::SuffixGlob { regex } => regex.is_match(&path),
            PatternKind::Suffix { suffix } => {
                path.ends_with(suffix.as_str()) || path.contains(&format!("/{}", suffix))
            }
            PatternKind::Prefix { prefix } => {
                path.starts_with(prefix.as_str()) || path.contains(&format!("/{}", prefix))
            }
            PatternKind::PathGlob { regex } => regex.is_match(&path),
            PatternKind::NameGlob { regex } => {
                let name = path.rsplit('/').next().unwrap_or(&path);
                regex.is_match(name)
            }
            PatternKind::Substring { text } => path.contains(text.as_str()),
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn classify(pattern: &str) -> Result<PatternKind> {
    let empty_segment = || ConfigError::EmptySegment(pattern.to_string());

    if pattern.len() > 5 && pattern.starts_with("**/") && pattern.ends_with("/**") {
        let middle = &pattern[3..pattern.len() - 3];
        if middle.is_empty() {
            return Err(empty_segment());
        }
        return Ok(PatternKind::Directory {
            needle: format!("/{}/", middle),
        });
    }

    if let Some(suffix) = pattern.strip_prefix("**/") {
        if suffix.is_empty() {
            return Err(empty_segment());
        }
        if suffix.contains('*') {
            let regex = compile(pattern, &format!("^.*/{}$", segment_glob_to_regex(suffix)))?;
            return Ok(PatternKind::SuffixGlob { regex });
        }
        return Ok(PatternKind::Suffix {
            suffix: suffix.to_string(),
        });
    }

    if let Some(prefix) = pattern.strip_suffix("/**") {
        if prefix.is_empty() {
            return Err(empty_segment());
        }
        return Ok(PatternKind::Prefix {
            prefix: prefix.to_string(),
        });
    }

    if pattern.contains('*') {
        let regex = compile(pattern, &format!("^{}$", glob_to_regex(pattern)))?;
        return Ok(if pattern.contains('/') {
            PatternKind::PathGlob { regex }
        } else {
            PatternKind::NameGlob { regex }
        });
    }

    Ok(PatternKind::Substring {
        text: pattern.to_string(),
    })
}

/// Translate glob wildcards: `**` crosses directories, `*` stays within one
/// segment, everything else is literal.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '*' {
            if chars.peek() == Some(&'*') {
                chars.next();
                out.push_str(".*");
            } else {
                out.push_str("[^/]*");
            }
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        }
    }

    out
}

/// Translate a `**/` suffix: every `*`, doubled or not, stays within one
/// segment, everything else is literal.
fn segment_glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);

    for c in glob.chars() {
        if c == '*' {
            out.push_str("[^/]*");
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        }
    }

    out
}

fn compile(pattern: &str, regex: &str) -> Result<Regex> {
    Regex::new(regex).map_err(|source| ConfigError::Regex {
        pattern: pattern.to_string(),
        source,
    })
}
