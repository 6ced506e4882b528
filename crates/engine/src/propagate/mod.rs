//! Turn breaking path changes into literal renames in external source trees.
//!
//! A [`PlatformConfig`] says how a token path is spelled on one platform
//! (`--colors-primary` for CSS, `$colors-primary` for SCSS). Each path
//! change becomes a [`RenameMapping`] between the old and new spelling;
//! [`scan`] reports where the old spellings occur and [`apply`] rewrites
//! them.

pub mod apply;
pub mod files;
pub mod scan;

pub use apply::{apply, ApplyOptions, ApplyReport, FileReport, FileWriteError};
pub use files::{FileSet, FileSetError};
pub use scan::{scan, FileMatch, Hit, Matcher};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::diff::PathChange;

/// Qualifier segments dropped from paths by the built-in platforms.
const STRUCTURAL_SEGMENTS: &[&str] = &["theme", "brand", "mode", "light", "dark", "default"];

/// How token paths are spelled on one target platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub name: String,
    /// Prepended to every identifier, e.g. `--` or `$`.
    pub prefix: String,
    /// Joins the remaining path segments.
    pub separator: String,
    /// Segments dropped from paths before joining (case-insensitive).
    pub strip_segments: Vec<String>,
    /// Globs, relative to the migration root, selecting files to rewrite.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig::css()
    }
}

impl PlatformConfig {
    pub fn css() -> Self {
        PlatformConfig {
            name: "css".to_string(),
            prefix: "--".to_string(),
            separator: "-".to_string(),
            strip_segments: structural_segments(),
            include: vec!["**/*.css".to_string()],
            exclude: default_excludes(),
        }
    }

    pub fn scss() -> Self {
        PlatformConfig {
            name: "scss".to_string(),
            prefix: "$".to_string(),
            separator: "-".to_string(),
            strip_segments: structural_segments(),
            include: vec!["**/*.scss".to_string()],
            exclude: default_excludes(),
        }
    }

    pub fn js() -> Self {
        PlatformConfig {
            name: "js".to_string(),
            prefix: String::new(),
            separator: ".".to_string(),
            strip_segments: structural_segments(),
            include: vec!["**/*.{js,jsx,ts,tsx}".to_string()],
            exclude: default_excludes(),
        }
    }

    /// The built-in platform with the given name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "css" => Some(Self::css()),
            "scss" => Some(Self::scss()),
            "js" => Some(Self::js()),
            _ => None,
        }
    }

    /// Spell a dot-separated token path for this platform.
    ///
    /// Returns `None` when every segment is structural.
    pub fn identifier(&self, path: &str) -> Option<String> {
        let kept: Vec<&str> = path
            .split('.')
            .filter(|s| !s.is_empty())
            .filter(|s| !self.strip_segments.iter().any(|q| q.eq_ignore_ascii_case(s)))
            .collect();
        if kept.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.prefix, kept.join(self.separator.as_str())))
    }
}

fn structural_segments() -> Vec<String> {
    STRUCTURAL_SEGMENTS.iter().map(|s| s.to_string()).collect()
}

fn default_excludes() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/.git/**".to_string(),
        "**/dist/**".to_string(),
    ]
}

/// A literal rename on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RenameMapping {
    pub from: String,
    pub to: String,
}

/// Derive renames from path changes.
///
/// Changes that collapse to the same spelling on this platform are
/// skipped, and the same rename reported for several modes appears once.
/// If one identifier would be renamed two different ways the first
/// mapping wins.
pub fn build_replacements(changes: &[PathChange], platform: &PlatformConfig) -> Vec<RenameMapping> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut out = Vec::new();
    for change in changes {
        let (Some(from), Some(to)) = (
            platform.identifier(&change.old_path),
            platform.identifier(&change.new_path),
        ) else {
            continue;
        };
        if from == to {
            continue;
        }
        match seen.get(&from) {
            Some(existing) if *existing == to => {}
            Some(existing) => {
                tracing::warn!(
                    "Conflicting renames for {}: keeping {}, ignoring {}",
                    from,
                    existing,
                    to
                );
            }
            None => {
                seen.insert(from.clone(), to.clone());
                out.push(RenameMapping { from, to });
            }
        }
    }
    out
}
