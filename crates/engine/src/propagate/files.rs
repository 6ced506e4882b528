//! Expand include/exclude globs under a root directory into a file list.
//!
//! Globs are matched against paths relative to the root, with `/`
//! separators: `*` stays within a segment, `**` crosses segments, `?` is
//! one character, and `{a,b}` is an alternation.

use regex::Regex;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum FileSetError {
    #[error("root '{0}' is not a directory")]
    MissingRoot(PathBuf),

    #[error("invalid glob '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("walking '{path}': {message}")]
    Walk { path: PathBuf, message: String },
}

/// A compiled glob.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, FileSetError> {
        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| {
            FileSetError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Glob {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, relative: &str) -> bool {
        self.regex.is_match(relative)
    }
}

/// Translate a glob into an anchored regex.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    let mut in_group = false;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '{' if !in_group => {
                in_group = true;
                out.push_str("(?:");
            }
            '}' if in_group => {
                in_group = false;
                out.push(')');
            }
            ',' if in_group => out.push('|'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out.push('$');
    out
}

/// Files under a root selected by include/exclude globs, sorted by path.
#[derive(Debug, Clone)]
pub struct FileSet {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl FileSet {
    pub fn collect(
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<Self, FileSetError> {
        if !root.is_dir() {
            return Err(FileSetError::MissingRoot(root.to_path_buf()));
        }
        let include = compile(include)?;
        let exclude = compile(exclude)?;

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Prune excluded directories before descending.
                !e.file_type().is_dir()
                    || relative(root, e.path())
                        .map(|rel| rel.is_empty() || !matches_any(&exclude, &format!("{}/", rel)))
                        .unwrap_or(true)
            });
        for entry in walker {
            let entry = entry.map_err(|e| map_walkdir_error(root, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = relative(root, entry.path()) else {
                continue;
            };
            if matches_any(&include, &rel) && !matches_any(&exclude, &rel) {
                files.push(entry.into_path());
            }
        }
        tracing::debug!("Collected {} file(s) under {}", files.len(), root.display());
        Ok(FileSet {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Glob>, FileSetError> {
    patterns.iter().map(|p| Glob::new(p)).collect()
}

fn matches_any(globs: &[Glob], relative: &str) -> bool {
    globs.iter().any(|g| g.is_match(relative))
}

/// Relative path with `/` separators.
fn relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn map_walkdir_error(root: &Path, err: walkdir::Error) -> FileSetError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    FileSetError::Walk {
        path,
        message: err.to_string(),
    }
}
