use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{PlatformConfig, RenameMapping};

/// Characters that extend an identifier on every platform.
fn is_base_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// One occurrence of an old identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
    pub from: String,
    pub to: String,
}

/// Occurrences found in one file. Files without hits are never reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatch {
    pub path: PathBuf,
    pub hits: Vec<Hit>,
}

/// Literal, boundary-aware matcher over a set of renames.
///
/// An occurrence must not touch an identifier character on either side.
/// Besides `[A-Za-z0-9_-]` that includes the platform's separator and
/// prefix characters, so with `.` as separator `colors.primary` matches
/// neither `colors.primary.hover` nor `tokens.colors.primary`.
#[derive(Debug)]
pub struct Matcher {
    regex: Regex,
    /// Longest `from` first, so a longer identifier wins over its prefix.
    mappings: Vec<RenameMapping>,
    extra_identifier_chars: Vec<char>,
}

struct Occurrence {
    start: usize,
    end: usize,
    mapping: usize,
}

impl Matcher {
    /// Returns `None` when there is nothing to match.
    pub fn new(mappings: &[RenameMapping], platform: &PlatformConfig) -> Option<Self> {
        let mut mappings: Vec<RenameMapping> = mappings
            .iter()
            .filter(|m| !m.from.is_empty())
            .cloned()
            .collect();
        if mappings.is_empty() {
            return None;
        }
        mappings.sort_by(|a, b| b.from.len().cmp(&a.from.len()).then(a.from.cmp(&b.from)));

        let alternation = mappings
            .iter()
            .map(|m| regex::escape(&m.from))
            .collect::<Vec<_>>()
            .join("|");
        // Escaped literals always form a valid pattern.
        let regex = Regex::new(&alternation).ok()?;

        let mut extra_identifier_chars: Vec<char> = platform
            .separator
            .chars()
            .chain(platform.prefix.chars())
            .filter(|c| !is_base_identifier_char(*c))
            .collect();
        extra_identifier_chars.sort_unstable();
        extra_identifier_chars.dedup();

        Some(Matcher {
            regex,
            mappings,
            extra_identifier_chars,
        })
    }

    fn is_identifier_char(&self, c: char) -> bool {
        is_base_identifier_char(c) || self.extra_identifier_chars.contains(&c)
    }

    fn is_bounded(&self, text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(|c| self.is_identifier_char(c))
            && !after.is_some_and(|c| self.is_identifier_char(c))
    }

    fn occurrences(&self, text: &str) -> Vec<Occurrence> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos <= text.len() {
            let Some(m) = self.regex.find_at(text, pos) else {
                break;
            };
            let start = m.start();
            let rest = &text[start..];
            let found = self.mappings.iter().position(|mapping| {
                rest.starts_with(&mapping.from)
                    && self.is_bounded(text, start, start + mapping.from.len())
            });
            match found {
                Some(i) => {
                    let end = start + self.mappings[i].from.len();
                    out.push(Occurrence {
                        start,
                        end,
                        mapping: i,
                    });
                    pos = end;
                }
                // Not a whole identifier here; try the next character.
                None => pos = start + rest.chars().next().map_or(1, char::len_utf8),
            }
        }
        out
    }

    /// Positions of every old identifier in `text`.
    pub fn hits(&self, text: &str) -> Vec<Hit> {
        let mut line = 1;
        let mut line_start = 0;
        let mut cursor = 0;
        self.occurrences(text)
            .into_iter()
            .map(|o| {
                for (i, c) in text[cursor..o.start].char_indices() {
                    if c == '\n' {
                        line += 1;
                        line_start = cursor + i + 1;
                    }
                }
                cursor = o.start;
                let mapping = &self.mappings[o.mapping];
                Hit {
                    line,
                    column: text[line_start..o.start].chars().count() + 1,
                    from: mapping.from.clone(),
                    to: mapping.to.clone(),
                }
            })
            .collect()
    }

    /// Rewrite every occurrence in one pass. Replaced text is never
    /// rescanned, so `a -> b` and `b -> c` do not chain.
    pub fn replace(&self, text: &str) -> (String, usize) {
        let occurrences = self.occurrences(text);
        if occurrences.is_empty() {
            return (text.to_string(), 0);
        }
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for o in &occurrences {
            out.push_str(&text[last..o.start]);
            out.push_str(&self.mappings[o.mapping].to);
            last = o.end;
        }
        out.push_str(&text[last..]);
        (out, occurrences.len())
    }
}

/// Report where old identifiers occur. Read-only.
///
/// Files that cannot be read as UTF-8 text are skipped with a warning.
pub async fn scan(
    mappings: &[RenameMapping],
    platform: &PlatformConfig,
    files: &[PathBuf],
) -> Vec<FileMatch> {
    let Some(matcher) = Matcher::new(mappings, platform) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for path in files {
        match read_text(path).await {
            Ok(text) => {
                let hits = matcher.hits(&text);
                if !hits.is_empty() {
                    out.push(FileMatch {
                        path: path.clone(),
                        hits,
                    });
                }
            }
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    out
}

pub(super) async fn read_text(path: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(path).await
}
