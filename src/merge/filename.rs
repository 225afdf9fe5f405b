//! Filename patterns such as `{FullName} - {Group}`.
//!
//! Patterns use single braces (`{Field}`) so they never clash with the
//! `{{Field}}` placeholders of letter bodies. `{{` and `}}` stand for literal
//! braces. A pattern that cannot be parsed produces the fallback basename.

use lazy_static::lazy_static;
use regex::Regex;

use super::row::Row;

pub const FALLBACK_BASENAME: &str = "letter";
pub const DOCX_SUFFIX: &str = ".docx";
pub const DEFAULT_PATTERN: &str = "{FullName} - {Group}";

lazy_static! {
    static ref RESERVED_CHARS: Regex =
        Regex::new(r#"[\\/*?:"<>|]+"#).expect("reserved character pattern is valid");
}

/// A filename pattern together with its fallback basename and required suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePattern {
    pattern: String,
    fallback: String,
    suffix: String,
}

impl Default for FilenamePattern {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

impl FilenamePattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            fallback: FALLBACK_BASENAME.to_string(),
            suffix: DOCX_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Build the filename for `row`: substitute, sanitize, then add the suffix.
    pub fn format(&self, row: &Row) -> String {
        let name = substitute(&self.pattern, row).unwrap_or_else(|| {
            log::debug!(
                "filename pattern '{}' is malformed, using '{}'",
                self.pattern,
                self.fallback
            );
            self.fallback.clone()
        });
        ensure_suffix(sanitize_filename(&name, &self.fallback), &self.suffix)
    }
}

/// Format `pattern` for `row` with the default fallback and `.docx` suffix.
pub fn format_filename(pattern: &str, row: &Row) -> String {
    FilenamePattern::new(pattern).format(row)
}

/// Replace each run of reserved characters (`\ / * ? : " < > |`) with `_` and
/// trim whitespace; an empty result becomes `fallback`.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let replaced = RESERVED_CHARS.replace_all(name, "_");
    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Append `suffix` unless `name` already ends with it, ignoring case.
pub fn ensure_suffix(mut name: String, suffix: &str) -> String {
    if !name.to_lowercase().ends_with(&suffix.to_lowercase()) {
        name.push_str(suffix);
    }
    name
}

/// Substitute `{Field}` tokens. Returns `None` for malformed patterns.
fn substitute(pattern: &str, row: &Row) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return None,
                        Some(c) => field.push(c),
                    }
                }
                out.push_str(&row.get_or_empty(field_name(&field)?));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return None,
            c => out.push(c),
        }
    }

    Some(out)
}

/// Column name of a replacement field; `!conversion` and `:spec` are dropped.
/// Empty and positional (all-digit) fields are rejected.
fn field_name(field: &str) -> Option<&str> {
    let end = field.find(|c| c == '!' || c == ':').unwrap_or(field.len());
    let name = &field[..end];
    if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(name)
    }
}
