//! Format parsers turning raw locale files into flat key → entry maps.
//!
//! All parsers share one contract: nested structures flatten by joining
//! ancestor keys with `.`, only leaf string values become entries, and a
//! malformed file surfaces as an error at this boundary so the caller can
//! degrade that file to an empty contribution instead of aborting a scan.
//!
//! Offset quality differs per format and is part of the contract: JSON,
//! properties, and source files carry exact key-token offsets; YAML and
//! TOML offsets are estimated by progressive text search and are only
//! guaranteed to land on the right line.

pub mod json;
pub mod properties;
pub mod source;
pub mod toml;
pub mod yaml;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::entry::{FileFormat, TranslationFile};
use crate::core::path_rules::{FileOrigin, parse_file_path};

/// Read and parse one translation file.
pub fn parse_file(path: &Path, project_root: &Path) -> Result<TranslationFile> {
    let origin = parse_file_path(path, project_root);
    let format = FileFormat::from_path(path)
        .with_context(|| format!("Unsupported translation file: {}", path.display()))?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_str(&content, path, format, origin)
}

/// Parse already-loaded content. Split out from [`parse_file`] so tests
/// and the rename engine can parse without touching the filesystem.
pub fn parse_str(
    content: &str,
    path: &Path,
    format: FileFormat,
    origin: FileOrigin,
) -> Result<TranslationFile> {
    let mut file = TranslationFile::new(path, format, origin);
    match format {
        FileFormat::Json => json::parse_into(content, &mut file)?,
        FileFormat::Yaml => yaml::parse_into(content, &mut file)?,
        FileFormat::Toml => toml::parse_into(content, &mut file)?,
        FileFormat::Properties => properties::parse_into(content, &mut file)?,
        FileFormat::Source => source::parse_into(content, &mut file)?,
    }
    Ok(file)
}

/// Join a dotted ancestor path with one more segment.
pub(crate) fn join_key(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

/// Locate a key token by scanning forward from `cursor` for `token`
/// followed (after an optional closing quote and whitespace) by one of
/// `terminators`. Falls back to a scan from the start of the content, and
/// finally to the cursor position itself, so callers always get a usable
/// estimate. Returns (offset, length) of the token as written.
pub(crate) fn find_key_token(
    content: &str,
    cursor: usize,
    token: &str,
    terminators: &[char],
) -> (usize, usize) {
    let cursor = cursor.min(content.len());
    for start in [cursor, 0] {
        if let Some((offset, len)) = scan_for_token(&content[start..], token, terminators) {
            return (start + offset, len);
        }
    }
    (cursor, token.len())
}

fn scan_for_token(haystack: &str, token: &str, terminators: &[char]) -> Option<(usize, usize)> {
    if token.is_empty() {
        return None;
    }
    let mut pos = 0;
    while let Some(rel) = haystack[pos..].find(token) {
        let at = pos + rel;
        let after = at + token.len();
        let mut rest = haystack[after..].chars();
        let mut first = rest.next();
        let mut len = token.len();
        // Tolerate a quoted token: `"key":` or `'key' =`
        if matches!(first, Some('"' | '\'')) {
            len += 1;
            first = rest.next();
        }
        let mut next = first;
        while next.is_some_and(|c| c.is_whitespace()) {
            next = rest.next();
        }
        if next.is_some_and(|c| terminators.contains(&c)) {
            return Some((at, len));
        }
        pos = at + 1;
    }
    None
}
