//! Data model for indexed translations.
//!
//! A [`TranslationEntry`] is one leaf key-value pair found in one file; a
//! [`TranslationFile`] is one scanned locale file together with everything
//! the path resolver derived about it. Entries are replaced wholesale
//! whenever their owning file is reparsed, never mutated in place.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::path_rules::FileOrigin;

/// Serialization format of a translation file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
    Properties,
    /// JS/TS module exporting an object literal.
    Source,
}

impl FileFormat {
    /// Map a file extension to its format, if supported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(FileFormat::Json),
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "toml" => Some(FileFormat::Toml),
            "properties" => Some(FileFormat::Properties),
            "js" | "mjs" | "cjs" | "ts" | "mts" | "cts" => Some(FileFormat::Source),
            _ => None,
        }
    }

    /// Whether key declarations in this format encode hierarchy by nesting
    /// (rename rewrites only the final path segment) rather than writing
    /// the full dotted key on one line.
    pub fn is_nested(self) -> bool {
        matches!(self, FileFormat::Json | FileFormat::Source)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Json => "json",
            FileFormat::Yaml => "yaml",
            FileFormat::Toml => "toml",
            FileFormat::Properties => "properties",
            FileFormat::Source => "source",
        };
        write!(f, "{}", name)
    }
}

/// One leaf key-value pair found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    /// Fully-qualified dotted key, unique within a locale.
    pub key: String,
    /// Raw string content; may contain interpolation placeholders.
    pub value: String,
    /// Locale identifier, e.g. `en`, `zh_CN`.
    pub locale: String,
    /// Owning file.
    pub file: PathBuf,
    /// Byte offset of the key token. Exact for JSON, properties and
    /// source formats; estimated for YAML and TOML.
    pub offset: usize,
    /// Byte length of the key token.
    pub len: usize,
}

/// One scanned locale file and its parsed entries.
#[derive(Debug, Clone)]
pub struct TranslationFile {
    pub path: PathBuf,
    pub format: FileFormat,
    pub locale: String,
    pub module: Option<String>,
    pub business_unit: Option<String>,
    /// Dotted prefix prepended to all keys from this file; empty or
    /// `.`-terminated.
    pub key_prefix: String,
    /// Entries keyed by fully-qualified key.
    pub entries: HashMap<String, TranslationEntry>,
}

impl TranslationFile {
    pub fn new(path: impl Into<PathBuf>, format: FileFormat, origin: FileOrigin) -> Self {
        Self {
            path: path.into(),
            format,
            locale: origin.locale,
            module: origin.module,
            business_unit: origin.business_unit,
            key_prefix: origin.key_prefix,
            entries: HashMap::new(),
        }
    }

    /// Insert a leaf value parsed from this file. `relative_key` is the
    /// key as written in the file; the file's prefix is prepended here so
    /// every entry carries its fully-qualified key.
    pub fn insert(&mut self, relative_key: String, value: String, offset: usize, len: usize) {
        let key = format!("{}{}", self.key_prefix, relative_key);
        self.entries.insert(
            key.clone(),
            TranslationEntry {
                key,
                value,
                locale: self.locale.clone(),
                file: self.path.clone(),
                offset,
                len,
            },
        );
    }

    /// Strip this file's prefix from a fully-qualified key, yielding the
    /// key as written inside the file. Returns None when the key does not
    /// belong to this file's namespace.
    pub fn relative_key<'k>(&self, full_key: &'k str) -> Option<&'k str> {
        full_key.strip_prefix(self.key_prefix.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A recoverable problem hit while scanning or parsing one file. The file
/// contributes nothing to the index; the scan itself continues.
#[derive(Debug, Clone)]
pub struct ScanWarning {
    pub file: PathBuf,
    pub error: String,
}
