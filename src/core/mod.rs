//! Core indexing engine.
//!
//! Dependency order, leaf first: locale classification, path-to-prefix
//! resolution, format parsers, directory scanning, then the translation
//! index everything else queries (namespace resolution, fuzzy matching,
//! rename, create-key, coverage, watching).

pub mod cancel;
pub mod entry;
pub mod framework;
pub mod index;
pub mod js;
pub mod locale;
pub mod matching;
pub mod namespace;
pub mod parsers;
pub mod path_rules;
pub mod rename;
pub mod report;
pub mod scanner;
pub mod watch;
pub mod writer;

pub use cancel::CancelToken;
pub use entry::{FileFormat, ScanWarning, TranslationEntry, TranslationFile};
pub use framework::Framework;
pub use index::{FALLBACK_LOCALES, IndexOptions, TranslationIndex};
pub use namespace::{KeyCandidate, KeyUsage};
pub use path_rules::{FileOrigin, parse_file_path};
pub use report::CoverageReport;
