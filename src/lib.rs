//! Lokey - translation key indexer and refactoring toolkit
//!
//! Lokey is a CLI tool and library for indexing internationalization
//! (i18n) resources scattered across a source tree. It discovers locale
//! files by naming convention, parses JSON/YAML/TOML/properties/JS
//! formats into one key→locale→value index, resolves call-site
//! namespaces in host source code, and answers the lookup, search,
//! coverage, create-key, and rename operations editor tooling needs.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands)
//! - `config`: Configuration file loading and parsing
//! - `core`: Core indexing engine (classifier → parsers → index → tools)
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod utils;
