//! Project tree scanning for translation files.
//!
//! Two rules decide what counts as a translation file, and
//! [`is_translation_file`] is the single source of truth for both the
//! scanner and the file-change listener:
//!
//! 1. a supported extension under a locale-named directory at any depth;
//! 2. a `messages[_-]<lang>[[_-]<REGION>].properties` bundle under a
//!    `resources` ancestor (backend bundles have no `locales/` directory).

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::core::entry::FileFormat;
use crate::core::path_rules::{LOCALE_DIR_NAMES, bundle_locale};

/// Directories never descended into. Dot-directories are pruned as well.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build", "target", "out"];

/// Walk the project tree and collect every translation file.
///
/// `extra_excludes` extends the built-in exclusion set with names from the
/// project configuration. A missing root yields an empty list.
pub fn scan(project_root: &Path, extra_excludes: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(project_root)
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            // Never prune the root itself, even when the project lives in
            // a directory with an excluded name.
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !is_excluded_dir(&name, extra_excludes)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_translation_file(path, project_root))
        .collect();
    files.sort();
    files
}

/// Extensions of host-language source files searched for call-site
/// usages. Broader than the translation set: JSX/TSX files hold calls but
/// never locale data.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];

/// Collect source files that may contain translation calls. Translation
/// files themselves are excluded; they are declaration sites.
pub fn scan_source_files(project_root: &Path, extra_excludes: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(project_root)
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() || entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !is_excluded_dir(&name, extra_excludes)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
                && !is_translation_file(path, project_root)
        })
        .collect();
    files.sort();
    files
}

fn is_excluded_dir(name: &str, extra_excludes: &[String]) -> bool {
    name.starts_with('.')
        || EXCLUDED_DIRS.iter().any(|d| d.eq_ignore_ascii_case(name))
        || extra_excludes.iter().any(|d| d.eq_ignore_ascii_case(name))
}

/// Whether a path is a translation file this index cares about.
///
/// Reused by the file-change listener so watcher events and full scans can
/// never disagree about what belongs to the index. Exclusion directories
/// anywhere on the relative path disqualify the file; the watcher sees
/// events under `target/` that the scanner would have pruned.
pub fn is_translation_file(path: &Path, project_root: &Path) -> bool {
    let rel = path.strip_prefix(project_root).unwrap_or(path);
    let dirs: Vec<String> = rel
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(seg) => Some(seg.to_string_lossy().to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if dirs
        .iter()
        .any(|seg| seg.starts_with('.') || EXCLUDED_DIRS.iter().any(|d| d.eq_ignore_ascii_case(seg)))
    {
        return false;
    }

    let Some(format) = FileFormat::from_path(rel) else {
        return false;
    };

    // Rule 1: supported extension under a locale-named directory.
    let under_locale_dir = dirs
        .iter()
        .any(|seg| LOCALE_DIR_NAMES.iter().any(|n| n.eq_ignore_ascii_case(seg)));
    if under_locale_dir {
        return true;
    }

    // Rule 2: backend message bundle under a `resources` ancestor.
    if format == FileFormat::Properties
        && dirs.iter().any(|seg| seg.eq_ignore_ascii_case("resources"))
        && let Some(stem) = rel.file_stem().and_then(|s| s.to_str())
    {
        return bundle_locale(stem).is_some();
    }

    false
}
