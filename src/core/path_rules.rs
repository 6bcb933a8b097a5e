//! Deriving locale, module, and key prefix from a file's path.
//!
//! Layout conventions in the wild are messy (`src/locales/en/common.json`,
//! `views/shop/locales/zh_CN.js`, `src/main/resources/i18n/messages_en_US.properties`),
//! so the mapping is kept as an ordered decision table: each rule either
//! claims the path and produces a [`FileOrigin`], or passes. New layout
//! conventions become new rows instead of another branch in a conditional
//! cascade.

use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::Regex;

use crate::core::locale::{is_locale, normalize};

/// Directory names that mark "translations live under here".
pub const LOCALE_DIR_NAMES: &[&str] = &[
    "locales",
    "locale",
    "i18n",
    "lang",
    "langs",
    "messages",
    "translations",
];

/// Locale assigned when no rule can extract one. Files still get indexed.
pub const UNKNOWN_LOCALE: &str = "unknown";

/// Locale assigned to a suffix-less backend bundle (`messages.properties`).
pub const DEFAULT_BUNDLE_LOCALE: &str = "default";

/// Where a translation file sits in the project's naming conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOrigin {
    /// Detected locale identifier, or [`UNKNOWN_LOCALE`].
    pub locale: String,
    /// Module name (usually the file stem), if the file represents one.
    pub module: Option<String>,
    /// Monorepo business unit derived from a `views/<unit>/...` ancestor.
    pub business_unit: Option<String>,
    /// Dotted prefix prepended to every key parsed from this file.
    /// Either empty or ends with `.`.
    pub key_prefix: String,
}

/// Path split into the pieces the rules care about.
struct PathParts<'a> {
    /// Directory segments relative to the project root, file name excluded.
    dirs: Vec<&'a str>,
    /// File stem (`messages_en_US` for `messages_en_US.properties`).
    stem: &'a str,
    /// Lowercased extension, empty when absent.
    ext: String,
}

type Rule = fn(&PathParts) -> Option<FileOrigin>;

/// Ordered decision table. The first rule that claims the path wins.
const RULES: &[(&str, Rule)] = &[
    ("backend message bundle", rule_message_bundle),
    ("locale directory layout", rule_locale_directory),
    ("no convention fallback", rule_bare_path),
];

/// Derive locale, module, business unit, and key prefix for a file.
///
/// Never fails: paths that match no convention degrade to
/// `locale = "unknown"` with an empty prefix rather than being dropped.
pub fn parse_file_path(path: &Path, project_root: &Path) -> FileOrigin {
    let rel = path.strip_prefix(project_root).unwrap_or(path);
    let dirs: Vec<&str> = rel
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(seg) => seg.to_str(),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    let stem = rel.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = rel
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parts = PathParts { dirs, stem, ext };
    for (_, rule) in RULES {
        if let Some(origin) = rule(&parts) {
            return origin;
        }
    }
    // The fallback rule always claims the path; this is unreachable.
    FileOrigin {
        locale: UNKNOWN_LOCALE.to_string(),
        module: None,
        business_unit: None,
        key_prefix: String::new(),
    }
}

fn bundle_stem_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^messages(?:[_-]([A-Za-z]{2})(?:[_-]([A-Za-z]{2}))?)?$")
            .expect("bundle stem regex")
    })
}

/// Split a bundle file stem into its locale, if it follows the
/// `messages[_-]<lang>[[_-]<REGION>]` convention. `messages` alone maps to
/// the default bundle locale.
pub fn bundle_locale(stem: &str) -> Option<String> {
    let caps = bundle_stem_regex().captures(stem)?;
    match (caps.get(1), caps.get(2)) {
        (None, _) => Some(DEFAULT_BUNDLE_LOCALE.to_string()),
        (Some(lang), None) => Some(lang.as_str().to_ascii_lowercase()),
        (Some(lang), Some(region)) => Some(normalize(&format!(
            "{}_{}",
            lang.as_str(),
            region.as_str()
        ))),
    }
}

/// `messages_zh_CN.properties` style backend bundles. The stem carries the
/// locale; the base name is a generic container, never a namespace.
fn rule_message_bundle(parts: &PathParts) -> Option<FileOrigin> {
    if parts.ext != "properties" {
        return None;
    }
    let locale = bundle_locale(parts.stem)?;
    Some(FileOrigin {
        locale,
        module: None,
        business_unit: None,
        key_prefix: String::new(),
    })
}

/// Layouts anchored on a recognized locale directory (`locales/`, `i18n/`,
/// ...). Everything after the last such directory decides locale and
/// module; a `views/<unit>/` ancestor contributes the business unit.
fn rule_locale_directory(parts: &PathParts) -> Option<FileOrigin> {
    let anchor = parts
        .dirs
        .iter()
        .rposition(|seg| LOCALE_DIR_NAMES.iter().any(|n| n.eq_ignore_ascii_case(seg)))?;

    let business_unit = parts.dirs[..anchor]
        .iter()
        .position(|seg| seg.eq_ignore_ascii_case("views"))
        .map(|views| parts.dirs[views + 1..anchor].join("."))
        .filter(|unit| !unit.is_empty());

    let tail = &parts.dirs[anchor + 1..];
    let (locale, module) = if tail.is_empty() {
        if is_locale(parts.stem) {
            (parts.stem.to_string(), None)
        } else {
            (UNKNOWN_LOCALE.to_string(), Some(parts.stem.to_string()))
        }
    } else {
        match tail.iter().find(|seg| is_locale(seg)) {
            Some(seg) => (seg.to_string(), Some(parts.stem.to_string())),
            None if is_locale(parts.stem) => (parts.stem.to_string(), None),
            None => (UNKNOWN_LOCALE.to_string(), Some(parts.stem.to_string())),
        }
    };

    // A module equal to the locale adds nothing.
    let module = module.filter(|m| *m != locale);
    let key_prefix = build_key_prefix(business_unit.as_deref(), module.as_deref());

    Some(FileOrigin {
        locale,
        module,
        business_unit,
        key_prefix,
    })
}

/// No locale directory anywhere: derive the locale from the basename or,
/// failing that, the deepest locale-shaped directory segment. No prefix.
fn rule_bare_path(parts: &PathParts) -> Option<FileOrigin> {
    let locale = if is_locale(parts.stem) {
        parts.stem.to_string()
    } else {
        parts
            .dirs
            .iter()
            .rev()
            .find(|seg| is_locale(seg))
            .map(|seg| seg.to_string())
            .unwrap_or_else(|| UNKNOWN_LOCALE.to_string())
    };
    Some(FileOrigin {
        locale,
        module: None,
        business_unit: None,
        key_prefix: String::new(),
    })
}

fn build_key_prefix(business_unit: Option<&str>, module: Option<&str>) -> String {
    let mut prefix = String::new();
    if let Some(unit) = business_unit
        && !is_locale(unit)
        && !unit.eq_ignore_ascii_case("locales")
    {
        prefix.push_str(unit);
        prefix.push('.');
    }
    if let Some(module) = module
        && !module.eq_ignore_ascii_case("message")
        && !module.eq_ignore_ascii_case("messages")
    {
        prefix.push_str(module);
        prefix.push('.');
    }
    prefix
}
