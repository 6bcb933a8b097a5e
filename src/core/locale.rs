//! Locale name classification and normalization.
//!
//! Locale identifiers show up in two places: as directory or file names
//! (`en/`, `zh-CN.json`) and as the locale field of indexed entries. The
//! predicates here are pure string logic; nothing in this module touches
//! the filesystem.

/// Well-known compound locales matched case-insensitively even when a
/// project spells them inconsistently (`zh-cn`, `ZH_CN`, ...).
const KNOWN_COMPOUND_LOCALES: &[&str] = &[
    "zh_CN", "zh_TW", "zh_HK", "en_US", "en_GB", "ja_JP", "ko_KR",
];

/// Check whether a path segment or file stem looks like a locale identifier.
///
/// Accepted shapes:
/// - two-letter language code: `en`, `ja`
/// - language + region with `_` or `-`: `zh_CN`, `en-us`
/// - the well-known compound list, matched case-insensitively
///
/// Anything else (including `unknown` and module names) returns false.
pub fn is_locale(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.len() {
        2 => bytes.iter().all(|b| b.is_ascii_alphabetic()),
        5 => {
            let sep_ok = bytes[2] == b'_' || bytes[2] == b'-';
            let parts_ok = bytes[..2].iter().all(|b| b.is_ascii_alphabetic())
                && bytes[3..].iter().all(|b| b.is_ascii_alphabetic());
            (sep_ok && parts_ok)
                || KNOWN_COMPOUND_LOCALES
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(name))
        }
        _ => false,
    }
}

/// Normalize a locale name: lowercase language, uppercase region, `_`-joined.
///
/// Names that are not locale-shaped are returned unchanged.
pub fn normalize(name: &str) -> String {
    if !is_locale(name) {
        return name.to_string();
    }
    if name.len() == 2 {
        return name.to_ascii_lowercase();
    }
    let lang = name[..2].to_ascii_lowercase();
    let region = name[3..].to_ascii_uppercase();
    format!("{}_{}", lang, region)
}

/// Build the lookup variants for a locale, most specific first.
///
/// `zh-cn` yields `["zh-cn", "zh_CN", "zh-CN", "zh"]`. Duplicates are
/// removed while preserving order, so a bare language code yields itself
/// exactly once.
pub fn candidates(locale: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(4);
    let mut push = |candidate: String| {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    };

    push(locale.to_string());
    let normalized = normalize(locale);
    push(normalized.clone());
    if let Some((lang, region)) = normalized.split_once('_') {
        push(format!("{}-{}", lang, region));
        push(lang.to_string());
    }
    out
}
