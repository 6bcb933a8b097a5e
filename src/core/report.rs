//! Aggregate translation coverage statistics.
//!
//! Counts are computed against a reference locale (configurable, default
//! `en`, falling back to the first available locale): per-locale coverage
//! is the share of reference keys that locale also defines, missing lists
//! are reference keys a locale lacks, and orphaned keys exist in some
//! locale but not in the reference.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use unicode_width::UnicodeWidthStr;

use crate::core::index::TranslationIndex;

#[derive(Debug, Clone)]
pub struct LocaleCoverage {
    pub locale: String,
    pub key_count: usize,
    /// Percentage of reference keys this locale defines.
    pub coverage_pct: f64,
    /// Reference keys absent from this locale.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub total_keys: usize,
    pub reference_locale: String,
    pub locales: Vec<LocaleCoverage>,
    /// Keys defined in some locale but not in the reference locale.
    pub orphaned: Vec<String>,
}

impl CoverageReport {
    /// Compute coverage for the current index state.
    pub fn build(index: &TranslationIndex, reference_locale: &str) -> Self {
        index.initialize();

        let mut per_locale: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for file in index.files_snapshot() {
            let keys = per_locale.entry(file.locale.clone()).or_default();
            keys.extend(file.entries.keys().cloned());
        }

        let reference = if per_locale.contains_key(reference_locale) {
            reference_locale.to_string()
        } else {
            per_locale
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| reference_locale.to_string())
        };
        let reference_keys = per_locale.get(&reference).cloned().unwrap_or_default();

        let locales = per_locale
            .iter()
            .map(|(locale, keys)| {
                let covered = reference_keys.intersection(keys).count();
                let coverage_pct = if reference_keys.is_empty() {
                    100.0
                } else {
                    covered as f64 * 100.0 / reference_keys.len() as f64
                };
                LocaleCoverage {
                    locale: locale.clone(),
                    key_count: keys.len(),
                    coverage_pct,
                    missing: reference_keys.difference(keys).cloned().collect(),
                }
            })
            .collect();

        let orphaned = per_locale
            .iter()
            .filter(|(locale, _)| **locale != reference)
            .flat_map(|(_, keys)| keys.difference(&reference_keys).cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        CoverageReport {
            total_keys: index.get_all_keys().len(),
            reference_locale: reference,
            locales,
            orphaned,
        }
    }

    /// Plain-text rendering, aligned for mixed-width locale names.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} keys, reference locale: {}", self.total_keys, self.reference_locale);

        let width = self
            .locales
            .iter()
            .map(|l| l.locale.width())
            .max()
            .unwrap_or(0);
        for locale in &self.locales {
            let pad = " ".repeat(width.saturating_sub(locale.locale.width()));
            let _ = writeln!(
                out,
                "  {}{}  {:>5} keys  {:>6.1}%  missing {}",
                locale.locale,
                pad,
                locale.key_count,
                locale.coverage_pct,
                locale.missing.len()
            );
        }
        if !self.orphaned.is_empty() {
            let _ = writeln!(out, "orphaned ({}):", self.orphaned.len());
            for key in &self.orphaned {
                let _ = writeln!(out, "  {}", key);
            }
        }
        out
    }
}
