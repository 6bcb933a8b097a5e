//! Fuzzy ranking of translation keys for completion and quick search.
//!
//! Pure function over an index snapshot: deterministic additive scoring,
//! higher is better, ties broken alphabetically. Matching is
//! case-insensitive. Key-text signals and value-text signals (against the
//! display locale) are summed independently, so a query can hit either
//! the key path or the translated content.

use std::collections::BTreeSet;

const SCORE_EXACT: i64 = 100;
const SCORE_PREFIX: i64 = 50;
const SCORE_CONTAINS: i64 = 30;
const SCORE_WORDS: i64 = 20;
const SCORE_WORDS_IN_ORDER: i64 = 10;
const SCORE_FIRST_WORD_FIRST_SEGMENT: i64 = 5;
const SCORE_ACRONYM: i64 = 15;
const SCORE_NAMESPACE_MEMBER: i64 = 10;
const SCORE_VALUE_EXACT: i64 = 40;
const SCORE_VALUE_PREFIX: i64 = 20;
const SCORE_VALUE_CONTAINS: i64 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedKey {
    pub key: String,
    pub score: i64,
}

/// Score and order `keys` against `input`.
///
/// `namespace` grants a membership bonus and is stripped before the
/// exact-match test so a locally-written partial key still ranks its
/// qualified form first. `value_of` resolves a key to its translated text
/// in the currently selected display locale; return None to skip value
/// signals. Blank input returns every key with a uniform score in
/// alphabetical order.
pub fn rank(
    input: &str,
    keys: &BTreeSet<String>,
    namespace: &str,
    value_of: &dyn Fn(&str) -> Option<String>,
) -> Vec<RankedKey> {
    let input = input.trim();
    if input.is_empty() {
        return keys
            .iter()
            .map(|key| RankedKey {
                key: key.clone(),
                score: 0,
            })
            .collect();
    }

    let needle = input.to_lowercase();
    let words = split_words(&needle);

    let mut ranked: Vec<RankedKey> = keys
        .iter()
        .map(|key| {
            let mut score = score_key(key, &needle, &words, namespace);
            if let Some(value) = value_of(key) {
                score += score_value(&value.to_lowercase(), &needle);
            }
            // Shortness and namespace membership shape the order among
            // real matches; they never surface a key on their own.
            if score > 0 {
                score += (12 - (key.len() as i64 / 8)).max(0);
                if !namespace.is_empty()
                    && key
                        .to_lowercase()
                        .starts_with(&format!("{}.", namespace.to_lowercase()))
                {
                    score += SCORE_NAMESPACE_MEMBER;
                }
            }
            RankedKey {
                key: key.clone(),
                score,
            }
        })
        .filter(|ranked| ranked.score > 0)
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.key.cmp(&b.key)));
    ranked
}

fn score_key(key: &str, needle: &str, words: &[String], namespace: &str) -> i64 {
    let lower = key.to_lowercase();
    let bare = if namespace.is_empty() {
        lower.as_str()
    } else {
        lower
            .strip_prefix(&format!("{}.", namespace.to_lowercase()))
            .unwrap_or(lower.as_str())
    };

    let mut score = 0;
    if bare == needle || lower == needle {
        score += SCORE_EXACT;
    }
    if lower.starts_with(needle) || bare.starts_with(needle) {
        score += SCORE_PREFIX;
    }
    if let Some(pos) = lower.find(needle) {
        score += SCORE_CONTAINS - (pos.min(20) as i64);
    }

    let segments: Vec<&str> = lower.split('.').collect();
    score += score_words(&segments, words);
    if needle.len() >= 2 {
        let acronym: String = segments
            .iter()
            .filter_map(|segment| segment.chars().next())
            .collect();
        if acronym.contains(needle) {
            score += SCORE_ACRONYM;
        }
    }

    score
}

fn score_words(segments: &[&str], words: &[String]) -> i64 {
    if words.len() < 2 {
        return 0;
    }
    let all_present = words
        .iter()
        .all(|word| segments.iter().any(|segment| segment.contains(word.as_str())));
    if !all_present {
        return 0;
    }

    let mut score = SCORE_WORDS;
    // Greedy in-order check: each word must match at or after the
    // previous word's segment.
    let mut word_iter = words.iter();
    let mut current = word_iter.next();
    for segment in segments {
        let Some(word) = current else { break };
        if segment.contains(word.as_str()) {
            current = word_iter.next();
        }
    }
    if current.is_none() {
        score += SCORE_WORDS_IN_ORDER;
        if let (Some(first_segment), Some(first_word)) = (segments.first(), words.first())
            && first_segment.contains(first_word.as_str())
        {
            score += SCORE_FIRST_WORD_FIRST_SEGMENT;
        }
    }
    score
}

fn score_value(value: &str, needle: &str) -> i64 {
    let mut score = 0;
    if value == needle {
        score += SCORE_VALUE_EXACT;
    }
    if value.starts_with(needle) {
        score += SCORE_VALUE_PREFIX;
    }
    if let Some(pos) = value.find(needle) {
        score += SCORE_VALUE_CONTAINS - (pos.min(10) as i64);
    }
    score
}

/// Split a query into words on whitespace and punctuation.
fn split_words(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '$'))
        .filter(|word| !word.is_empty())
        .map(|word| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn keys(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_values(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_blank_input_returns_everything_alphabetically() {
        let ranked = rank("", &keys(&["b.two", "a.one", "c.three"]), "", &no_values);
        let names: Vec<&str> = ranked.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(names, vec!["a.one", "b.two", "c.three"]);
        assert!(ranked.iter().all(|r| r.score == 0));
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let ranked = rank(
            "common.save",
            &keys(&["common.save", "common.save_all", "common.saved"]),
            "",
            &no_values,
        );
        assert_eq!(ranked[0].key, "common.save");
    }

    #[test]
    fn test_namespace_stripping_for_exact_match() {
        let ranked = rank(
            "save",
            &keys(&["common.save", "other.autosave.backup"]),
            "common",
            &no_values,
        );
        assert_eq!(ranked[0].key, "common.save");
        assert!(ranked[0].score >= SCORE_EXACT);
    }

    #[test]
    fn test_substring_position_weighting() {
        let ranked = rank(
            "user",
            &keys(&["user.name", "admin.user.name"]),
            "",
            &no_values,
        );
        assert_eq!(ranked[0].key, "user.name");
    }

    #[test]
    fn test_word_match_across_segments() {
        let ranked = rank(
            "user name",
            &keys(&["user.profile.name", "order.total"]),
            "",
            &no_values,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, "user.profile.name");
    }

    #[test]
    fn test_word_order_bonus() {
        let in_order = rank("user name", &keys(&["user.name"]), "", &no_values);
        let reversed = rank("name user", &keys(&["user.name"]), "", &no_values);
        assert!(in_order[0].score > reversed[0].score);
    }

    #[test]
    fn test_acronym_match() {
        let ranked = rank("upn", &keys(&["user.profile.name"]), "", &no_values);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].score >= SCORE_ACRONYM);
    }

    #[test]
    fn test_value_text_match() {
        let values = |key: &str| -> Option<String> {
            (key == "common.save").then(|| "保存".to_string())
        };
        let ranked = rank("保存", &keys(&["common.save", "common.cancel"]), "", &values);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, "common.save");
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let ranked = rank("item", &keys(&["b.item", "a.item"]), "", &no_values);
        assert_eq!(ranked[0].key, "a.item");
        assert_eq!(ranked[1].key, "b.item");
    }

    #[test]
    fn test_non_matching_keys_are_dropped() {
        let ranked = rank("zzz", &keys(&["a.one", "b.two"]), "", &no_values);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let ranked = rank("SAVE", &keys(&["common.Save"]), "", &no_values);
        assert_eq!(ranked.len(), 1);
    }
}
