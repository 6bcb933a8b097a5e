//! End-to-end scenarios over a mixed-format project tree.

use std::fs;
use std::path::Path;

use lokey::core::namespace::{self, DEFAULT_FUNCTIONS};
use lokey::core::{CancelToken, CoverageReport, TranslationIndex};
use tempfile::TempDir;

/// A project mixing frontend locale dirs with backend resource bundles.
fn mixed_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let locales = root.join("web/src/locales");
    fs::create_dir_all(locales.join("en")).unwrap();
    fs::create_dir_all(locales.join("zh_CN")).unwrap();
    fs::write(
        locales.join("en/user.json"),
        r#"{"user": {"name": "Name", "age": "Age"}}"#,
    )
    .unwrap();
    fs::write(
        locales.join("zh_CN/user.json"),
        r#"{"user": {"name": "姓名"}}"#,
    )
    .unwrap();
    fs::write(locales.join("en/order.yaml"), "list:\n  title: Orders\n").unwrap();

    let resources = root.join("server/src/main/resources/i18n");
    fs::create_dir_all(&resources).unwrap();
    fs::write(resources.join("messages.properties"), "a.b=Base\n").unwrap();
    fs::write(
        resources.join("messages_zh_CN.properties"),
        "a.b=\\u4E2D\\u6587\n",
    )
    .unwrap();

    // Build output with the same naming must be excluded entirely.
    let target = root.join("server/target/classes/i18n");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("messages.properties"), "ghost=Boo\n").unwrap();

    dir
}

#[test]
fn indexes_all_conventions() {
    let dir = mixed_project();
    let index = TranslationIndex::new(dir.path());
    index.initialize();

    let keys = index.get_all_keys();
    // Nested JSON flattening under the module prefix `user.`.
    assert!(keys.contains("user.user.name"));
    assert!(keys.contains("user.user.age"));
    // YAML module file.
    assert!(keys.contains("order.list.title"));
    // Spring bundles index to the bare key, no filename leakage.
    assert!(keys.contains("a.b"));
    assert!(!keys.iter().any(|k| k.contains("messages")));
    // target/ output is invisible.
    assert!(!keys.contains("ghost"));
}

#[test]
fn spring_bundles_map_to_locales() {
    let dir = mixed_project();
    let index = TranslationIndex::new(dir.path());

    let all = index.get_all_translations("a.b");
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("default").map(|e| e.value.as_str()), Some("Base"));
    // Backslash-u escapes decode.
    assert_eq!(all.get("zh_CN").map(|e| e.value.as_str()), Some("中文"));
}

#[test]
fn prefix_invariant_across_locale_siblings() {
    let dir = mixed_project();
    let index = TranslationIndex::new(dir.path());

    // Both locales index the same fully-qualified key.
    assert!(index.get_translation_strict("user.user.name", "en").is_some());
    assert!(index.get_translation_strict("user.user.name", "zh_CN").is_some());
}

#[test]
fn fallback_chain_prefers_zh_cn_then_en() {
    let dir = mixed_project();
    let index = TranslationIndex::new(dir.path());

    // Present in zh_CN and en: zh_CN wins.
    assert_eq!(
        index.get_translation("user.user.name", None).unwrap().locale,
        "zh_CN"
    );
    // Present only in en: en wins.
    assert_eq!(
        index.get_translation("user.user.age", None).unwrap().locale,
        "en"
    );
}

#[test]
fn refresh_twice_yields_identical_state() {
    let dir = mixed_project();
    let index = TranslationIndex::new(dir.path());
    index.initialize();

    let keys = index.get_all_keys();
    let locales = index.get_available_locales();
    let translations = index.get_all_translations("a.b");

    index.refresh(&CancelToken::new());
    index.refresh(&CancelToken::new());

    assert_eq!(index.get_all_keys(), keys);
    assert_eq!(index.get_available_locales(), locales);
    assert_eq!(index.get_all_translations("a.b"), translations);
}

#[test]
fn single_file_invalidation_keeps_other_files_intact() {
    let dir = mixed_project();
    let path = dir.path().join("web/src/locales/en/user.json");
    let index = TranslationIndex::new(dir.path());
    index.initialize();

    fs::write(&path, r#"{"user": {"name": "Name", "email": "Email"}}"#).unwrap();
    index.invalidate_file(&path);

    let keys = index.get_all_keys();
    assert!(keys.contains("user.user.email"));
    assert!(!keys.contains("user.user.age"));
    // zh_CN contribution untouched.
    assert_eq!(
        index
            .get_translation_strict("user.user.name", "zh_CN")
            .unwrap()
            .value,
        "姓名"
    );
    // Unrelated backend bundle untouched.
    assert!(index.get_translation_strict("a.b", "default").is_some());
}

#[test]
fn namespace_scenario_resolves_full_key() {
    let code = r#"
        function Profile() {
            const t = useTranslation('user');
            return t('profile.name');
        }
    "#;
    let functions: Vec<String> = DEFAULT_FUNCTIONS.iter().map(|s| s.to_string()).collect();
    let usages = namespace::collect_usages(code, Path::new("Profile.tsx"), &functions).unwrap();
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].full_key, "user.profile.name");
}

#[test]
fn coverage_report_counts_gaps() {
    let dir = mixed_project();
    let index = TranslationIndex::new(dir.path());
    let report = CoverageReport::build(&index, "en");

    assert_eq!(report.reference_locale, "en");
    let zh = report.locales.iter().find(|l| l.locale == "zh_CN").unwrap();
    assert!(zh.missing.contains(&"user.user.age".to_string()));
    assert!(zh.missing.contains(&"order.list.title".to_string()));
}
