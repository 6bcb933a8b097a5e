//! Rename and create-key flows across declaration formats and call sites.

use std::fs;

use lokey::core::rename;
use lokey::core::writer;
use lokey::core::{CancelToken, TranslationIndex};
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let locales = root.join("src/locales");
    fs::create_dir_all(locales.join("en")).unwrap();
    fs::create_dir_all(locales.join("zh")).unwrap();
    fs::write(
        locales.join("en/shop.json"),
        "{\n  \"cart\": {\n    \"title\": \"Cart\",\n    \"empty\": \"Empty\"\n  }\n}\n",
    )
    .unwrap();
    fs::write(
        locales.join("zh/shop.json"),
        "{\n  \"cart\": {\n    \"title\": \"购物车\"\n  }\n}\n",
    )
    .unwrap();

    fs::create_dir_all(root.join("src/pages")).unwrap();
    fs::write(
        root.join("src/pages/Cart.tsx"),
        "export function Cart() {\n  const t = useTranslations('shop');\n  return <h1>{t('cart.title')}</h1>;\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("src/pages/Legacy.ts"),
        "const heading = t('shop.cart.title');\n",
    )
    .unwrap();

    dir
}

#[test]
fn rename_rewrites_declarations_and_usages() {
    let dir = project();
    let index = TranslationIndex::new(dir.path());

    let plan = rename::plan(
        &index,
        "shop.cart.title",
        "shop.cart.heading",
        &CancelToken::new(),
    )
    .unwrap();
    assert!(plan.skipped.is_empty());
    // Two JSON declarations + two call sites.
    assert_eq!(plan.files.len(), 4);

    let report = rename::apply(&index, &plan);
    assert!(report.failed.is_empty());
    assert_eq!(report.updated.len(), 4);

    let en = fs::read_to_string(dir.path().join("src/locales/en/shop.json")).unwrap();
    assert!(en.contains("\"heading\": \"Cart\""));
    assert!(en.contains("\"empty\": \"Empty\""));

    // Namespaced call keeps its partial form; bare call gets the full key.
    let cart = fs::read_to_string(dir.path().join("src/pages/Cart.tsx")).unwrap();
    assert!(cart.contains("t('cart.heading')"));
    let legacy = fs::read_to_string(dir.path().join("src/pages/Legacy.ts")).unwrap();
    assert!(legacy.contains("t('shop.cart.heading')"));

    // Index observes the post-rename world.
    assert!(index.get_translation("shop.cart.heading", None).is_some());
    assert!(index.get_translation("shop.cart.title", None).is_none());
}

#[test]
fn dry_run_plan_touches_nothing() {
    let dir = project();
    let index = TranslationIndex::new(dir.path());

    let before = fs::read_to_string(dir.path().join("src/locales/en/shop.json")).unwrap();
    let plan = rename::plan(
        &index,
        "shop.cart.title",
        "shop.cart.heading",
        &CancelToken::new(),
    )
    .unwrap();
    assert!(plan.edit_count() >= 2);

    let after = fs::read_to_string(dir.path().join("src/locales/en/shop.json")).unwrap();
    assert_eq!(before, after);
    assert!(index.get_translation("shop.cart.title", None).is_some());
}

#[test]
fn create_key_lands_in_both_locale_siblings() {
    let dir = project();
    let index = TranslationIndex::new(dir.path());

    let outcomes = writer::create_key(&index, "shop.cart.checkout", "Checkout").unwrap();
    assert_eq!(outcomes.len(), 2);

    assert_eq!(
        index
            .get_translation_strict("shop.cart.checkout", "en")
            .unwrap()
            .value,
        "Checkout"
    );
    assert!(index.get_translation_strict("shop.cart.checkout", "zh").is_some());
    // Existing keys survive the edit.
    assert_eq!(
        index
            .get_translation_strict("shop.cart.title", "zh")
            .unwrap()
            .value,
        "购物车"
    );
}

#[test]
fn cancelled_usage_scan_still_plans_declarations() {
    let dir = project();
    let index = TranslationIndex::new(dir.path());

    let cancel = CancelToken::new();
    cancel.cancel();
    let plan = rename::plan(&index, "shop.cart.title", "shop.cart.heading", &cancel).unwrap();

    // Declarations are collected from the already-built index; the
    // cancelled source sweep contributes nothing.
    assert!(plan.files.iter().all(|f| f.edits.len() == 1));
    assert_eq!(plan.files.len(), 2);
}
