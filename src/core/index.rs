//! The translation index: authoritative, concurrency-safe state mapping
//! the project's translation files to a key → locale → entry view.
//!
//! Mutations are serialized behind a single write lock; readers get
//! consistent snapshots. A full refresh parses off-lock (in parallel) and
//! swaps the finished state in, so no reader ever observes a
//! partially-rebuilt map. Single-file invalidation replaces only that
//! file's key set and stays O(entries in the file).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::SystemTime;

use anyhow::Result;
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;

use crate::core::cancel::CancelToken;
use crate::core::entry::{FileFormat, ScanWarning, TranslationEntry, TranslationFile};
use crate::core::framework::{self, Framework};
use crate::core::namespace::{self, DEFAULT_FUNCTIONS, KeyUsage};
use crate::core::parsers;
use crate::core::path_rules::parse_file_path;
use crate::core::scanner;

/// Locale preference applied when a lookup names no locale.
pub const FALLBACK_LOCALES: &[&str] = &["zh_CN", "zh", "en"];

/// Bound on the per-file usage cache. On overflow the least recently used
/// file's extraction is dropped and recomputed on demand.
const USAGE_CACHE_CAPACITY: usize = 256;

/// Build manifests that mark the root of a build module inside a
/// multi-module repository.
const MODULE_MARKERS: &[&str] = &[
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "package.json",
    "Cargo.toml",
];

#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Extra directory names pruned during scans.
    pub extra_excludes: Vec<String>,
    /// Translation function names for call-site extraction; empty means
    /// the defaults (`t`, `$t`).
    pub functions: Vec<String>,
    /// Configured framework override; skips detection when set.
    pub framework_override: Option<Framework>,
}

#[derive(Default)]
struct IndexState {
    files: HashMap<PathBuf, TranslationFile>,
    /// Inverted map: key → locale → entry. Always a pure function of
    /// `files`.
    keys: HashMap<String, BTreeMap<String, TranslationEntry>>,
    framework: Framework,
    warnings: Vec<ScanWarning>,
    version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileFingerprint {
    len: u64,
    mtime: Option<SystemTime>,
}

struct CachedUsages {
    fingerprint: FileFingerprint,
    usages: Arc<Vec<KeyUsage>>,
}

pub struct TranslationIndex {
    root: PathBuf,
    options: IndexOptions,
    functions: Vec<String>,
    init: Once,
    state: RwLock<IndexState>,
    usage_cache: Mutex<LruCache<PathBuf, CachedUsages>>,
}

impl TranslationIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, IndexOptions::default())
    }

    pub fn with_options(root: impl Into<PathBuf>, options: IndexOptions) -> Self {
        let functions = if options.functions.is_empty() {
            DEFAULT_FUNCTIONS.iter().map(|s| s.to_string()).collect()
        } else {
            options.functions.clone()
        };
        let capacity = NonZeroUsize::new(USAGE_CACHE_CAPACITY).expect("non-zero capacity");
        Self {
            root: root.into(),
            options,
            functions,
            init: Once::new(),
            state: RwLock::new(IndexState::default()),
            usage_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Translation function names used for call-site extraction.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// Scan and parse the project exactly once. Safe to call from any
    /// number of call sites; later calls are no-ops until [`refresh`]
    /// is used explicitly.
    ///
    /// [`refresh`]: TranslationIndex::refresh
    pub fn initialize(&self) {
        self.init.call_once(|| {
            self.rebuild(&CancelToken::new());
        });
    }

    /// Force a full rescan: the file list and inverted map are rebuilt
    /// from scratch and swapped in. A cancelled refresh leaves the
    /// previous state untouched.
    pub fn refresh(&self, cancel: &CancelToken) {
        self.initialize();
        self.rebuild(cancel);
    }

    fn rebuild(&self, cancel: &CancelToken) {
        let paths = scanner::scan(&self.root, &self.options.extra_excludes);
        let parsed: Vec<(TranslationFile, Option<ScanWarning>)> = paths
            .par_iter()
            .filter_map(|path| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(parse_or_empty(path, &self.root))
            })
            .collect();
        if cancel.is_cancelled() {
            return;
        }

        let mut files = HashMap::with_capacity(parsed.len());
        let mut warnings = Vec::new();
        for (file, warning) in parsed {
            if let Some(warning) = warning {
                warnings.push(warning);
            }
            files.insert(file.path.clone(), file);
        }
        let keys = invert(&files);
        let framework = self
            .options
            .framework_override
            .unwrap_or_else(|| framework::detect(&self.root));

        let mut state = self.state.write();
        state.files = files;
        state.keys = keys;
        state.framework = framework;
        state.warnings = warnings;
        state.version += 1;
    }

    /// Re-parse exactly one file and replace its contribution. Paths that
    /// are not translation files are ignored; a vanished file is removed.
    pub fn invalidate_file(&self, path: &Path) {
        self.initialize();
        if !scanner::is_translation_file(path, &self.root) {
            return;
        }
        if !path.exists() {
            self.remove_file(path);
            return;
        }
        let (file, warning) = parse_or_empty(path, &self.root);

        let mut state = self.state.write();
        state.detach_file(path);
        for entry in file.entries.values() {
            state
                .keys
                .entry(entry.key.clone())
                .or_default()
                .insert(entry.locale.clone(), entry.clone());
        }
        state.files.insert(path.to_path_buf(), file);
        if let Some(warning) = warning {
            state.warnings.push(warning);
        }
        state.version += 1;
    }

    /// Drop a deleted file's entries from the index.
    pub fn remove_file(&self, path: &Path) {
        self.initialize();
        let mut state = self.state.write();
        state.detach_file(path);
        state.files.remove(path);
        state.version += 1;
    }

    /// Exact lookup with locale fallback. A named locale is tried first
    /// (through its tolerant spelling variants); misses continue down the
    /// fixed chain `zh_CN → zh → en → first available`.
    pub fn get_translation(&self, key: &str, locale: Option<&str>) -> Option<TranslationEntry> {
        self.initialize();
        let state = self.state.read();
        let locales = state.keys.get(key)?;
        if let Some(locale) = locale
            && let Some(entry) = lookup_locale(locales, locale)
        {
            return Some(entry.clone());
        }
        for fallback in FALLBACK_LOCALES {
            if let Some(entry) = lookup_locale(locales, fallback) {
                return Some(entry.clone());
            }
        }
        locales.values().next().cloned()
    }

    /// Exact lookup without fallback: distinguishes "missing for this
    /// locale" from "missing entirely".
    pub fn get_translation_strict(&self, key: &str, locale: &str) -> Option<TranslationEntry> {
        self.initialize();
        let state = self.state.read();
        lookup_locale(state.keys.get(key)?, locale).cloned()
    }

    /// Every locale's entry for one key.
    pub fn get_all_translations(&self, key: &str) -> BTreeMap<String, TranslationEntry> {
        self.initialize();
        let state = self.state.read();
        state.keys.get(key).cloned().unwrap_or_default()
    }

    pub fn get_all_keys(&self) -> BTreeSet<String> {
        self.initialize();
        let state = self.state.read();
        state.keys.keys().cloned().collect()
    }

    pub fn get_available_locales(&self) -> BTreeSet<String> {
        self.initialize();
        let state = self.state.read();
        state
            .files
            .values()
            .map(|file| file.locale.clone())
            .collect()
    }

    pub fn find_keys_by_prefix(&self, prefix: &str) -> BTreeSet<String> {
        self.initialize();
        let state = self.state.read();
        state
            .keys
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Lookup restricted to translation files in the same build module as
    /// `source_file`. Backend multi-module repositories may define the
    /// same key differently per module.
    pub fn get_translation_scoped(
        &self,
        key: &str,
        locale: Option<&str>,
        source_file: &Path,
    ) -> Option<TranslationEntry> {
        self.initialize();
        let module_root = self.module_root_of(source_file);
        let state = self.state.read();
        // Collected from the per-file maps, not the inverted map: two
        // modules may define the same key for the same locale, and the
        // inverted map keeps only one of them.
        let mut scoped: BTreeMap<String, TranslationEntry> = BTreeMap::new();
        for file in state.files.values() {
            if !file.path.starts_with(&module_root) {
                continue;
            }
            if let Some(entry) = file.entries.get(key) {
                scoped.insert(entry.locale.clone(), entry.clone());
            }
        }
        drop(state);
        if scoped.is_empty() {
            return None;
        }
        if let Some(locale) = locale
            && let Some(entry) = lookup_locale(&scoped, locale)
        {
            return Some(entry.clone());
        }
        for fallback in FALLBACK_LOCALES {
            if let Some(entry) = lookup_locale(&scoped, fallback) {
                return Some(entry.clone());
            }
        }
        scoped.into_values().next()
    }

    /// Keys contributed by translation files in `source_file`'s module.
    pub fn get_all_keys_scoped(&self, source_file: &Path) -> BTreeSet<String> {
        self.initialize();
        let module_root = self.module_root_of(source_file);
        let state = self.state.read();
        state
            .files
            .values()
            .filter(|file| file.path.starts_with(&module_root))
            .flat_map(|file| file.entries.keys().cloned())
            .collect()
    }

    /// Nearest ancestor of `path` (inside the project) carrying a build
    /// manifest; the project root when none is found.
    fn module_root_of(&self, path: &Path) -> PathBuf {
        let mut current = path.parent();
        while let Some(dir) = current {
            if !dir.starts_with(&self.root) {
                break;
            }
            if MODULE_MARKERS.iter().any(|m| dir.join(m).exists()) {
                return dir.to_path_buf();
            }
            current = dir.parent();
        }
        self.root.clone()
    }

    pub fn framework(&self) -> Framework {
        self.initialize();
        self.state.read().framework
    }

    pub fn warnings(&self) -> Vec<ScanWarning> {
        self.initialize();
        self.state.read().warnings.clone()
    }

    /// Monotonic counter bumped on every committed mutation.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// Snapshot of all tracked files, ordered by path.
    pub fn files_snapshot(&self) -> Vec<TranslationFile> {
        self.initialize();
        let state = self.state.read();
        let mut files: Vec<TranslationFile> = state.files.values().cloned().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Translation-call usages in one source file, served from a bounded
    /// per-file cache keyed by content fingerprint. Unparseable sources
    /// contribute an empty usage list.
    pub fn usages_in_file(&self, path: &Path) -> Result<Arc<Vec<KeyUsage>>> {
        let fingerprint = fingerprint(path)?;
        {
            let mut cache = self.usage_cache.lock();
            if let Some(cached) = cache.get(path)
                && cached.fingerprint == fingerprint
            {
                return Ok(cached.usages.clone());
            }
        }

        let content = fs::read_to_string(path)?;
        let usages = namespace::collect_usages(&content, path, &self.functions).unwrap_or_default();
        let usages = Arc::new(usages);
        self.usage_cache.lock().put(
            path.to_path_buf(),
            CachedUsages {
                fingerprint,
                usages: usages.clone(),
            },
        );
        Ok(usages)
    }

    /// Current usage-cache size; bounded by its fixed capacity.
    pub fn usage_cache_len(&self) -> usize {
        self.usage_cache.lock().len()
    }
}

impl IndexState {
    /// Remove one file's entries from the inverted map. O(entries in that
    /// file); other files' entries are untouched.
    fn detach_file(&mut self, path: &Path) {
        let Some(old) = self.files.get(path) else {
            return;
        };
        let keys: Vec<String> = old.entries.keys().cloned().collect();
        for key in keys {
            if let Some(locales) = self.keys.get_mut(&key) {
                locales.retain(|_, entry| entry.file != path);
                if locales.is_empty() {
                    self.keys.remove(&key);
                }
            }
        }
        self.warnings.retain(|w| w.file != path);
    }
}

fn invert(
    files: &HashMap<PathBuf, TranslationFile>,
) -> HashMap<String, BTreeMap<String, TranslationEntry>> {
    let mut keys: HashMap<String, BTreeMap<String, TranslationEntry>> = HashMap::new();
    let mut ordered: Vec<&TranslationFile> = files.values().collect();
    ordered.sort_by(|a, b| a.path.cmp(&b.path));
    for file in ordered {
        for entry in file.entries.values() {
            keys.entry(entry.key.clone())
                .or_default()
                .insert(entry.locale.clone(), entry.clone());
        }
    }
    keys
}

fn parse_or_empty(path: &Path, root: &Path) -> (TranslationFile, Option<ScanWarning>) {
    match parsers::parse_file(path, root) {
        Ok(file) => (file, None),
        Err(error) => {
            let origin = parse_file_path(path, root);
            let format = FileFormat::from_path(path).unwrap_or(FileFormat::Json);
            (
                TranslationFile::new(path, format, origin),
                Some(ScanWarning {
                    file: path.to_path_buf(),
                    error: format!("{:#}", error),
                }),
            )
        }
    }
}

fn fingerprint(path: &Path) -> Result<FileFingerprint> {
    let meta = fs::metadata(path)?;
    Ok(FileFingerprint {
        len: meta.len(),
        mtime: meta.modified().ok(),
    })
}

fn lookup_locale<'m>(
    locales: &'m BTreeMap<String, TranslationEntry>,
    locale: &str,
) -> Option<&'m TranslationEntry> {
    crate::core::locale::candidates(locale)
        .iter()
        .find_map(|candidate| locales.get(candidate))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::{TempDir, tempdir};

    use super::*;

    fn project() -> TempDir {
        let dir = tempdir().unwrap();
        let locales = dir.path().join("src/locales");
        fs::create_dir_all(locales.join("en")).unwrap();
        fs::create_dir_all(locales.join("zh_CN")).unwrap();
        fs::write(
            locales.join("en/common.json"),
            r#"{"save": "Save", "cancel": "Cancel"}"#,
        )
        .unwrap();
        fs::write(locales.join("zh_CN/common.json"), r#"{"save": "保存"}"#).unwrap();
        dir
    }

    #[test]
    fn test_initialize_builds_index() {
        let dir = project();
        let index = TranslationIndex::new(dir.path());
        index.initialize();

        let keys = index.get_all_keys();
        assert!(keys.contains("common.save"));
        assert!(keys.contains("common.cancel"));
        assert_eq!(
            index.get_available_locales(),
            ["en", "zh_CN"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn test_fallback_chain() {
        let dir = project();
        let index = TranslationIndex::new(dir.path());

        // zh_CN first in the chain.
        let entry = index.get_translation("common.save", None).unwrap();
        assert_eq!(entry.locale, "zh_CN");
        assert_eq!(entry.value, "保存");

        // zh_CN missing → en.
        let entry = index.get_translation("common.cancel", None).unwrap();
        assert_eq!(entry.locale, "en");
    }

    #[test]
    fn test_first_available_when_chain_misses() {
        let dir = tempdir().unwrap();
        let locales = dir.path().join("locales");
        fs::create_dir_all(&locales).unwrap();
        fs::write(locales.join("fr.json"), r#"{"only": "Seul"}"#).unwrap();

        let index = TranslationIndex::new(dir.path());
        let entry = index.get_translation("only", None).unwrap();
        assert_eq!(entry.locale, "fr");
    }

    #[test]
    fn test_strict_lookup() {
        let dir = project();
        let index = TranslationIndex::new(dir.path());

        assert!(index.get_translation_strict("common.cancel", "en").is_some());
        assert!(index.get_translation_strict("common.cancel", "zh_CN").is_none());
        // Tolerant spelling still matches the same locale.
        assert!(index.get_translation_strict("common.save", "zh-CN").is_some());
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let dir = project();
        let index = TranslationIndex::new(dir.path());
        index.initialize();

        let keys_before = index.get_all_keys();
        let locales_before = index.get_available_locales();
        let all_before = index.get_all_translations("common.save");

        index.refresh(&CancelToken::new());
        index.refresh(&CancelToken::new());

        assert_eq!(index.get_all_keys(), keys_before);
        assert_eq!(index.get_available_locales(), locales_before);
        assert_eq!(index.get_all_translations("common.save"), all_before);
    }

    #[test]
    fn test_cancelled_refresh_keeps_previous_state() {
        let dir = project();
        let index = TranslationIndex::new(dir.path());
        index.initialize();
        let version = index.version();

        let cancel = CancelToken::new();
        cancel.cancel();
        index.refresh(&cancel);

        assert_eq!(index.version(), version);
        assert!(index.get_all_keys().contains("common.save"));
    }

    #[test]
    fn test_invalidate_file_scope() {
        let dir = project();
        let path = dir.path().join("src/locales/en/common.json");
        let index = TranslationIndex::new(dir.path());
        index.initialize();
        assert!(index.get_all_keys().contains("common.cancel"));

        // File now contributes {save, confirm} instead of {save, cancel}.
        fs::write(&path, r#"{"save": "Save", "confirm": "Confirm"}"#).unwrap();
        index.invalidate_file(&path);

        let keys = index.get_all_keys();
        assert!(keys.contains("common.confirm"));
        assert!(!keys.contains("common.cancel"));
        // The zh_CN file is untouched.
        assert_eq!(
            index
                .get_translation_strict("common.save", "zh_CN")
                .unwrap()
                .value,
            "保存"
        );
    }

    #[test]
    fn test_remove_file_purges_entries() {
        let dir = project();
        let path = dir.path().join("src/locales/zh_CN/common.json");
        let index = TranslationIndex::new(dir.path());
        index.initialize();

        fs::remove_file(&path).unwrap();
        index.invalidate_file(&path);

        assert!(index.get_translation_strict("common.save", "zh_CN").is_none());
        assert!(index.get_translation_strict("common.save", "en").is_some());
    }

    #[test]
    fn test_parse_failure_degrades_to_empty() {
        let dir = project();
        fs::write(
            dir.path().join("src/locales/en/broken.json"),
            "{ not json ",
        )
        .unwrap();
        let index = TranslationIndex::new(dir.path());
        index.initialize();

        assert!(index.get_all_keys().contains("common.save"));
        let warnings = index.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].file.ends_with("broken.json"));
    }

    #[test]
    fn test_missing_root_is_empty_index() {
        let index = TranslationIndex::new("/nonexistent/lokey-root");
        index.initialize();
        assert!(index.get_all_keys().is_empty());
        assert!(index.get_available_locales().is_empty());
    }

    #[test]
    fn test_module_scoped_lookup() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        for module in ["billing", "shipping"] {
            let res = root.join(module).join("src/main/resources/i18n");
            fs::create_dir_all(&res).unwrap();
            fs::write(root.join(module).join("pom.xml"), "<project/>").unwrap();
            fs::write(
                res.join("messages.properties"),
                format!("service.name={}\n", module),
            )
            .unwrap();
        }

        let index = TranslationIndex::new(root);
        let source = root.join("billing/src/main/java/App.java");
        let entry = index
            .get_translation_scoped("service.name", None, &source)
            .unwrap();
        assert_eq!(entry.value, "billing");

        let keys = index.get_all_keys_scoped(&source);
        assert!(keys.contains("service.name"));
    }

    #[test]
    fn test_usage_cache_is_bounded() {
        let dir = tempdir().unwrap();
        let index = TranslationIndex::new(dir.path());
        for i in 0..USAGE_CACHE_CAPACITY + 40 {
            let path = dir.path().join(format!("file{}.ts", i));
            fs::write(&path, "const x = t('a.b');\n").unwrap();
            index.usages_in_file(&path).unwrap();
        }
        assert!(index.usage_cache_len() <= USAGE_CACHE_CAPACITY);
    }

    #[test]
    fn test_usage_cache_invalidates_on_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.ts");
        fs::write(&path, "function f() { return t('one'); }\n").unwrap();
        let index = TranslationIndex::new(dir.path());

        let first = index.usages_in_file(&path).unwrap();
        assert_eq!(first[0].full_key, "one");

        // Different content length guarantees a new fingerprint even on
        // filesystems with coarse mtime granularity.
        fs::write(&path, "function f() { return t('one.renamed'); }\n").unwrap();
        let second = index.usages_in_file(&path).unwrap();
        assert_eq!(second[0].full_key, "one.renamed");
    }
}
