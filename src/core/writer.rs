//! Creating new translation keys in existing locale files.
//!
//! Target selection: the files whose `key_prefix` is the longest matching
//! prefix of the new key; when no prefix matches, sibling-key lookup walks
//! the key's dot path upward until some file already holds keys under that
//! ancestor. Every selected file gets the leaf inserted in its native
//! format. JSON edits go through a parsed tree with preserved key order
//! and 2-space pretty printing; properties files get an appended escaped
//! line; YAML and TOML are re-serialized from their parsed tree, which
//! does not preserve comments. Finding no target at all is an
//! informational outcome, not an error.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::core::entry::{FileFormat, TranslationFile};
use crate::core::index::TranslationIndex;
use crate::core::parsers::properties::{escape_key, escape_value};
use crate::core::parsers::source;

/// Result of inserting one key into one file.
#[derive(Debug, Clone)]
pub struct InsertionOutcome {
    pub file: PathBuf,
    pub locale: String,
    /// Byte offset for caret placement at the inserted entry, when the
    /// format allows computing one.
    pub offset: Option<usize>,
}

/// Insert `full_key` (with a placeholder or provided value) into every
/// matching translation file. Returns one outcome per touched file; an
/// empty list means no target file was found.
pub fn create_key(
    index: &TranslationIndex,
    full_key: &str,
    value: &str,
) -> Result<Vec<InsertionOutcome>> {
    index.initialize();
    let files = index.files_snapshot();
    let targets = select_targets(&files, full_key);

    let mut outcomes = Vec::new();
    for target in targets {
        if target.entries.contains_key(full_key) {
            continue;
        }
        let local_key = target.relative_key(full_key).unwrap_or(full_key);
        let offset = insert_into_file(target, local_key, value)
            .with_context(|| format!("Failed to update {}", target.path.display()))?;
        index.invalidate_file(&target.path);
        outcomes.push(InsertionOutcome {
            file: target.path.clone(),
            locale: target.locale.clone(),
            offset,
        });
    }
    Ok(outcomes)
}

/// Pick the files a new key belongs in.
fn select_targets<'f>(files: &'f [TranslationFile], full_key: &str) -> Vec<&'f TranslationFile> {
    // Longest non-empty key prefix that covers the key.
    let best_prefix = files
        .iter()
        .filter(|file| !file.key_prefix.is_empty() && full_key.starts_with(&file.key_prefix))
        .map(|file| file.key_prefix.len())
        .max();
    if let Some(best) = best_prefix {
        return files
            .iter()
            .filter(|file| file.key_prefix.len() == best && full_key.starts_with(&file.key_prefix))
            .collect();
    }

    // Sibling lookup: shorten the dot path until some file already has
    // keys under that ancestor.
    let mut ancestor = full_key;
    while let Some(split) = ancestor.rfind('.') {
        ancestor = &ancestor[..split];
        let prefix = format!("{}.", ancestor);
        let siblings: Vec<&TranslationFile> = files
            .iter()
            .filter(|file| file.entries.keys().any(|key| key.starts_with(&prefix)))
            .collect();
        if !siblings.is_empty() {
            return siblings;
        }
    }

    Vec::new()
}

fn insert_into_file(
    target: &TranslationFile,
    local_key: &str,
    value: &str,
) -> Result<Option<usize>> {
    let content = fs::read_to_string(&target.path)
        .with_context(|| format!("Failed to read file: {}", target.path.display()))?;
    let (updated, offset) = match target.format {
        FileFormat::Json => insert_json(&content, local_key, value)?,
        FileFormat::Properties => insert_properties(&content, local_key, value),
        FileFormat::Yaml => insert_yaml(&content, local_key, value)?,
        FileFormat::Toml => insert_toml(&content, local_key, value)?,
        FileFormat::Source => insert_source(&content, target, local_key, value)?,
    };
    fs::write(&target.path, updated)
        .with_context(|| format!("Failed to write file: {}", target.path.display()))?;
    Ok(offset)
}

fn insert_json(content: &str, local_key: &str, value: &str) -> Result<(String, Option<usize>)> {
    let mut root: Value = serde_json::from_str(content).context("Failed to parse JSON")?;
    insert_json_path(&mut root, local_key, value)?;
    let mut updated = serde_json::to_string_pretty(&root).context("Failed to serialize JSON")?;
    if !updated.ends_with('\n') {
        updated.push('\n');
    }
    let leaf = local_key.rsplit('.').next().unwrap_or(local_key);
    let offset = find_inserted_leaf(&updated, leaf);
    Ok((updated, offset))
}

fn insert_json_path(root: &mut Value, local_key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = local_key.split('.').collect();
    let mut current = root;
    for part in &parts[..parts.len() - 1] {
        let Value::Object(map) = current else {
            bail!("Key path collides with a non-object value at '{}'", part);
        };
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    let Value::Object(map) = current else {
        bail!("Key path collides with a non-object value");
    };
    let leaf = parts[parts.len() - 1];
    map.insert(leaf.to_string(), Value::String(value.to_string()));
    Ok(())
}

fn insert_properties(content: &str, local_key: &str, value: &str) -> (String, Option<usize>) {
    let mut updated = content.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    let key_offset = updated.len();
    updated.push_str(&format!("{}={}\n", escape_key(local_key), escape_value(value)));
    (updated, Some(key_offset))
}

fn insert_yaml(content: &str, local_key: &str, value: &str) -> Result<(String, Option<usize>)> {
    let mut root: serde_yaml::Value = serde_yaml::from_str(content).context("Failed to parse YAML")?;
    if root.is_null() {
        root = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
    }
    {
        let mut current = &mut root;
        let parts: Vec<&str> = local_key.split('.').collect();
        for part in &parts[..parts.len() - 1] {
            let serde_yaml::Value::Mapping(map) = current else {
                bail!("Key path collides with a non-mapping value at '{}'", part);
            };
            let key = serde_yaml::Value::String(part.to_string());
            current = map
                .entry(key)
                .or_insert_with(|| serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
        }
        let serde_yaml::Value::Mapping(map) = current else {
            bail!("Key path collides with a non-mapping value");
        };
        map.insert(
            serde_yaml::Value::String(parts[parts.len() - 1].to_string()),
            serde_yaml::Value::String(value.to_string()),
        );
    }
    let updated = serde_yaml::to_string(&root).context("Failed to serialize YAML")?;
    let leaf = local_key.rsplit('.').next().unwrap_or(local_key);
    let offset = find_inserted_leaf(&updated, leaf);
    Ok((updated, offset))
}

fn insert_toml(content: &str, local_key: &str, value: &str) -> Result<(String, Option<usize>)> {
    let mut root: toml::Value = content.parse().context("Failed to parse TOML")?;
    {
        let mut current = &mut root;
        let parts: Vec<&str> = local_key.split('.').collect();
        for part in &parts[..parts.len() - 1] {
            let toml::Value::Table(table) = current else {
                bail!("Key path collides with a non-table value at '{}'", part);
            };
            current = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }
        let toml::Value::Table(table) = current else {
            bail!("Key path collides with a non-table value");
        };
        table.insert(
            parts[parts.len() - 1].to_string(),
            toml::Value::String(value.to_string()),
        );
    }
    let updated = toml::to_string_pretty(&root).context("Failed to serialize TOML")?;
    let leaf = local_key.rsplit('.').next().unwrap_or(local_key);
    let offset = find_inserted_leaf(&updated, leaf);
    Ok((updated, offset))
}

/// Source modules get the new key appended to the exported object as a
/// single quoted dotted key; nesting an arbitrary path into hand-written
/// code risks clobbering formatting.
fn insert_source(
    content: &str,
    target: &TranslationFile,
    local_key: &str,
    value: &str,
) -> Result<(String, Option<usize>)> {
    let Some(end) = source::export_object_end(content, &target.path) else {
        bail!("No exported object literal to insert into");
    };
    let line = format!("  '{}': '{}',\n", local_key, value.replace('\'', "\\'"));
    let mut updated = String::with_capacity(content.len() + line.len());
    updated.push_str(&content[..end]);
    // Keep the closing brace on its own line.
    if !updated.ends_with('\n') {
        updated.push('\n');
    }
    let offset = updated.len();
    updated.push_str(&line);
    updated.push_str(&content[end..]);
    Ok((updated, Some(offset)))
}

/// Locate the inserted leaf key in regenerated content, for caret
/// placement. Best-effort: searches for the last occurrence of the key
/// token.
fn find_inserted_leaf(content: &str, leaf: &str) -> Option<usize> {
    content.rfind(&format!("\"{}\"", leaf)).or_else(|| {
        content.rfind(&format!("{}:", leaf)).or_else(|| {
            content.rfind(&format!("{} =", leaf))
        })
    })
}
