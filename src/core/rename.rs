//! Renaming a translation key across declarations and call sites.
//!
//! Two coordinated phases: rewrite every declaration of the old key in
//! every locale file (in that file's native format), and rewrite every
//! call-site literal whose resolved full key or raw partial key matches.
//! The plan is collected up front as a dry run; applying it is
//! best-effort per file, so partial-failure reporting can distinguish
//! "nothing was touched" from "some targets updated". There is no
//! rollback. The index is refreshed after an apply.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::cancel::CancelToken;
use crate::core::entry::FileFormat;
use crate::core::index::TranslationIndex;
use crate::core::parsers::properties::escape_key;
use crate::core::scanner;

/// One textual replacement inside a file. `expected` is what the plan saw
/// at that position; apply refuses the edit when the file moved under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub offset: usize,
    pub len: usize,
    pub expected: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Declaration,
    Usage,
}

#[derive(Debug, Clone)]
pub struct FileEdits {
    pub path: PathBuf,
    pub kind: EditKind,
    pub edits: Vec<TextEdit>,
}

/// Dry-run result: everything the rename would touch, plus the targets it
/// already knows it cannot rewrite.
#[derive(Debug, Default)]
pub struct RenamePlan {
    pub old_key: String,
    pub new_key: String,
    pub files: Vec<FileEdits>,
    /// Targets skipped at plan time, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl RenamePlan {
    pub fn edit_count(&self) -> usize {
        self.files.iter().map(|f| f.edits.len()).sum()
    }
}

/// What an apply actually did.
#[derive(Debug, Default)]
pub struct RenameReport {
    pub updated: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Collect all edits for renaming `old_key` to `new_key`.
pub fn plan(
    index: &TranslationIndex,
    old_key: &str,
    new_key: &str,
    cancel: &CancelToken,
) -> Result<RenamePlan> {
    index.initialize();
    let mut plan = RenamePlan {
        old_key: old_key.to_string(),
        new_key: new_key.to_string(),
        ..Default::default()
    };

    plan_declarations(index, old_key, new_key, &mut plan)?;
    plan_usages(index, old_key, new_key, cancel, &mut plan)?;
    Ok(plan)
}

/// Apply a previously collected plan. Each file succeeds or fails on its
/// own; the index is refreshed afterwards either way.
pub fn apply(index: &TranslationIndex, plan: &RenamePlan) -> RenameReport {
    let mut report = RenameReport::default();
    for file in &plan.files {
        match apply_file(file) {
            Ok(()) => report.updated.push(file.path.clone()),
            Err(error) => report.failed.push((file.path.clone(), format!("{:#}", error))),
        }
    }
    index.refresh(&CancelToken::new());
    report
}

fn plan_declarations(
    index: &TranslationIndex,
    old_key: &str,
    new_key: &str,
    plan: &mut RenamePlan,
) -> Result<()> {
    for file in index.files_snapshot() {
        let Some(entry) = file.entries.get(old_key) else {
            continue;
        };
        let Some(local_new) = file.relative_key(new_key) else {
            plan.skipped.push((
                file.path.clone(),
                format!(
                    "new key does not belong to this file's namespace prefix '{}'",
                    file.key_prefix
                ),
            ));
            continue;
        };
        let local_old = file.relative_key(old_key).unwrap_or(old_key);

        let content = match fs::read_to_string(&file.path) {
            Ok(content) => content,
            Err(error) => {
                plan.skipped
                    .push((file.path.clone(), format!("unreadable: {}", error)));
                continue;
            }
        };

        let edit = if file.format == FileFormat::Properties {
            // Flat format: the whole local key is written on the line.
            Some(TextEdit {
                offset: entry.offset,
                len: entry.len,
                expected: content
                    .get(entry.offset..entry.offset + entry.len)
                    .unwrap_or_default()
                    .to_string(),
                replacement: escape_key(local_new),
            })
        } else {
            // Formats that encode hierarchy rename the final path segment
            // in place; a changed parent path would mean restructuring
            // the tree.
            let (old_parent, old_leaf) = split_leaf(local_old);
            let (new_parent, new_leaf) = split_leaf(local_new);
            if old_parent != new_parent {
                plan.skipped.push((
                    file.path.clone(),
                    "rename moves the key to a different parent; not supported for nested formats"
                        .to_string(),
                ));
                continue;
            }
            declaration_edit(&content, entry.offset, entry.len, old_leaf, new_leaf)
        };

        match edit {
            Some(edit) => plan.files.push(FileEdits {
                path: file.path.clone(),
                kind: EditKind::Declaration,
                edits: vec![edit],
            }),
            None => plan.skipped.push((
                file.path.clone(),
                format!("could not locate key token for '{}'", local_old),
            )),
        }
    }
    Ok(())
}

/// Build the edit for one declaration key token, tolerating the
/// estimated offsets of YAML/TOML by re-anchoring within the line.
fn declaration_edit(
    content: &str,
    offset: usize,
    len: usize,
    old_leaf: &str,
    new_leaf: &str,
) -> Option<TextEdit> {
    let token = content.get(offset..offset + len)?;
    // Exact token (quoted or bare) at the recorded position.
    if token == old_leaf
        || token == format!("\"{}\"", old_leaf)
        || token == format!("'{}'", old_leaf)
    {
        let replacement = match token.chars().next() {
            Some(q @ ('"' | '\'')) => format!("{}{}{}", q, new_leaf, q),
            _ => new_leaf.to_string(),
        };
        return Some(TextEdit {
            offset,
            len,
            expected: token.to_string(),
            replacement,
        });
    }

    // Estimated offset: search the surrounding line for the leaf token.
    let line_start = content[..offset.min(content.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let line_end = content[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(content.len());
    let line = &content[line_start..line_end];
    let found = line.find(old_leaf)?;
    Some(TextEdit {
        offset: line_start + found,
        len: old_leaf.len(),
        expected: old_leaf.to_string(),
        replacement: new_leaf.to_string(),
    })
}

fn plan_usages(
    index: &TranslationIndex,
    old_key: &str,
    new_key: &str,
    cancel: &CancelToken,
    plan: &mut RenamePlan,
) -> Result<()> {
    let sources = scanner::scan_source_files(index.root(), &[]);
    for path in sources {
        if cancel.is_cancelled() {
            break;
        }
        let Ok(usages) = index.usages_in_file(&path) else {
            continue;
        };
        if usages.is_empty() {
            continue;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) => {
                plan.skipped.push((path.clone(), format!("unreadable: {}", error)));
                continue;
            }
        };
        let mut edits = Vec::new();
        for usage in usages.iter() {
            if usage.full_key != old_key && usage.partial_key != old_key {
                continue;
            }
            // Recompute the partial key relative to this call site's
            // namespace so behavior is preserved.
            let new_partial = if usage.namespace.is_empty() {
                new_key.to_string()
            } else if let Some(stripped) =
                new_key.strip_prefix(&format!("{}.", usage.namespace))
            {
                stripped.to_string()
            } else {
                plan.skipped.push((
                    path.clone(),
                    format!(
                        "call site at line {} resolves namespace '{}'; new key '{}' is outside it",
                        usage.line, usage.namespace, new_key
                    ),
                ));
                continue;
            };

            let expected = content
                .get(usage.lit_offset..usage.lit_offset + usage.lit_len)
                .unwrap_or_default()
                .to_string();
            let quote = expected.chars().next().filter(|c| *c == '"' || *c == '\'');
            let quote = quote.unwrap_or('\'');
            edits.push(TextEdit {
                offset: usage.lit_offset,
                len: usage.lit_len,
                expected,
                replacement: format!("{}{}{}", quote, new_partial, quote),
            });
        }
        if !edits.is_empty() {
            plan.files.push(FileEdits {
                path,
                kind: EditKind::Usage,
                edits,
            });
        }
    }
    Ok(())
}

fn apply_file(file: &FileEdits) -> Result<()> {
    let mut content = fs::read_to_string(&file.path)
        .with_context(|| format!("Failed to read file: {}", file.path.display()))?;

    let mut edits = file.edits.clone();
    edits.sort_by(|a, b| b.offset.cmp(&a.offset));
    for edit in &edits {
        let actual = content.get(edit.offset..edit.offset + edit.len);
        if actual != Some(edit.expected.as_str()) {
            anyhow::bail!(
                "file changed since plan: expected '{}' at offset {}",
                edit.expected,
                edit.offset
            );
        }
        content.replace_range(edit.offset..edit.offset + edit.len, &edit.replacement);
    }

    fs::write(&file.path, content)
        .with_context(|| format!("Failed to write file: {}", file.path.display()))?;
    Ok(())
}

fn split_leaf(key: &str) -> (&str, &str) {
    match key.rsplit_once('.') {
        Some((parent, leaf)) => (parent, leaf),
        None => ("", key),
    }
}
