//! YAML locale file parser.
//!
//! Mappings flatten with `.`; sequences expand with numeric indices; only
//! string leaves become entries. Offsets are estimated by progressive text
//! search over the raw document and are documented as inexact: consumers
//! may rely on the right line, not the exact column.

use anyhow::{Context, Result};
use serde_yaml::Value;

use crate::core::entry::TranslationFile;
use crate::core::parsers::{find_key_token, join_key};

pub(super) fn parse_into(content: &str, file: &mut TranslationFile) -> Result<()> {
    let value: Value = serde_yaml::from_str(content).context("invalid YAML")?;
    let mut cursor = 0usize;
    flatten(&value, String::new(), content, &mut cursor, file);
    Ok(())
}

fn flatten(
    value: &Value,
    prefix: String,
    content: &str,
    cursor: &mut usize,
    out: &mut TranslationFile,
) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                // Non-string keys (numbers, anchors) are tolerated by
                // stringifying; exotic keys are skipped.
                let key = match key {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => continue,
                };
                let (offset, len) = find_key_token(content, *cursor, &key, &[':']);
                *cursor = offset + len;
                let path = join_key(&prefix, &key);
                match child {
                    Value::String(s) => out.insert(path, s.clone(), offset, len),
                    _ => flatten(child, path, content, cursor, out),
                }
            }
        }
        Value::Sequence(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = join_key(&prefix, &index.to_string());
                match child {
                    Value::String(s) => out.insert(path, s.clone(), *cursor, 0),
                    _ => flatten(child, path, content, cursor, out),
                }
            }
        }
        _ => {}
    }
}
