//! JSON locale file parser.
//!
//! Nested objects flatten with `.`; arrays expand with numeric indices
//! (`faq.items.0.question`); only string leaves become entries. Key-token
//! offsets are found by searching for the quoted key followed by a colon,
//! scanning forward from the previous key so duplicate leaf names resolve
//! to the right occurrence.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::entry::TranslationFile;
use crate::core::parsers::{find_key_token, join_key};

pub(super) fn parse_into(content: &str, file: &mut TranslationFile) -> Result<()> {
    let value: Value = serde_json::from_str(content).context("invalid JSON")?;
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
        Value::Object(map) => {
            for (key, child) in map {
                let quoted = format!("\"{}\"", key);
                let (offset, len) = find_key_token(content, *cursor, &quoted, &[':']);
                *cursor = offset + len;
                let path = join_key(&prefix, key);
                match child {
                    Value::String(s) => out.insert(path, s.clone(), offset, len),
                    _ => flatten(child, path, content, cursor, out),
                }
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = join_key(&prefix, &index.to_string());
                match child {
                    // Array elements have no key token of their own; they
                    // inherit the position of the enclosing key.
                    Value::String(s) => out.insert(path, s.clone(), *cursor, 0),
                    _ => flatten(child, path, content, cursor, out),
                }
            }
        }
        // Scalar leaves other than strings are ignored, not errors.
        _ => {}
    }
}
