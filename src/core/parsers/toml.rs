//! TOML locale file parser.
//!
//! `[table]` and `[[array-of-tables]]` headers establish the ancestor
//! prefix for the flat keys that follow; nested tables flatten with `.`.
//! Offsets are estimated the same way as YAML: progressive text search,
//! accurate to the line.

use anyhow::{Context, Result};
use toml::Value;

use crate::core::entry::TranslationFile;
use crate::core::parsers::{find_key_token, join_key};

pub(super) fn parse_into(content: &str, file: &mut TranslationFile) -> Result<()> {
    let value: Value = content.parse::<Value>().context("invalid TOML")?;
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
        Value::Table(table) => {
            for (key, child) in table {
                // A key token ends with `=` when inline, or `]`/`.` when it
                // is part of a table header.
                let (offset, len) = find_key_token(content, *cursor, key, &['=', ']', '.']);
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
                    Value::String(s) => out.insert(path, s.clone(), *cursor, 0),
                    _ => flatten(child, path, content, cursor, out),
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::entry::FileFormat;
    use crate::core::parsers::parse_str;
    use crate::core::path_rules::parse_file_path;

    fn parse(content: &str, path: &str) -> TranslationFile {
        let origin = parse_file_path(Path::new(path), Path::new(""));
        parse_str(content, Path::new(path), FileFormat::Toml, origin).unwrap()
    }

    fn line_of(content: &str, offset: usize) -> usize {
        content[..offset].matches('\n').count() + 1
    }

    #[test]
    fn test_table_headers_establish_prefix() {
        let content = "title = \"App\"\n\n[user]\nname = \"Name\"\n\n[user.profile]\nbio = \"Bio\"\n";
        let file = parse(content, "src/locales/en.toml");
        assert_eq!(file.entries.get("title").map(|e| e.value.as_str()), Some("App"));
        assert_eq!(file.entries.get("user.name").map(|e| e.value.as_str()), Some("Name"));
        assert_eq!(
            file.entries.get("user.profile.bio").map(|e| e.value.as_str()),
            Some("Bio")
        );
    }

    #[test]
    fn test_array_of_tables() {
        let content = "[[step]]\nlabel = \"One\"\n\n[[step]]\nlabel = \"Two\"\n";
        let file = parse(content, "src/locales/en.toml");
        assert_eq!(file.entries.get("step.0.label").map(|e| e.value.as_str()), Some("One"));
        assert_eq!(file.entries.get("step.1.label").map(|e| e.value.as_str()), Some("Two"));
    }

    #[test]
    fn test_offsets_fall_on_the_right_line() {
        let content = "[menu]\nopen = \"Open\"\nclose = \"Close\"\n";
        let file = parse(content, "src/locales/en.toml");
        let close = file.entries.get("menu.close").unwrap();
        assert_eq!(line_of(content, close.offset), 3);
    }

    #[test]
    fn test_non_string_leaves_ignored() {
        let file = parse(
            "count = 3\npi = 3.5\nflag = true\nlabel = \"ok\"\n",
            "src/locales/en.toml",
        );
        assert_eq!(file.len(), 1);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let origin = parse_file_path(Path::new("en.toml"), Path::new(""));
        assert!(
            parse_str(
                "key = unquoted\n",
                Path::new("en.toml"),
                FileFormat::Toml,
                origin
            )
            .is_err()
        );
    }
}
