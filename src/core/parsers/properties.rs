//! Flat `key=value` (Java properties style) parser and escaper.
//!
//! One entry per non-comment, non-blank line. The separator is the first
//! unescaped `=`, `:`, or run of whitespace; a whitespace separator may be
//! followed by one `=` or `:` which is consumed as well. Key and value are
//! unescaped independently; [`escape_key`] and [`escape_value`] are the
//! exact inverses used by the writers, so write-then-parse round-trips.

use anyhow::Result;

use crate::core::entry::TranslationFile;

pub(super) fn parse_into(content: &str, file: &mut TranslationFile) -> Result<()> {
    let mut line_start = 0usize;
    for line in content.split_inclusive('\n') {
        let start = line_start;
        line_start += line.len();

        let trimmed = line.trim_end_matches(['\n', '\r']);
        let indent = trimmed.len() - trimmed.trim_start().len();
        let body = &trimmed[indent..];
        if body.is_empty() || body.starts_with('#') || body.starts_with('!') {
            continue;
        }

        let (raw_key, raw_value) = split_line(body);
        if raw_key.is_empty() {
            continue;
        }
        file.insert(
            unescape(raw_key),
            unescape(raw_value),
            start + indent,
            raw_key.len(),
        );
    }
    Ok(())
}

/// Split a logical line into raw (still escaped) key and value parts.
fn split_line(body: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut split_at = None;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' => {
                split_at = Some((i, c));
                break;
            }
            _ => {}
        }
    }

    let Some((key_end, sep)) = split_at else {
        return (body, "");
    };
    let key = &body[..key_end];
    let mut rest = &body[key_end + sep.len_utf8()..];
    rest = rest.trim_start_matches([' ', '\t']);
    // `key   = value` — the `=`/`:` after a whitespace separator is part
    // of the separator, not the value.
    if (sep == ' ' || sep == '\t')
        && let Some(stripped) = rest.strip_prefix(['=', ':'])
    {
        rest = stripped.trim_start_matches([' ', '\t']);
    }
    (key, rest)
}

/// Decode backslash escapes: `\t \r \n \f \\ \uXXXX`, plus escaped
/// separator and comment characters which decode to themselves.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() == 4
                    && let Ok(code) = u32::from_str_radix(&hex, 16)
                    && let Some(decoded) = char::from_u32(code)
                {
                    out.push(decoded);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Escape a key for writing. Separator and comment characters must be
/// escaped here or the key would terminate early on re-parse.
pub fn escape_key(s: &str) -> String {
    escape(s, true)
}

/// Escape a value for writing. Only leading whitespace needs protecting;
/// interior `=`/`:` are already past the separator on re-parse.
pub fn escape_value(s: &str) -> String {
    escape(s, false)
}

fn escape(s: &str, full: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut leading = true;
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{000C}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' if full => {
                out.push('\\');
                out.push(c);
            }
            ' ' if full || leading => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
        leading = false;
    }
    out
}
