//! Variable references inside dotenv values.
//!
//! dotenvy resolves `$NAME` and `${NAME}` against the live process
//! environment and offers no way to turn that off. Before parsing, every
//! reference that dotenvy would expand is rewritten to [`MARKER`], which it
//! passes through untouched. [`expand_references`] then resolves the markers
//! against the environment being built for the current run.

use crate::error::FileLoadCause;
use std::collections::HashMap;

/// Private-use character standing in for an unquoted or double-quoted `$`.
const MARKER: char = '\u{E000}';

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Rewrites expandable `$` characters to [`MARKER`].
///
/// Follows dotenvy's lexing: single-quoted text and backslash escapes are
/// left alone, and `#` at the start of a line or after whitespace opens a
/// comment running to the end of the line.
pub(crate) fn mask_references(text: &str) -> Result<String, FileLoadCause> {
    if text.contains(MARKER) {
        return Err(FileLoadCause::Other(
            "file contains the reserved character U+E000".into(),
        ));
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut quote = Quote::None;
    let mut line_start = true;
    let mut after_blank = false;

    while let Some(c) = chars.next() {
        match quote {
            Quote::None => {
                match c {
                    '#' if line_start || after_blank => {
                        out.push(c);
                        for rest in chars.by_ref() {
                            out.push(rest);
                            if rest == '\n' {
                                break;
                            }
                        }
                        line_start = true;
                        after_blank = false;
                        continue;
                    }
                    '\\' => {
                        out.push(c);
                        out.extend(chars.next());
                    }
                    '\'' => {
                        quote = Quote::Single;
                        out.push(c);
                    }
                    '"' => {
                        quote = Quote::Double;
                        out.push(c);
                    }
                    '$' => out.push(MARKER),
                    _ => out.push(c),
                }
                line_start = c == '\n' || (line_start && c.is_whitespace());
                after_blank = c == ' ' || c == '\t';
            }
            Quote::Single => {
                out.push(c);
                if c == '\'' {
                    quote = Quote::None;
                }
            }
            Quote::Double => match c {
                '\\' => {
                    out.push(c);
                    out.extend(chars.next());
                }
                '"' => {
                    quote = Quote::None;
                    out.push(c);
                }
                '$' => out.push(MARKER),
                _ => out.push(c),
            },
        }
        if quote != Quote::None {
            line_start = false;
            after_blank = false;
        }
    }
    Ok(out)
}

/// Replaces the markers in `raw` with values from `vars`.
///
/// `${NAME}` takes everything up to the closing brace; a bare `$NAME` takes
/// the longest run of alphanumerics and underscores. Unknown names expand
/// to the empty string.
pub(crate) fn expand_references(
    key: &str,
    raw: &str,
    vars: &HashMap<String, String>,
) -> Result<String, FileLoadCause> {
    if !raw.contains(MARKER) {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != MARKER {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(n) => name.push(n),
                    None => return Err(FileLoadCause::Substitution(key.to_string())),
                }
            }
        } else {
            while let Some(n) = chars.next_if(|n| n.is_alphanumeric() || *n == '_') {
                name.push(n);
            }
        }
        if let Some(value) = vars.get(&name) {
            out.push_str(value);
        }
    }
    Ok(out)
}
