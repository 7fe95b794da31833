//! Row tokenizer: one source line in, one fixed-arity raw row out (or nothing).

use serde::{Deserialize, Serialize};
use simrecon_core::{NumericToken, RawTableRow, TableKind, TokenClass};

use crate::reconstruct::reconstruct;

/// How fields are separated on a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// `&` column separators of typeset tables.
    #[default]
    Ampersand,
    /// Runs of whitespace, as in plain OCR text.
    Whitespace,
}

/// Per-kind tokenizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowOptions {
    pub delimiter: Delimiter,
    /// Digit prepended to fragments that start with `.`.
    pub leading_digit: Option<u8>,
}

/// Strip layout markup and split a line into candidate fragments.
pub fn split_fragments(line: &str, delimiter: Delimiter) -> Vec<String> {
    let cleaned = line
        .replace("\\\\", " ")
        .replace("\\hline", " ")
        .replace("\\mathrm{E}", "E")
        .replace('$', "");

    let parts: Vec<&str> = match delimiter {
        Delimiter::Ampersand => cleaned.split('&').collect(),
        Delimiter::Whitespace => cleaned.split_whitespace().collect(),
    };

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !is_layout_only(p, delimiter))
        .map(str::to_string)
        .collect()
}

/// Rule lines and empty cells. A lone `-` between whitespace is a detached
/// sign, not a rule; inside an `&` cell it cannot belong to another cell.
fn is_layout_only(fragment: &str, delimiter: Delimiter) -> bool {
    if delimiter == Delimiter::Whitespace && fragment == "-" {
        return false;
    }
    fragment.chars().all(|c| matches!(c, '|' | '-' | '=') || c.is_whitespace())
}

/// Tokenize one line into exactly `arity` complete numbers.
///
/// Returns `None` for lines that do not carry a full data row (headers,
/// separators, annotations) and for rows with a malformed number. A bare
/// integer in first position becomes the row label; anywhere else it is a
/// value (`0` for a zero velocity).
pub fn tokenize_line(
    line: &str,
    line_no: usize,
    kind: TableKind,
    arity: usize,
    options: &RowOptions,
) -> Option<RawTableRow> {
    let owned = split_fragments(line, options.delimiter);
    let fragments: Vec<&str> = owned.iter().map(String::as_str).collect();

    let mut tokens: Vec<NumericToken> = Vec::new();
    let mut label: Option<u32> = None;
    let mut complete = 0usize;
    let mut offset = 0usize;

    while offset < fragments.len() && complete < arity {
        match reconstruct(&fragments, offset, options.leading_digit) {
            Ok(r) => {
                let token = match (r.token.class, r.token.value) {
                    (TokenClass::IntegerPrefix, value) if offset == 0 => {
                        label = value.map(|v| v as u32);
                        r.token
                    }
                    (TokenClass::IntegerPrefix, Some(value)) => NumericToken::complete(r.token.text, value),
                    _ => r.token,
                };
                if token.is_complete() {
                    complete += 1;
                }
                tokens.push(token);
                offset += r.consumed;
            }
            Err(e) => {
                // Pure text (units, column titles) is skipped; anything numeric-looking spoils the row.
                if !fragments[offset].bytes().any(|b| b.is_ascii_digit()) {
                    tokens.push(NumericToken {
                        text: fragments[offset].to_string(),
                        class: TokenClass::Unrecognized,
                        value: None,
                    });
                    offset += 1;
                    continue;
                }
                log::debug!("line {line_no}: {e}; row skipped");
                return None;
            }
        }
    }

    if complete < arity {
        if complete > 0 {
            log::debug!("line {line_no}: {complete} of {arity} values; row skipped");
        }
        return None;
    }
    if offset < fragments.len() {
        log::debug!("line {line_no}: ignoring {} trailing fragment(s)", fragments.len() - offset);
    }

    Some(RawTableRow { line: line_no, kind, label, tokens })
}
