//! Numeric token reconstruction.
//!
//! Rebuilds one well-formed number from adjacent, possibly corrupted text
//! fragments. Repairs are an explicit ordered list of [`NormalizationRule`]s
//! applied to the accumulated string; the fragment walk itself only decides
//! which fragments belong together.

use once_cell::sync::Lazy;
use regex::Regex;
use simrecon_core::{NumericToken, TokenClass};

use crate::error::ExtractError;

static BARE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}$").expect("bare integer regex"));
static EXPONENT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{2}$").expect("exponent suffix regex"));
static MARKER_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[eE][+-]?$").expect("marker fragment regex"));
static TRAILING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[eE][+-]?$").expect("trailing marker regex"));
static CONFUSED_EXPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([eE][+-]?)([0-9OoIil]{1,2})$").expect("confused exponent regex"));
static SIGNLESS_EXPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([eE])(\d{1,2})$").expect("signless exponent regex"));

/// Glyphs OCR output uses in place of a decimal point.
const DECIMAL_GLYPHS: [char; 4] = ['•', '·', '∙', '․'];

// ---------------------------------------------------------------------------
// Normalization rules
// ---------------------------------------------------------------------------

/// One textual repair. Rules run in [`NormalizationRule::ORDERED`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationRule {
    /// `•` and similar glyphs become `.`.
    DecimalGlyph,
    /// A bare `-.` or `-0.` is the value zero.
    NegativeZero,
    /// Whitespace inside a single number is dropped.
    CollapseWhitespace,
    /// Letters misread for digits in the exponent group: `O` → `0`, `l`/`I` → `1`.
    ExponentDigitConfusion,
    /// `E02` becomes `E+02`.
    ExponentSign,
}

impl NormalizationRule {
    pub const ORDERED: [Self; 5] = [
        Self::DecimalGlyph,
        Self::NegativeZero,
        Self::CollapseWhitespace,
        Self::ExponentDigitConfusion,
        Self::ExponentSign,
    ];

    pub fn apply(self, s: &str) -> String {
        match self {
            Self::DecimalGlyph => s.chars().map(|c| if DECIMAL_GLYPHS.contains(&c) { '.' } else { c }).collect(),
            Self::NegativeZero => match s.trim() {
                "-." | "-0." => "0.0".to_string(),
                _ => s.to_string(),
            },
            Self::CollapseWhitespace => s.chars().filter(|c| !c.is_whitespace()).collect(),
            Self::ExponentDigitConfusion => CONFUSED_EXPONENT
                .replace(s, |caps: &regex::Captures| format!("{}{}", &caps[1], map_confused_digits(&caps[2])))
                .into_owned(),
            Self::ExponentSign => SIGNLESS_EXPONENT.replace(s, "${1}+${2}").into_owned(),
        }
    }
}

/// Run every rule in order.
pub fn normalize(s: &str) -> String {
    NormalizationRule::ORDERED
        .iter()
        .fold(s.to_string(), |acc, rule| rule.apply(&acc))
}

fn map_confused_digits(group: &str) -> String {
    group
        .chars()
        .map(|c| match c {
            'O' | 'o' => '0',
            'l' | 'I' | 'i' => '1',
            other => other,
        })
        .collect()
}

fn prepare(fragment: &str) -> String {
    NormalizationRule::DecimalGlyph.apply(fragment.trim())
}

fn is_exponent_suffix(fragment: &str) -> bool {
    EXPONENT_SUFFIX.is_match(&map_confused_digits(fragment))
}

fn is_sign(fragment: &str) -> bool {
    fragment == "-" || fragment == "+"
}

fn has_marker(s: &str) -> bool {
    s.contains(|c: char| c == 'e' || c == 'E')
}

fn parse_number(s: &str) -> Option<f64> {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Context-free class of a single fragment.
pub fn classify(fragment: &str) -> TokenClass {
    let f = prepare(fragment);
    if BARE_INTEGER.is_match(&f) {
        TokenClass::IntegerPrefix
    } else if MARKER_FRAGMENT.is_match(&f) {
        TokenClass::ExponentSuffix
    } else if f.starts_with('.') || TRAILING_MARKER.is_match(&f) {
        TokenClass::MantissaFragment
    } else if parse_number(&normalize(&f)).is_some() {
        TokenClass::CompleteNumber
    } else if is_exponent_suffix(&f) {
        TokenClass::ExponentSuffix
    } else {
        TokenClass::Unrecognized
    }
}

// ---------------------------------------------------------------------------
// Reconstruction
// ---------------------------------------------------------------------------

/// A reconstructed token and the number of fragments it used.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub token: NumericToken,
    pub consumed: usize,
}

/// Rebuild one number starting at `fragments[offset]`.
///
/// `leading_digit` is prepended to a fragment that starts with `.`; without
/// it such a fragment is malformed. A bare 1–2 digit integer not followed by
/// a `.` fragment comes back as an `IntegerPrefix` token. A lone sign
/// fragment joins the mantissa or exponent digits that follow it.
pub fn reconstruct(
    fragments: &[&str],
    offset: usize,
    leading_digit: Option<u8>,
) -> Result<Reconstruction, ExtractError> {
    let malformed = |used: usize| ExtractError::MalformedNumber {
        fragments: fragments
            .iter()
            .skip(offset)
            .take(used.max(1))
            .map(|f| f.to_string())
            .collect(),
    };
    let at = |i: usize| fragments.get(offset + i).map(|f| prepare(f));

    let head = at(0).ok_or_else(|| malformed(0))?;

    // Seek sign ("- 1.5E+00")
    let (first, base) = match at(1) {
        Some(next) if is_sign(&head) && next.starts_with(|c: char| c.is_ascii_digit()) => {
            (format!("{head}{next}"), 1)
        }
        _ => (head, 0),
    };

    // Seek mantissa
    let (mut acc, mut consumed) = match classify(&first) {
        TokenClass::IntegerPrefix => match at(1) {
            Some(frac) if frac.starts_with('.') => (format!("{first}{frac}"), 2),
            _ => {
                let label: u32 = first.parse().map_err(|_| malformed(1))?;
                return Ok(Reconstruction { token: NumericToken::integer_prefix(first, label), consumed: 1 });
            }
        },
        TokenClass::MantissaFragment if first.starts_with('.') => match leading_digit {
            Some(d) if d <= 9 => (format!("{d}{first}"), 1),
            _ => return Err(malformed(1)),
        },
        TokenClass::MantissaFragment | TokenClass::CompleteNumber => (first, base + 1),
        TokenClass::ExponentSuffix | TokenClass::Unrecognized => return Err(malformed(base + 1)),
    };

    // Seek exponent marker split off as its own fragment ("2.407454 E -04")
    if !has_marker(&acc) {
        if let Some(marker) = at(consumed).filter(|f| MARKER_FRAGMENT.is_match(f)) {
            acc.push_str(&marker);
            consumed += 1;
        }
    }

    // Seek exponent suffix, possibly behind a detached sign ("E - 04")
    if TRAILING_MARKER.is_match(&acc) {
        let unsigned = acc.ends_with(['e', 'E']);
        match (at(consumed), at(consumed + 1)) {
            (Some(sign), Some(digits))
                if unsigned && is_sign(&sign) && is_exponent_suffix(&digits) && !digits.starts_with(['+', '-']) =>
            {
                acc.push_str(&sign);
                acc.push_str(&digits);
                consumed += 2;
            }
            (Some(suffix), _) if is_exponent_suffix(&suffix) => {
                acc.push_str(&suffix);
                consumed += 1;
            }
            _ => {}
        }
    }

    let text = normalize(&acc);
    match parse_number(&text) {
        Some(value) => Ok(Reconstruction { token: NumericToken::complete(text, value), consumed }),
        None => Err(malformed(consumed)),
    }
}
