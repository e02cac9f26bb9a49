//! OCR character-confusion correction.
//!
//! [`normalize`] is length-preserving: every rule swaps one ASCII character
//! for another, so byte offsets found in normalized text are valid in the
//! original text as well.

use super::patterns::WHITESPACE;

/// Misread month abbreviations and their corrections, applied in order.
///
/// Every entry replaces at least one digit with a letter and never
/// introduces a digit, which bounds the fix-point loop in [`normalize`].
pub const MONTH_CONFUSIONS: &[(&str, &str)] = &[
    ("0C7", "OCT"),
    ("0CT", "OCT"),
    ("OC7", "OCT"),
    ("N0V", "NOV"),
    ("0EC", "DEC"),
    ("DE0", "DEC"),
    ("FE8", "FEB"),
    ("J4N", "JAN"),
    ("M4R", "MAR"),
    ("4PR", "APR"),
    ("M4Y", "MAY"),
    ("JU1", "JUL"),
    ("4UG", "AUG"),
    ("AU6", "AUG"),
    ("5EP", "SEP"),
];

/// Fix systematic OCR confusions. Total, pure and idempotent.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_string();

    loop {
        let mut changed = false;
        for (wrong, right) in MONTH_CONFUSIONS {
            if let Some(replaced) = replace_ascii_ci(&current, wrong, right) {
                current = replaced;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    reclassify_ones(&current)
}

/// Upper-case and collapse whitespace runs to single spaces.
pub fn prepare_text(text: &str) -> String {
    WHITESPACE
        .replace_all(text.trim(), " ")
        .to_uppercase()
}

/// Apply the month-token corrections to a single token.
pub fn correct_month_token(token: &str) -> String {
    let mut current = token.to_ascii_uppercase();
    for (wrong, right) in MONTH_CONFUSIONS {
        if let Some(replaced) = replace_ascii_ci(&current, wrong, right) {
            current = replaced;
        }
    }
    current
}

/// Case-insensitive ASCII replacement. Returns `None` when nothing matched.
fn replace_ascii_ci(text: &str, from: &str, to: &str) -> Option<String> {
    let haystack = text.as_bytes();
    let needle = from.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;

    while i + needle.len() <= haystack.len() {
        if haystack[i..i + needle.len()].eq_ignore_ascii_case(needle) {
            // Matched bytes are ASCII, so both ends sit on char boundaries.
            out.push_str(&text[last..i]);
            out.push_str(to);
            i += needle.len();
            last = i;
        } else {
            i += 1;
        }
    }

    if last == 0 {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

/// A `1` between a letter and a vowel is read as `I` ("K1OKO" -> "KIOKO").
fn reclassify_ones(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let after_letter = i > 0 && chars[i - 1].is_ascii_alphabetic();
            let before_vowel = chars
                .get(i + 1)
                .is_some_and(|next| matches!(next.to_ascii_uppercase(), 'A' | 'E' | 'O' | 'U'));
            if c == '1' && after_letter && before_vowel {
                'I'
            } else {
                c
            }
        })
        .collect()
}
