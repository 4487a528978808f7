//! Display helpers shared by the document projector and the history list.
//!
//! Amounts are rounded to whole units, grouped by thousands and written with
//! the digit glyphs of the configured [`DigitSet`]. Tokens that must read
//! left-to-right inside right-to-left text are wrapped in Unicode isolates.

use serde::{Deserialize, Serialize};

/// U+2066 LEFT-TO-RIGHT ISOLATE
pub const LRI: char = '\u{2066}';
/// U+2069 POP DIRECTIONAL ISOLATE
pub const PDI: char = '\u{2069}';

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DigitSet {
    #[default]
    Persian,
    Latin,
}

impl DigitSet {
    /// Replaces ASCII digits; every other character is kept.
    pub fn transliterate(self, text: &str) -> String {
        match self {
            DigitSet::Latin => text.to_string(),
            DigitSet::Persian => text
                .chars()
                .map(|c| match c.to_digit(10) {
                    Some(d) if c.is_ascii_digit() => PERSIAN_DIGITS[d as usize],
                    _ => c,
                })
                .collect(),
        }
    }
}

/// Nearest integer, halves toward positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    // avoid "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `1234567` -> `1,234,567`. Expects an integral value.
pub fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Monetary and quantity display: rounded, grouped, transliterated.
pub fn format_amount(value: f64, digits: DigitSet) -> String {
    if !value.is_finite() {
        return digits.transliterate("0");
    }
    digits.transliterate(&group_thousands(round_half_up(value)))
}

/// Shortest decimal form without grouping, for rates such as `9` or `2.5`.
pub fn format_plain(value: f64, digits: DigitSet) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    digits.transliterate(&value.to_string())
}

/// True when the token contains characters that lay out left-to-right.
pub fn has_ltr_run(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphanumeric() || PERSIAN_DIGITS.contains(&c))
}

/// Wraps `text` in LRI ... PDI so phone numbers, account strings and invoice
/// numbers keep their internal order inside RTL paragraphs.
pub fn isolate_ltr(text: &str) -> String {
    if text.is_empty() || !has_ltr_run(text) {
        return text.to_string();
    }
    let mut isolated = String::with_capacity(text.len() + 6);
    isolated.push(LRI);
    isolated.push_str(text);
    isolated.push(PDI);
    isolated
}

/// Transliterate and isolate in one step; the common case for identifiers.
pub fn ltr_token(text: &str, digits: DigitSet) -> String {
    isolate_ltr(&digits.transliterate(text))
}
