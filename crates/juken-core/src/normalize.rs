//! Answer normalization.
//!
//! Converts a raw [`AnswerInput`] into either a finite number or trimmed
//! text. Normalization never fails: anything that doesn't parse as a number
//! is compared as text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::AnswerInput;

/// How strictly numeric-looking text is parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// The whole trimmed text must be a decimal number.
    #[default]
    Strict,
    /// The longest leading numeric prefix is used (`"4.8abc"` is `4.8`).
    Lax,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMode::Strict => write!(f, "strict"),
            ParseMode::Lax => write!(f, "lax"),
        }
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ParseMode::Strict),
            "lax" | "legacy" => Ok(ParseMode::Lax),
            other => Err(format!("unknown parse mode: {other}")),
        }
    }
}

/// A normalized answer: a finite number or trimmed text, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Number(f64),
    Text(String),
}

impl Normalized {
    /// The numeric value, if this normalized to a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Normalized::Number(n) => Some(*n),
            Normalized::Text(_) => None,
        }
    }
}

impl fmt::Display for Normalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalized::Number(n) => write!(f, "{n}"),
            Normalized::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Normalize an answer for comparison.
pub fn normalize(input: &AnswerInput, mode: ParseMode) -> Normalized {
    match input {
        AnswerInput::Number(n) if n.is_finite() => Normalized::Number(*n),
        AnswerInput::Number(n) => Normalized::Text(n.to_string()),
        AnswerInput::Text(s) => {
            let trimmed = s.trim();
            match parse_number(trimmed, mode) {
                Some(n) => Normalized::Number(n),
                None => Normalized::Text(trimmed.to_string()),
            }
        }
    }
}

/// Parse trimmed text as a finite number according to `mode`.
pub fn parse_number(text: &str, mode: ParseMode) -> Option<f64> {
    let len = numeric_prefix_len(text);
    if len == 0 {
        return None;
    }
    if mode == ParseMode::Strict && len != text.len() {
        return None;
    }
    text[..len].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Length in bytes of the longest prefix of `text` that forms a decimal
/// number: `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`.
///
/// Returns 0 when no digits lead the text.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - frac_start;
        // A lone "." only counts when digits surround it on at least one side.
        if mantissa_digits > 0 {
            i = j;
        }
    }

    if mantissa_digits == 0 {
        return 0;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        // An exponent marker without digits is not part of the number.
        if j > exp_start {
            i = j;
        }
    }

    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> AnswerInput {
        AnswerInput::Text(s.to_string())
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(
            normalize(&AnswerInput::Number(4.8), ParseMode::Strict),
            Normalized::Number(4.8)
        );
        assert_eq!(
            normalize(&AnswerInput::Number(0.0), ParseMode::Strict),
            Normalized::Number(0.0)
        );
    }

    #[test]
    fn nan_number_degrades_to_text() {
        assert_eq!(
            normalize(&AnswerInput::Number(f64::NAN), ParseMode::Strict),
            Normalized::Text("NaN".into())
        );
        assert!(matches!(
            normalize(&AnswerInput::Number(f64::INFINITY), ParseMode::Lax),
            Normalized::Text(_)
        ));
    }

    #[test]
    fn text_is_trimmed_and_parsed() {
        assert_eq!(
            normalize(&text("  4.8 "), ParseMode::Strict),
            Normalized::Number(4.8)
        );
        assert_eq!(normalize(&text("0"), ParseMode::Strict), Normalized::Number(0.0));
        assert_eq!(normalize(&text("-3"), ParseMode::Strict), Normalized::Number(-3.0));
        assert_eq!(normalize(&text(".5"), ParseMode::Strict), Normalized::Number(0.5));
        assert_eq!(normalize(&text("5."), ParseMode::Strict), Normalized::Number(5.0));
        assert_eq!(
            normalize(&text("1.5e3"), ParseMode::Strict),
            Normalized::Number(1500.0)
        );
    }

    #[test]
    fn non_numeric_text_stays_text() {
        assert_eq!(
            normalize(&text(" 速さ "), ParseMode::Strict),
            Normalized::Text("速さ".into())
        );
        assert_eq!(normalize(&text(""), ParseMode::Lax), Normalized::Text(String::new()));
        assert_eq!(normalize(&text("."), ParseMode::Lax), Normalized::Text(".".into()));
        assert_eq!(normalize(&text("-"), ParseMode::Lax), Normalized::Text("-".into()));
    }

    #[test]
    fn strict_rejects_trailing_garbage() {
        assert_eq!(
            normalize(&text("4.8abc"), ParseMode::Strict),
            Normalized::Text("4.8abc".into())
        );
        assert_eq!(
            normalize(&text("12 km"), ParseMode::Strict),
            Normalized::Text("12 km".into())
        );
    }

    #[test]
    fn lax_uses_leading_prefix() {
        assert_eq!(normalize(&text("4.8abc"), ParseMode::Lax), Normalized::Number(4.8));
        assert_eq!(normalize(&text("12 km"), ParseMode::Lax), Normalized::Number(12.0));
        assert_eq!(normalize(&text("1e"), ParseMode::Lax), Normalized::Number(1.0));
        assert_eq!(normalize(&text("2e+x"), ParseMode::Lax), Normalized::Number(2.0));
        assert_eq!(normalize(&text("3.x"), ParseMode::Lax), Normalized::Number(3.0));
    }

    #[test]
    fn special_float_words_are_text() {
        for word in ["inf", "NaN", "infinity", "Infinity"] {
            assert_eq!(
                normalize(&text(word), ParseMode::Lax),
                Normalized::Text(word.into()),
                "{word} should not parse"
            );
        }
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(
            normalize(&text("1e400"), ParseMode::Strict),
            Normalized::Text("1e400".into())
        );
    }

    #[test]
    fn parse_mode_from_str() {
        assert_eq!("strict".parse::<ParseMode>().unwrap(), ParseMode::Strict);
        assert_eq!("LAX".parse::<ParseMode>().unwrap(), ParseMode::Lax);
        assert_eq!("legacy".parse::<ParseMode>().unwrap(), ParseMode::Lax);
        assert!("loose".parse::<ParseMode>().is_err());
    }
}
