//! Coercion of raw field tokens into typed values.

use crate::decimal::Decimal;
use serde::Serialize;
use std::borrow::Cow;

/// A coerced dump value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Decimal(Decimal),
}

/// One parsed row, values in column order.
pub type Row = Vec<Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view. Text holding a base-10 integer also qualifies, since
    /// some dumps quote numeric ids.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Textual view of any non-null value.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Integer(n) => Some(Cow::Owned(n.to_string())),
            Value::Decimal(d) => Some(Cow::Owned(d.to_string())),
        }
    }

    /// Decimal view. Blank or non-numeric text yields `None`.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Null => None,
            Value::Integer(n) => Some(Decimal::from_i64(*n)),
            Value::Decimal(d) => Some(*d),
            Value::Text(s) => s.parse().ok(),
        }
    }
}

/// Coerce one raw field token. Never fails; unrecognized tokens become Text.
pub fn coerce(raw: &str) -> Value {
    classify(raw).0
}

/// Like [`coerce`], but bumps `fallbacks` when a numeric-looking token could
/// not be parsed as a number and was kept as Text.
pub fn coerce_counted(raw: &str, fallbacks: &mut u64) -> Value {
    let (value, fell_back) = classify(raw);
    if fell_back {
        *fallbacks += 1;
    }
    value
}

fn classify(raw: &str) -> (Value, bool) {
    if raw.eq_ignore_ascii_case("NULL") {
        return (Value::Null, false);
    }

    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return (Value::Text(unescape(&raw[1..raw.len() - 1])), false);
    }

    if raw.contains('.') {
        if let Ok(d) = raw.parse::<Decimal>() {
            return (Value::Decimal(d), false);
        }
    } else if let Ok(n) = raw.parse::<i64>() {
        return (Value::Integer(n), false);
    }

    (Value::Text(raw.to_string()), looks_numeric(raw))
}

fn looks_numeric(raw: &str) -> bool {
    let digits = raw.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(raw);
    let digits = digits.strip_prefix('.').unwrap_or(digits);
    digits.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

/// Undo the dump producer's backslash escaping.
///
/// Only `\\`, `\'`, `\"`, `\r`, `\n` and `\t` are translated. Any other
/// backslash sequence is kept as-is, backslash included.
pub fn unescape(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Escape text the way the dump producer does.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_any_case() {
        assert_eq!(coerce("NULL"), Value::Null);
        assert_eq!(coerce("null"), Value::Null);
        assert_eq!(coerce("'NULL'"), Value::Text("NULL".to_string()));
    }

    #[test]
    fn test_quoted_text_is_unescaped() {
        assert_eq!(coerce(r"'O\'Brien'"), Value::Text("O'Brien".to_string()));
        assert_eq!(coerce("''"), Value::Text(String::new()));
    }

    #[test]
    fn test_lone_quote_is_verbatim_text() {
        assert_eq!(coerce("'"), Value::Text("'".to_string()));
    }

    #[test]
    fn test_integers() {
        assert_eq!(coerce("42"), Value::Integer(42));
        assert_eq!(coerce("-7"), Value::Integer(-7));
        assert_eq!(coerce("+7"), Value::Integer(7));
    }

    #[test]
    fn test_decimals() {
        assert_eq!(coerce("12.50"), Value::Decimal("12.5".parse().unwrap()));
        assert_eq!(coerce("-0.25"), Value::Decimal("-0.25".parse().unwrap()));
    }

    #[test]
    fn test_unrecognized_falls_back_to_text() {
        assert_eq!(
            coerce("CURRENT_TIMESTAMP"),
            Value::Text("CURRENT_TIMESTAMP".to_string())
        );
        assert_eq!(coerce("1.2.3"), Value::Text("1.2.3".to_string()));
    }

    #[test]
    fn test_fallback_counting() {
        let mut fallbacks = 0;
        coerce_counted("12abc", &mut fallbacks);
        coerce_counted("1.2.3", &mut fallbacks);
        coerce_counted("99999999999999999999", &mut fallbacks);
        coerce_counted("CURRENT_TIMESTAMP", &mut fallbacks);
        coerce_counted("'12abc'", &mut fallbacks);
        coerce_counted("5", &mut fallbacks);
        assert_eq!(fallbacks, 3);
    }

    #[test]
    fn test_unescape_known_sequences() {
        assert_eq!(unescape(r#"a\\b\'c\"d\re\nf\tg"#), "a\\b'c\"d\re\nf\tg");
    }

    #[test]
    fn test_unescape_keeps_unknown_sequences() {
        assert_eq!(unescape(r"50\% off\Z"), r"50\% off\Z");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_unescape_is_single_pass() {
        // An escaped backslash followed by `n` is a backslash and an `n`.
        assert_eq!(unescape(r"\\n"), "\\n");
    }

    #[test]
    fn test_escape_round_trip() {
        let samples = [
            "\\", "'", "\"", "\r", "\n", "\t", "it's a \"test\"\r\n\tdone \\ ok", "\\n",
            "plain",
        ];
        for s in samples {
            assert_eq!(unescape(&escape(s)), s, "round trip failed for {s:?}");
        }
    }

    #[test]
    fn test_value_views() {
        assert_eq!(Value::Integer(5).as_i64(), Some(5));
        assert_eq!(Value::Text(" 9 ".to_string()).as_i64(), Some(9));
        assert_eq!(Value::Null.as_text(), None);
        assert_eq!(Value::Integer(5).as_text().as_deref(), Some("5"));
        assert_eq!(Value::Text("".to_string()).as_decimal(), None);
        assert_eq!(
            Value::Text("19.99".to_string()).as_decimal(),
            Some("19.99".parse::<Decimal>().unwrap())
        );
    }
}
