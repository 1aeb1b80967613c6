//! Splits one row tuple into raw field tokens.

use super::QuoteState;

/// Split the interior of a tuple (outer parentheses already removed) on
/// commas outside string literals.
///
/// Every field is whitespace-trimmed and keeps its quotes. A trailing
/// remainder after the last comma is only emitted when non-empty, so `1,`
/// yields one field while `1, ` yields two.
pub fn split_fields(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut quote = QuoteState::new();
    let mut fields = Vec::new();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if quote.feed(b) {
            continue;
        }
        if b == b',' {
            fields.push(inner[start..i].trim());
            start = i + 1;
        }
    }

    if start < inner.len() {
        fields.push(inner[start..].trim());
    }

    fields
}

/// Split a full tuple span such as `(1,'a',NULL)` into its fields.
pub fn split_tuple_fields(tuple: &str) -> Vec<&str> {
    let inner = tuple.strip_prefix('(').unwrap_or(tuple);
    let inner = inner.strip_suffix(')').unwrap_or(inner);
    split_fields(inner)
}
