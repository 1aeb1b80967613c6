//! Splits a `VALUES` payload into its top-level row tuples.

use super::QuoteState;

/// Result of splitting one payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TupleSplit<'a> {
    /// Tuples in source order, each including its own parentheses
    pub tuples: Vec<&'a str>,
    /// A tuple was opened but never closed before the end of input
    pub dropped: bool,
}

/// Split `(...),(...),(...)` into `["(...)", "(...)", "(...)"]`.
///
/// Commas and parentheses inside single-quoted strings are content. A tuple
/// left open by an unterminated string or a missing `)` is dropped and
/// reported through [`TupleSplit::dropped`].
pub fn split_tuples(payload: &str) -> TupleSplit<'_> {
    let bytes = payload.as_bytes();
    let mut quote = QuoteState::new();
    let mut depth: usize = 0;
    let mut start: Option<usize> = None;
    let mut tuples = Vec::new();

    for (i, &b) in bytes.iter().enumerate() {
        if quote.feed(b) {
            continue;
        }

        match b {
            b'(' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        tuples.push(&payload[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    TupleSplit {
        tuples,
        dropped: start.is_some(),
    }
}
