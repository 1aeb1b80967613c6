//! Character-level tokenizer for dump `INSERT ... VALUES` statements.
//!
//! The pipeline runs strictly downstream:
//! [`scanner`] finds target statements, [`tuple`] splits a `VALUES` payload
//! into row tuples, [`field`] splits one tuple into raw tokens and [`value`]
//! coerces each token into a typed [`Value`].

pub mod field;
pub mod scanner;
pub mod tuple;
pub mod value;

pub use field::{split_fields, split_tuple_fields};
pub use scanner::{DumpScanner, DumpStatement, ScanStats};
pub use tuple::{split_tuples, TupleSplit};
pub use value::{coerce, coerce_counted, escape, unescape, Row, Value};

pub const SMALL_BUFFER_SIZE: usize = 64 * 1024;
pub const MEDIUM_BUFFER_SIZE: usize = 256 * 1024;

/// String-literal tracking shared by the scanner and both tokenizers.
///
/// Only single quotes delimit strings. Inside a string a backslash escapes
/// the next byte, whatever it is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuoteState {
    in_string: bool,
    escape_pending: bool,
}

impl QuoteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns `true` when the byte belongs to a string
    /// literal (its content, an escape, or either quote) and must not be
    /// treated as structure by the caller.
    #[inline]
    pub fn feed(&mut self, b: u8) -> bool {
        if self.in_string {
            if self.escape_pending {
                self.escape_pending = false;
            } else if b == b'\\' {
                self.escape_pending = true;
            } else if b == b'\'' {
                self.in_string = false;
            }
            return true;
        }

        if b == b'\'' {
            self.in_string = true;
            return true;
        }

        false
    }

    #[inline]
    pub fn in_string(&self) -> bool {
        self.in_string
    }
}

pub fn determine_buffer_size(file_size: u64) -> usize {
    if file_size > 1024 * 1024 * 1024 {
        MEDIUM_BUFFER_SIZE
    } else {
        SMALL_BUFFER_SIZE
    }
}
