//! Line-oriented scanner that finds target `INSERT INTO` statements.
//!
//! A statement header must sit alone on its line:
//!
//! ```text
//! INSERT INTO `tour_packages` (`id`, `name`) VALUES
//! (1, 'Gorilla trek'),
//! (2, 'Lake Kivu; two days');
//! ```
//!
//! Body lines are accumulated until a line ends with a `;` that lies outside
//! every string literal. String state is tracked across lines, so a
//! multi-line text value whose line happens to end in `;` does not cut the
//! statement short.
//!
//! A line that is exactly a header always starts a new statement, even when
//! the previous body left a string open. The open statement is abandoned and
//! counted as malformed.

use super::QuoteState;
use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, BufRead, BufReader, Read};

static INSERT_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^INSERT INTO `(?P<table>[^`]+)`\s+\((?P<columns>[^)]+)\)\s+VALUES\s*$")
        .unwrap()
});

/// One matched `INSERT INTO` block for a target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpStatement {
    pub table: String,
    /// Column names from the header, backticks removed
    pub columns: Vec<String>,
    /// Everything after the header up to, not including, the final `;`
    pub payload: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: u64,
    /// Target statements emitted
    pub statements: u64,
    /// Statements for tables outside the target set
    pub skipped_statements: u64,
    /// Target statements that never terminated
    pub malformed_statements: u64,
}

#[derive(Debug)]
enum ScanState {
    Idle,
    Collecting {
        table: String,
        columns: Vec<String>,
        body: String,
        quote: QuoteState,
    },
    Skipping {
        quote: QuoteState,
    },
}

pub struct DumpScanner<R: Read> {
    reader: BufReader<R>,
    targets: AHashSet<String>,
    state: ScanState,
    line_buf: Vec<u8>,
    stats: ScanStats,
}

impl<R: Read> DumpScanner<R> {
    pub fn new<I, S>(reader: R, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_capacity(reader, super::SMALL_BUFFER_SIZE, targets)
    }

    pub fn with_capacity<I, S>(reader: R, buffer_size: usize, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reader: BufReader::with_capacity(buffer_size, reader),
            targets: targets.into_iter().map(Into::into).collect(),
            state: ScanState::Idle,
            line_buf: Vec::with_capacity(8 * 1024),
            stats: ScanStats::default(),
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Read forward to the next complete target statement.
    ///
    /// Returns `Ok(None)` at end of input. A target statement still open at
    /// that point is discarded and counted as malformed.
    pub fn next_statement(&mut self) -> io::Result<Option<DumpStatement>> {
        loop {
            let mut buf = std::mem::take(&mut self.line_buf);
            buf.clear();
            let n = self.reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                if matches!(self.state, ScanState::Collecting { .. }) {
                    self.stats.malformed_statements += 1;
                }
                self.state = ScanState::Idle;
                self.line_buf = buf;
                return Ok(None);
            }
            self.stats.lines += 1;

            let stmt = {
                let line = String::from_utf8_lossy(trim_line_ending(&buf));
                self.process_line(&line)
            };
            self.line_buf = buf;

            if let Some(stmt) = stmt {
                return Ok(Some(stmt));
            }
        }
    }

    fn process_line(&mut self, line: &str) -> Option<DumpStatement> {
        // Header lines resync even inside an open string.
        if let Some((table, columns)) = parse_header(line) {
            self.start_statement(table, columns);
            return None;
        }

        match &mut self.state {
            ScanState::Idle => None,
            ScanState::Skipping { quote } => {
                if feed_line(quote, line) {
                    self.state = ScanState::Idle;
                }
                None
            }
            ScanState::Collecting { body, quote, .. } => {
                body.push_str(line);
                if !feed_line(quote, line) {
                    body.push('\n');
                    return None;
                }

                match std::mem::replace(&mut self.state, ScanState::Idle) {
                    ScanState::Collecting {
                        table,
                        columns,
                        mut body,
                        ..
                    } => {
                        let end = body.trim_end().len();
                        body.truncate(end);
                        body.pop(); // the terminating ';'
                        self.stats.statements += 1;
                        Some(DumpStatement {
                            table,
                            columns,
                            payload: body,
                        })
                    }
                    _ => None,
                }
            }
        }
    }

    fn start_statement(&mut self, table: String, columns: Vec<String>) {
        if matches!(self.state, ScanState::Collecting { .. }) {
            self.stats.malformed_statements += 1;
        }

        self.state = if self.targets.contains(&table) {
            ScanState::Collecting {
                table,
                columns,
                body: String::new(),
                quote: QuoteState::new(),
            }
        } else {
            self.stats.skipped_statements += 1;
            ScanState::Skipping {
                quote: QuoteState::new(),
            }
        };
    }
}

impl<R: Read> Iterator for DumpScanner<R> {
    type Item = io::Result<DumpStatement>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_statement().transpose()
    }
}

/// Feed a full line into `quote`. Returns true when the line terminates the
/// statement: it ends with `;` and that `;` is outside any string. Otherwise
/// the line break joining it to the next line is fed as well.
fn feed_line(quote: &mut QuoteState, line: &str) -> bool {
    for &b in line.as_bytes() {
        quote.feed(b);
    }
    if !quote.in_string() && line.trim_end().ends_with(';') {
        return true;
    }
    quote.feed(b'\n');
    false
}

/// Match a statement header line, returning the table name and columns.
pub fn parse_header(line: &str) -> Option<(String, Vec<String>)> {
    if !line.starts_with("INSERT INTO `") {
        return None;
    }
    let caps = INSERT_HEADER_RE.captures(line)?;
    let table = caps.name("table")?.as_str().to_string();
    let columns = caps
        .name("columns")?
        .as_str()
        .split(',')
        .map(|c| c.trim().trim_matches('`').to_string())
        .collect();
    Some((table, columns))
}

#[inline]
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
