//! Dump-level entry points: run the scanner, tokenizers and coercer over a
//! whole file and collect rows per target table.

use crate::compression::Compression;
use crate::parser::{
    coerce_counted, determine_buffer_size, split_tuple_fields, split_tuples, DumpScanner,
    DumpStatement, Row, ScanStats,
};
use crate::progress::ProgressReader;
use ahash::AHashMap;
use anyhow::Context;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Per-table parse counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStats {
    pub table_name: String,
    pub statements: u64,
    pub rows: u64,
    /// Tuples dropped because a string or parenthesis never closed
    pub dropped_tuples: u64,
    /// Rows whose width differs from the statement's column list
    pub ragged_rows: u64,
    /// Numeric-looking tokens kept as text
    pub coercion_fallbacks: u64,
}

impl TableStats {
    fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            ..Default::default()
        }
    }
}

/// Whole-run counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub scan: ScanStats,
    pub tables: AHashMap<String, TableStats>,
}

impl ParseStats {
    pub fn total_rows(&self) -> u64 {
        self.tables.values().map(|t| t.rows).sum()
    }

    pub fn dropped_tuples(&self) -> u64 {
        self.tables.values().map(|t| t.dropped_tuples).sum()
    }

    pub fn ragged_rows(&self) -> u64 {
        self.tables.values().map(|t| t.ragged_rows).sum()
    }

    pub fn coercion_fallbacks(&self) -> u64 {
        self.tables.values().map(|t| t.coercion_fallbacks).sum()
    }

    /// Table stats sorted by name.
    pub fn sorted_tables(&self) -> Vec<&TableStats> {
        let mut tables: Vec<&TableStats> = self.tables.values().collect();
        tables.sort_by(|a, b| a.table_name.cmp(&b.table_name));
        tables
    }
}

/// Rows extracted from one dump, keyed by table.
#[derive(Debug, Clone, Default)]
pub struct DumpExtract {
    tables: AHashMap<String, Vec<Row>>,
    columns: AHashMap<String, Vec<String>>,
    pub stats: ParseStats,
}

impl DumpExtract {
    fn with_targets<'a>(targets: impl IntoIterator<Item = &'a str>) -> Self {
        let mut extract = Self::default();
        for table in targets {
            extract.tables.entry(table.to_string()).or_default();
            extract
                .stats
                .tables
                .entry(table.to_string())
                .or_insert_with(|| TableStats::new(table));
        }
        extract
    }

    /// Rows for `table`; empty when the table never appeared.
    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move the rows for `table` out of the extract.
    pub fn take_rows(&mut self, table: &str) -> Vec<Row> {
        self.tables
            .get_mut(table)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Column names from the first header seen for `table`.
    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.columns.get(table).map(Vec::as_slice)
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn absorb(&mut self, stmt: DumpStatement) {
        let stats = self
            .stats
            .tables
            .entry(stmt.table.clone())
            .or_insert_with(|| TableStats::new(&stmt.table));
        stats.statements += 1;

        let split = split_tuples(&stmt.payload);
        if split.dropped {
            stats.dropped_tuples += 1;
        }

        let width = stmt.columns.len();
        let rows = self.tables.entry(stmt.table.clone()).or_default();
        for tuple in split.tuples {
            let row: Row = split_tuple_fields(tuple)
                .into_iter()
                .map(|raw| coerce_counted(raw, &mut stats.coercion_fallbacks))
                .collect();
            if row.len() != width {
                stats.ragged_rows += 1;
            }
            stats.rows += 1;
            rows.push(row);
        }

        self.columns.entry(stmt.table).or_insert(stmt.columns);
    }
}

/// Parse every target-table row from an in-memory or streamed dump.
pub fn parse_reader<R, I, S>(reader: R, targets: I) -> anyhow::Result<DumpExtract>
where
    R: Read,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_with_capacity(reader, crate::parser::SMALL_BUFFER_SIZE, targets)
}

fn parse_with_capacity<R, I, S>(
    reader: R,
    buffer_size: usize,
    targets: I,
) -> anyhow::Result<DumpExtract>
where
    R: Read,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let targets: Vec<String> = targets
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect();
    let mut extract = DumpExtract::with_targets(targets.iter().map(String::as_str));
    let mut scanner = DumpScanner::with_capacity(reader, buffer_size, targets);

    while let Some(stmt) = scanner.next_statement()? {
        extract.absorb(stmt);
    }

    extract.stats.scan = scanner.stats();
    Ok(extract)
}

/// Parse every target-table row from the dump at `path`.
///
/// Only I/O problems are errors. Unterminated statements and unbalanced
/// tuples are skipped and counted in [`DumpExtract::stats`].
pub fn parse_dump<I, S>(path: &Path, targets: I) -> anyhow::Result<DumpExtract>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (file, file_size) = open_dump(path)?;
    let reader = Compression::from_path(path).wrap_reader(Box::new(file))?;
    parse_with_capacity(reader, determine_buffer_size(file_size), targets)
        .with_context(|| format!("failed to read dump {}", path.display()))
}

/// [`parse_dump`] with a callback receiving the number of file bytes read.
pub fn parse_dump_with_progress<I, S, F>(
    path: &Path,
    targets: I,
    on_progress: F,
) -> anyhow::Result<DumpExtract>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(u64) + 'static,
{
    let (file, file_size) = open_dump(path)?;
    let progress = ProgressReader::new(file, on_progress);
    let reader = Compression::from_path(path).wrap_reader(Box::new(progress))?;
    parse_with_capacity(reader, determine_buffer_size(file_size), targets)
        .with_context(|| format!("failed to read dump {}", path.display()))
}

fn open_dump(path: &Path) -> anyhow::Result<(File, u64)> {
    let file =
        File::open(path).with_context(|| format!("cannot open dump {}", path.display()))?;
    let file_size = file
        .metadata()
        .with_context(|| format!("cannot stat dump {}", path.display()))?
        .len();
    Ok((file, file_size))
}
