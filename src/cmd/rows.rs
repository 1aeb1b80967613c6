use crate::extract::DumpExtract;
use crate::parser::Row;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Serialize)]
struct RowsReport<'a> {
    input_file: String,
    lines: u64,
    statements: u64,
    skipped_statements: u64,
    malformed_statements: u64,
    tables: Vec<TableReport<'a>>,
}

#[derive(Serialize)]
struct TableReport<'a> {
    name: &'a str,
    columns: &'a [String],
    statements: u64,
    rows: u64,
    dropped_tuples: u64,
    ragged_rows: u64,
    coercion_fallbacks: u64,
    #[serde(skip_serializing_if = "no_rows")]
    sample: &'a [Row],
}

fn no_rows(rows: &&[Row]) -> bool {
    rows.is_empty()
}

pub fn run(
    file: PathBuf,
    tables: String,
    sample: usize,
    json: bool,
    progress: bool,
) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("input file does not exist: {}", file.display());
    }

    let targets = super::parse_table_list(&tables);
    if targets.is_empty() {
        anyhow::bail!("no tables given");
    }

    let start_time = Instant::now();
    let extract = super::parse_with_optional_progress(&file, &targets, progress)?;
    let elapsed = start_time.elapsed();

    let report = build_report(&file, &extract, &targets, sample);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("✓ Parsed {} in {:.3?}\n", file.display(), elapsed);
    println!(
        "{:<40} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Table Name", "INSERTs", "Rows", "Dropped", "Ragged", "Fallbacks"
    );
    println!("{}", "─".repeat(95));
    for t in &report.tables {
        println!(
            "{:<40} {:>10} {:>10} {:>10} {:>10} {:>10}",
            t.name, t.statements, t.rows, t.dropped_tuples, t.ragged_rows, t.coercion_fallbacks
        );
    }

    let fallbacks: u64 = report.tables.iter().map(|t| t.coercion_fallbacks).sum();
    if fallbacks > 0 {
        eprintln!(
            "Warning: {} numeric-looking value(s) kept as text",
            fallbacks
        );
    }

    if report.malformed_statements > 0 {
        eprintln!(
            "Warning: {} statement(s) abandoned unterminated",
            report.malformed_statements
        );
    }

    for t in report.tables.iter().filter(|t| !t.sample.is_empty()) {
        println!("\n{} ({})", t.name, t.columns.join(", "));
        for row in t.sample {
            println!("  {}", serde_json::to_string(row)?);
        }
    }

    Ok(())
}

fn build_report<'a>(
    file: &std::path::Path,
    extract: &'a DumpExtract,
    targets: &'a [String],
    sample: usize,
) -> RowsReport<'a> {
    let scan = extract.stats.scan;
    let tables = targets
        .iter()
        .map(|name| {
            let stats = extract.stats.tables.get(name).cloned().unwrap_or_default();
            let rows = extract.rows(name);
            TableReport {
                name,
                columns: extract.columns(name).unwrap_or(&[]),
                statements: stats.statements,
                rows: stats.rows,
                dropped_tuples: stats.dropped_tuples,
                ragged_rows: stats.ragged_rows,
                coercion_fallbacks: stats.coercion_fallbacks,
                sample: &rows[..sample.min(rows.len())],
            }
        })
        .collect();

    RowsReport {
        input_file: file.display().to_string(),
        lines: scan.lines,
        statements: scan.statements,
        skipped_statements: scan.skipped_statements,
        malformed_statements: scan.malformed_statements,
        tables,
    }
}
