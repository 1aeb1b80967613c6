use crate::compression::Compression;
use crate::config::ExportConfig;
use crate::decimal::Decimal;
use crate::export::build_exports;
use crate::extract::DumpExtract;
use crate::pricing::RoundingMode;
use crate::records::Catalog;
use crate::writer::write_outputs;
use std::path::PathBuf;
use std::time::Instant;

pub struct ExportArgs {
    pub file: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub fx_rate: Option<Decimal>,
    pub step: Option<i64>,
    pub rounding: Option<RoundingMode>,
    pub progress: bool,
    pub verbose: bool,
    pub dry_run: bool,
}

pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    if !args.file.exists() {
        anyhow::bail!("input file does not exist: {}", args.file.display());
    }

    let config = resolve_config(&args)?;

    let compression = Compression::from_path(&args.file);
    if compression != Compression::None {
        println!("Detected compression: {}", compression);
    }

    println!("Reading dump: {}", args.file.display());
    println!(
        "Pricing: rate {} {}, step {}, rounding {}",
        config.pricing.fx_rate, config.pricing.currency, config.pricing.step, config.pricing.rounding
    );
    println!();

    let start_time = Instant::now();

    let tables: Vec<String> = config
        .tables
        .all()
        .iter()
        .map(|t| t.to_string())
        .collect();
    let extract = super::parse_with_optional_progress(&args.file, &tables, args.progress)?;
    let catalog = Catalog::from_extract(&extract, &config);
    let exports = build_exports(&catalog, &config.pricing);

    let elapsed = start_time.elapsed();
    println!("✓ Parsed and normalized in {:.3?}\n", elapsed);

    print_parse_summary(&extract, args.verbose);
    print_catalog_summary(&catalog, args.verbose);

    println!();
    println!("Operators:              {}", catalog.operators.len());
    println!("Packages:               {}", exports.len());
    println!("Packages with options:  {}", catalog.packages_with_options());

    if args.dry_run {
        println!("\n(dry run, no files written)");
        return Ok(());
    }

    let (json_path, csv_path) = write_outputs(
        &args.output,
        &config.output.json_file,
        &config.output.csv_file,
        &exports,
    )?;
    println!();
    println!("Wrote {}", json_path.display());
    println!("Wrote {}", csv_path.display());

    Ok(())
}

/// Config file (or defaults), then command-line overrides on top.
fn resolve_config(args: &ExportArgs) -> anyhow::Result<ExportConfig> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };

    if let Some(rate) = args.fx_rate {
        config.pricing.fx_rate = rate;
    }
    if let Some(step) = args.step {
        config.pricing.step = step;
    }
    if let Some(rounding) = args.rounding {
        config.pricing.rounding = rounding;
    }

    Ok(config)
}

fn print_parse_summary(extract: &DumpExtract, verbose: bool) {
    let stats = &extract.stats;

    println!(
        "{:<40} {:>10} {:>10} {:>10}",
        "Table Name", "INSERTs", "Rows", "Ragged"
    );
    println!("{}", "─".repeat(73));
    for table in stats.sorted_tables() {
        println!(
            "{:<40} {:>10} {:>10} {:>10}",
            table.table_name, table.statements, table.rows, table.ragged_rows
        );
    }
    println!("{}", "─".repeat(73));
    println!(
        "{:<40} {:>10} {:>10} {:>10}",
        "TOTAL",
        stats.scan.statements,
        stats.total_rows(),
        stats.ragged_rows()
    );

    if stats.scan.malformed_statements > 0 {
        eprintln!(
            "Warning: {} statement(s) abandoned unterminated",
            stats.scan.malformed_statements
        );
    }
    if stats.dropped_tuples() > 0 {
        eprintln!(
            "Warning: {} statement(s) ended inside an open tuple",
            stats.dropped_tuples()
        );
    }
    if stats.coercion_fallbacks() > 0 {
        eprintln!(
            "Warning: {} numeric-looking value(s) kept as text",
            stats.coercion_fallbacks()
        );
    }
    if verbose {
        println!();
        println!("Lines scanned:          {}", stats.scan.lines);
        println!("Other-table INSERTs:    {}", stats.scan.skipped_statements);
    }
}

fn print_catalog_summary(catalog: &Catalog, verbose: bool) {
    let rejected = catalog.stats.total_rejected();
    if rejected == 0 {
        return;
    }

    eprintln!("Warning: {} row(s) rejected during decoding", rejected);
    for (kind, stats) in catalog.stats.by_kind() {
        if stats.rejected == 0 {
            continue;
        }
        eprintln!("  {}: {} rejected", kind, stats.rejected);
        if verbose {
            for err in &stats.errors {
                eprintln!("    - {}", err);
            }
        }
    }
}
