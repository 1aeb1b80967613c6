mod export;
mod rows;

use crate::decimal::Decimal;
use crate::pricing::RoundingMode;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dump-extract")]
#[command(version)]
#[command(about = "Extract typed rows from SQL INSERT dumps and export normalized tour data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize tour packages, operators and prices into JSON and CSV
    Export {
        /// Input SQL dump (supports .gz, .bz2, .xz, .zst compression)
        file: PathBuf,

        /// Output directory for the JSON and CSV files
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// YAML config file (tables, pricing, output names)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Exchange rate from USD to the target currency
        #[arg(long)]
        fx_rate: Option<Decimal>,

        /// Rounding step in the target currency
        #[arg(long)]
        step: Option<i64>,

        /// Rounding mode for converted prices
        #[arg(long, value_enum, ignore_case = true)]
        rounding: Option<RoundingMode>,

        /// Show progress while reading the dump
        #[arg(short, long)]
        progress: bool,

        /// Print rejected-row samples and per-table detail
        #[arg(short, long)]
        verbose: bool,

        /// Parse and normalize without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse INSERT rows for the given tables and report counts
    Rows {
        /// Input SQL dump (supports .gz, .bz2, .xz, .zst compression)
        file: PathBuf,

        /// Tables to extract (comma-separated)
        #[arg(short, long, required = true)]
        tables: String,

        /// Print the first N rows of each table
        #[arg(long, default_value_t = 0)]
        sample: usize,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Show progress while reading the dump
        #[arg(short, long)]
        progress: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Export {
            file,
            output,
            config,
            fx_rate,
            step,
            rounding,
            progress,
            verbose,
            dry_run,
        } => export::run(export::ExportArgs {
            file,
            output,
            config,
            fx_rate,
            step,
            rounding,
            progress,
            verbose,
            dry_run,
        }),
        Commands::Rows {
            file,
            tables,
            sample,
            json,
            progress,
        } => rows::run(file, tables, sample, json, progress),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "dump-extract",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

/// Split a comma-separated table list, dropping blanks.
pub(crate) fn parse_table_list(tables: &str) -> Vec<String> {
    tables
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read a dump, optionally behind a byte progress bar on stderr.
pub(crate) fn parse_with_optional_progress(
    file: &std::path::Path,
    tables: &[String],
    progress: bool,
) -> anyhow::Result<crate::extract::DumpExtract> {
    use indicatif::{ProgressBar, ProgressStyle};

    if !progress {
        return crate::extract::parse_dump(file, tables);
    }

    let file_size = std::fs::metadata(file)
        .map(|m| m.len())
        .unwrap_or_default();
    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}",
        )?
        .progress_chars("█▓▒░  ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let pb_clone = pb.clone();
    let result = crate::extract::parse_dump_with_progress(file, tables, move |bytes| {
        pb_clone.set_position(bytes);
    });
    pb.finish_and_clear();
    result
}
