//! JSON and CSV output for normalized package exports.

use crate::export::PackageExport;
use anyhow::Context;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;

/// Flat CSV record; one per package.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    package_legacy_id: i64,
    slug: &'a str,
    name: &'a str,
    status: Option<&'a str>,
    seller_legacy_id: i64,
    seller_name: Option<&'a str>,
    seller_email: Option<&'a str>,
    seller_phone: Option<&'a str>,
    category_primary: &'a str,
    min_price_rwf: i64,
    max_price_rwf: i64,
    price_points_rwf: String,
    cover_image: Option<&'a str>,
}

impl<'a> From<&'a PackageExport> for CsvRow<'a> {
    fn from(p: &'a PackageExport) -> Self {
        Self {
            package_legacy_id: p.package_legacy_id,
            slug: &p.slug,
            name: &p.name,
            status: p.status.as_deref(),
            seller_legacy_id: p.seller_legacy_id,
            seller_name: p.seller_name.as_deref(),
            seller_email: p.seller_email.as_deref(),
            seller_phone: p.seller_phone.as_deref(),
            category_primary: p.primary_category(),
            min_price_rwf: p.min_price_rwf,
            max_price_rwf: p.max_price_rwf,
            price_points_rwf: p
                .price_points_rwf
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(";"),
            cover_image: p.cover_image.as_deref(),
        }
    }
}

/// Pretty-printed JSON array, non-ASCII kept as-is.
pub fn write_json<W: Write>(mut writer: W, exports: &[PackageExport]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, exports)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn write_csv<W: Write>(writer: W, exports: &[PackageExport]) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if exports.is_empty() {
        csv_writer.write_record(CSV_HEADER)?;
    }
    for export in exports {
        csv_writer.serialize(CsvRow::from(export))?;
    }
    csv_writer.flush()?;
    Ok(())
}

const CSV_HEADER: [&str; 13] = [
    "package_legacy_id",
    "slug",
    "name",
    "status",
    "seller_legacy_id",
    "seller_name",
    "seller_email",
    "seller_phone",
    "category_primary",
    "min_price_rwf",
    "max_price_rwf",
    "price_points_rwf",
    "cover_image",
];

/// Write both output files into `dir`, creating it if needed.
pub fn write_outputs(
    dir: &Path,
    json_file: &str,
    csv_file: &str,
    exports: &[PackageExport],
) -> anyhow::Result<(std::path::PathBuf, std::path::PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;

    let json_path = dir.join(json_file);
    let file = File::create(&json_path)
        .with_context(|| format!("cannot create {}", json_path.display()))?;
    write_json(BufWriter::with_capacity(WRITER_BUFFER_SIZE, file), exports)?;

    let csv_path = dir.join(csv_file);
    let file = File::create(&csv_path)
        .with_context(|| format!("cannot create {}", csv_path.display()))?;
    write_csv(BufWriter::with_capacity(WRITER_BUFFER_SIZE, file), exports)?;

    Ok((json_path, csv_path))
}
