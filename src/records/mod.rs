//! Typed records mapped from dump rows by fixed column position.
//!
//! Each record type declares the exact row width it expects. Rows of any
//! other width, or with a required column of the wrong shape, are rejected
//! with a [`RecordError`] and counted rather than padded or guessed.

use crate::config::ExportConfig;
use crate::decimal::Decimal;
use crate::extract::DumpExtract;
use crate::parser::Value;
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Rejected rows are counted in full, but only this many errors are kept.
pub const MAX_ERROR_SAMPLES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("{record}: expected {expected} columns, found {found}")]
    RowWidth {
        record: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{record}: column {column} (`{name}`) is not a valid {kind}")]
    InvalidField {
        record: &'static str,
        column: usize,
        name: &'static str,
        kind: &'static str,
    },
}

/// A record decodable from one dump row.
pub trait FromRow: Sized {
    const RECORD: &'static str;
    const COLUMNS: &'static [&'static str];

    fn from_fields(fields: &Fields<'_>) -> Result<Self, RecordError>;

    fn from_row(row: &[Value]) -> Result<Self, RecordError> {
        if row.len() != Self::COLUMNS.len() {
            return Err(RecordError::RowWidth {
                record: Self::RECORD,
                expected: Self::COLUMNS.len(),
                found: row.len(),
            });
        }
        Self::from_fields(&Fields {
            record: Self::RECORD,
            columns: Self::COLUMNS,
            row,
        })
    }
}

/// Positional accessors over a row whose width is already checked.
pub struct Fields<'a> {
    record: &'static str,
    columns: &'static [&'static str],
    row: &'a [Value],
}

impl Fields<'_> {
    fn invalid(&self, column: usize, kind: &'static str) -> RecordError {
        RecordError::InvalidField {
            record: self.record,
            column,
            name: self.columns[column],
            kind,
        }
    }

    pub fn id(&self, column: usize) -> Result<i64, RecordError> {
        self.row[column]
            .as_i64()
            .ok_or_else(|| self.invalid(column, "integer id"))
    }

    /// Trimmed text; NULL becomes the empty string.
    pub fn text(&self, column: usize) -> String {
        self.opt_text(column).unwrap_or_default()
    }

    /// Trimmed text, `None` for NULL.
    pub fn opt_text(&self, column: usize) -> Option<String> {
        self.row[column].as_text().map(|s| s.trim().to_string())
    }

    /// Text exactly as stored, `None` for NULL.
    pub fn opt_raw(&self, column: usize) -> Option<String> {
        self.row[column].as_text().map(|s| s.into_owned())
    }

    /// Decimal amount; NULL, blank or non-numeric text yield `None`.
    pub fn decimal(&self, column: usize) -> Option<Decimal> {
        self.row[column].as_decimal()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub legacy_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub code: Option<String>,
}

impl Operator {
    pub const ROLE_COLUMN: usize = 8;
}

impl FromRow for Operator {
    const RECORD: &'static str = "operator";
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "name",
        "phone",
        "email",
        "password",
        "profile_pic",
        "bio",
        "token",
        "role",
        "status",
        "registration_date",
        "code",
    ];

    fn from_fields(f: &Fields<'_>) -> Result<Self, RecordError> {
        Ok(Self {
            legacy_id: f.id(0)?,
            name: f.text(1),
            phone: f.opt_text(2),
            email: f.opt_text(3),
            profile_pic: f.opt_text(5),
            bio: f.opt_text(6),
            role: f.opt_text(8),
            status: f.opt_text(9),
            code: f.opt_text(11),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub legacy_id: i64,
    pub slug: String,
    pub name: String,
    /// HTML description as stored
    pub description_raw: Option<String>,
    pub base_price: Option<Decimal>,
    pub cover_image: Option<String>,
    pub seller_legacy_id: i64,
    pub status: Option<String>,
}

impl FromRow for Package {
    const RECORD: &'static str = "package";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "code",
        "name",
        "description",
        "base_price",
        "cover_image",
        "seller_id",
        "status",
        "created_by",
        "updated_by",
        "created_at",
        "updated_at",
    ];

    fn from_fields(f: &Fields<'_>) -> Result<Self, RecordError> {
        Ok(Self {
            legacy_id: f.id(0)?,
            slug: f.text(1),
            name: f.text(2),
            description_raw: f.opt_raw(3),
            base_price: f.decimal(4),
            cover_image: f.opt_text(5),
            seller_legacy_id: f.id(6)?,
            status: f.opt_text(7),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOption {
    pub legacy_id: i64,
    pub package_legacy_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

impl FromRow for PackageOption {
    const RECORD: &'static str = "option";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "package_id",
        "name",
        "description",
        "price",
        "created_at",
        "updated_at",
    ];

    fn from_fields(f: &Fields<'_>) -> Result<Self, RecordError> {
        Ok(Self {
            legacy_id: f.id(0)?,
            package_legacy_id: f.id(1)?,
            name: f.text(2),
            description: f.opt_text(3),
            price: f.decimal(4),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub legacy_id: i64,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<String>,
}

impl FromRow for Category {
    const RECORD: &'static str = "category";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "code",
        "name",
        "description",
        "cover_image",
        "status",
        "created_by",
        "updated_by",
        "created_at",
        "updated_at",
    ];

    fn from_fields(f: &Fields<'_>) -> Result<Self, RecordError> {
        Ok(Self {
            legacy_id: f.id(0)?,
            slug: f.text(1),
            name: f.text(2),
            description: f.opt_text(3),
            cover_image: f.opt_text(4),
            status: f.opt_text(5),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRelation {
    pub legacy_id: i64,
    pub package_legacy_id: i64,
    pub category_legacy_id: i64,
}

impl FromRow for CategoryRelation {
    const RECORD: &'static str = "category_relation";
    const COLUMNS: &'static [&'static str] = &["id", "package_id", "category_id", "created_at"];

    fn from_fields(f: &Fields<'_>) -> Result<Self, RecordError> {
        Ok(Self {
            legacy_id: f.id(0)?,
            package_legacy_id: f.id(1)?,
            category_legacy_id: f.id(2)?,
        })
    }
}

/// Outcome counts for decoding one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub accepted: u64,
    pub rejected: u64,
    /// Well-formed rows left out on purpose (e.g. non-operator users)
    pub filtered: u64,
    pub errors: Vec<RecordError>,
}

impl DecodeStats {
    fn reject(&mut self, err: RecordError) {
        self.rejected += 1;
        if self.errors.len() < MAX_ERROR_SAMPLES {
            self.errors.push(err);
        }
    }
}

/// Decode every row, keeping the successes and counting the failures.
pub fn decode_rows<T: FromRow>(rows: &[Vec<Value>], stats: &mut DecodeStats) -> Vec<T> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        match T::from_row(row) {
            Ok(record) => {
                stats.accepted += 1;
                out.push(record);
            }
            Err(e) => stats.reject(e),
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub operators: DecodeStats,
    pub packages: DecodeStats,
    pub options: DecodeStats,
    pub categories: DecodeStats,
    pub relations: DecodeStats,
}

impl CatalogStats {
    pub fn by_kind(&self) -> [(&'static str, &DecodeStats); 5] {
        [
            (Operator::RECORD, &self.operators),
            (Package::RECORD, &self.packages),
            (PackageOption::RECORD, &self.options),
            (Category::RECORD, &self.categories),
            (CategoryRelation::RECORD, &self.relations),
        ]
    }

    pub fn total_rejected(&self) -> u64 {
        self.by_kind().iter().map(|(_, s)| s.rejected).sum()
    }
}

/// All decoded records for one dump, indexed by legacy id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub operators: BTreeMap<i64, Operator>,
    pub packages: BTreeMap<i64, Package>,
    pub options_by_package: AHashMap<i64, Vec<PackageOption>>,
    pub categories: AHashMap<i64, Category>,
    /// Category ids per package, in relation order
    pub package_categories: AHashMap<i64, Vec<i64>>,
    pub stats: CatalogStats,
}

impl Catalog {
    pub fn from_extract(extract: &DumpExtract, config: &ExportConfig) -> Self {
        let tables = &config.tables;
        let mut catalog = Catalog::default();

        for row in extract.rows(&tables.users) {
            let other_role = row.len() == Operator::COLUMNS.len()
                && row[Operator::ROLE_COLUMN].as_text().as_deref()
                    != Some(config.operator_role.as_str());
            if other_role {
                catalog.stats.operators.filtered += 1;
                continue;
            }
            match Operator::from_row(row) {
                Ok(op) => {
                    catalog.stats.operators.accepted += 1;
                    catalog.operators.insert(op.legacy_id, op);
                }
                Err(e) => catalog.stats.operators.reject(e),
            }
        }

        let packages: Vec<Package> =
            decode_rows(extract.rows(&tables.packages), &mut catalog.stats.packages);
        for pkg in packages {
            catalog.packages.insert(pkg.legacy_id, pkg);
        }

        let options: Vec<PackageOption> =
            decode_rows(extract.rows(&tables.options), &mut catalog.stats.options);
        for opt in options {
            catalog
                .options_by_package
                .entry(opt.package_legacy_id)
                .or_default()
                .push(opt);
        }

        let categories: Vec<Category> =
            decode_rows(extract.rows(&tables.categories), &mut catalog.stats.categories);
        for cat in categories {
            catalog.categories.insert(cat.legacy_id, cat);
        }

        let relations: Vec<CategoryRelation> = decode_rows(
            extract.rows(&tables.category_relations),
            &mut catalog.stats.relations,
        );
        for rel in relations {
            catalog
                .package_categories
                .entry(rel.package_legacy_id)
                .or_default()
                .push(rel.category_legacy_id);
        }

        catalog
    }

    pub fn packages_with_options(&self) -> usize {
        self.packages
            .keys()
            .filter(|id| self.options_by_package.get(*id).is_some_and(|o| !o.is_empty()))
            .count()
    }
}
