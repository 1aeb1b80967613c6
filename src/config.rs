//! YAML configuration for the export command.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. Command-line flags override the file.

use crate::decimal::Decimal;
use crate::pricing::{PriceConverter, RoundingMode};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Names of the source tables in the dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub users: String,
    pub packages: String,
    pub options: String,
    pub categories: String,
    pub category_relations: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            packages: "tour_packages".to_string(),
            options: "tour_package_options".to_string(),
            categories: "tour_package_categories".to_string(),
            category_relations: "tour_package_category_relations".to_string(),
        }
    }
}

impl TableNames {
    pub fn all(&self) -> [&str; 5] {
        [
            self.users.as_str(),
            self.packages.as_str(),
            self.options.as_str(),
            self.categories.as_str(),
            self.category_relations.as_str(),
        ]
    }
}

/// Price normalization settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Source-to-target exchange rate
    pub fx_rate: Decimal,
    /// Rounding step in the target currency
    pub step: i64,
    pub rounding: RoundingMode,
    /// Target currency code written to the output
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fx_rate: Decimal::from_i64(1300),
            step: 5000,
            rounding: RoundingMode::Ceil,
            currency: "RWF".to_string(),
        }
    }
}

impl PricingConfig {
    pub fn converter(&self) -> PriceConverter {
        PriceConverter::new(self.fx_rate, self.step, self.rounding)
    }
}

/// Output file names, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_file: String,
    pub csv_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_file: "etike_tours_normalized.json".to_string(),
            csv_file: "etike_tours_normalized.csv".to_string(),
        }
    }
}

/// Complete YAML configuration for the export command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Only users with this role become operators
    pub operator_role: String,
    pub tables: TableNames,
    pub pricing: PricingConfig,
    pub output: OutputConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            operator_role: "tour_operator".to_string(),
            tables: TableNames::default(),
            pricing: PricingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: ExportConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }
}
