//! Normalized package rows assembled from a decoded [`Catalog`].

use crate::config::PricingConfig;
use crate::decimal::Decimal;
use crate::html::strip_html;
use crate::records::{Catalog, PackageOption};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionExport {
    pub name: String,
    pub description: Option<String>,
    pub price_usd: Option<String>,
    pub price_rwf: Option<i64>,
}

/// One package with its seller, categories and converted prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageExport {
    pub package_legacy_id: i64,
    pub slug: String,
    pub name: String,
    pub status: Option<String>,
    pub seller_legacy_id: i64,
    pub seller_name: Option<String>,
    pub seller_email: Option<String>,
    pub seller_phone: Option<String>,
    pub seller_profile_pic: Option<String>,
    pub seller_bio: Option<String>,
    pub categories: Vec<CategoryRef>,
    pub cover_image: Option<String>,
    pub base_price_usd: Option<String>,
    pub currency: String,
    pub fx_rate_usd_to_rwf: f64,
    pub rounding_step_rwf: i64,
    pub rounding_mode: String,
    pub price_points_rwf: Vec<i64>,
    pub min_price_rwf: i64,
    pub max_price_rwf: i64,
    pub description_clean: String,
    pub description_raw: String,
    pub options: Vec<OptionExport>,
}

impl PackageExport {
    /// Name of the first category, or empty.
    pub fn primary_category(&self) -> &str {
        self.categories.first().map_or("", |c| c.name.as_str())
    }
}

/// Build one export row per package, ordered by legacy id.
///
/// Price points come from the package's option prices when any option has
/// a price, otherwise from the base price.
pub fn build_exports(catalog: &Catalog, pricing: &PricingConfig) -> Vec<PackageExport> {
    let converter = pricing.converter();
    let no_options: Vec<PackageOption> = Vec::new();

    catalog
        .packages
        .values()
        .map(|pkg| {
            let seller = catalog.operators.get(&pkg.seller_legacy_id);

            let mut options: Vec<&PackageOption> = catalog
                .options_by_package
                .get(&pkg.legacy_id)
                .unwrap_or(&no_options)
                .iter()
                .collect();
            options.sort_by_key(|o| o.legacy_id);

            let categories = catalog
                .package_categories
                .get(&pkg.legacy_id)
                .into_iter()
                .flatten()
                .filter_map(|id| catalog.categories.get(id))
                .map(|c| CategoryRef {
                    slug: c.slug.clone(),
                    name: c.name.clone(),
                })
                .collect();

            let mut amounts: Vec<Decimal> = options.iter().filter_map(|o| o.price).collect();
            if amounts.is_empty() {
                amounts.extend(pkg.base_price);
            }
            let price_points = converter.price_points(amounts);

            let description_raw = pkg.description_raw.clone().unwrap_or_default();
            let description_clean = if description_raw.is_empty() {
                String::new()
            } else {
                strip_html(&description_raw)
            };

            PackageExport {
                package_legacy_id: pkg.legacy_id,
                slug: pkg.slug.clone(),
                name: pkg.name.clone(),
                status: pkg.status.clone(),
                seller_legacy_id: pkg.seller_legacy_id,
                seller_name: seller.map(|s| s.name.clone()),
                seller_email: seller.and_then(|s| s.email.clone()),
                seller_phone: seller.and_then(|s| s.phone.clone()),
                seller_profile_pic: seller.and_then(|s| s.profile_pic.clone()),
                seller_bio: seller.and_then(|s| s.bio.clone()),
                categories,
                cover_image: pkg.cover_image.clone(),
                base_price_usd: pkg.base_price.map(|p| p.to_string()),
                currency: pricing.currency.clone(),
                fx_rate_usd_to_rwf: pricing.fx_rate.to_f64(),
                rounding_step_rwf: pricing.step,
                rounding_mode: pricing.rounding.to_string(),
                min_price_rwf: price_points.first().copied().unwrap_or(0),
                max_price_rwf: price_points.last().copied().unwrap_or(0),
                price_points_rwf: price_points,
                description_clean,
                description_raw,
                options: options
                    .into_iter()
                    .map(|o| OptionExport {
                        name: o.name.clone(),
                        description: o.description.clone(),
                        price_usd: o.price.map(|p| p.to_string()),
                        price_rwf: o.price.and_then(|p| converter.convert(p)),
                    })
                    .collect(),
            }
        })
        .collect()
}
