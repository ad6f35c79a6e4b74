//! Wire types for the Admin API responses the updater consumes.

use rust_decimal::Decimal;
use serde::Deserialize;

use auric_core::Metafield;

/// One product as returned by `products.json`, with its metafields attached
/// after the separate per-product fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub variants: Vec<CatalogVariant>,
    /// Not part of the `products.json` payload; populated by
    /// [`crate::CatalogClient::list_priced_products`].
    #[serde(default)]
    pub metafields: Vec<Metafield>,
}

/// A sellable variant. `option1` carries the metal label ("22K Yellow Gold",
/// "Silver", ...) that drives purity resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogVariant {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub option1: Option<String>,
    /// The Admin API serialises prices as decimal strings.
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetafieldsResponse {
    #[serde(default)]
    pub metafields: Vec<Metafield>,
}

/// `themes/{id}/assets.json` envelope for a single asset.
#[derive(Debug, Deserialize)]
pub(crate) struct AssetResponse {
    pub asset: Asset,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Asset {
    /// The asset body; for `config/settings_data.json` this is itself a JSON
    /// document.
    pub value: String,
}

/// Store-wide pricing knobs read from the theme's `settings_data.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSettings {
    pub making_charges_pct: Decimal,
    pub markup_pct: Decimal,
    pub gst_pct: Decimal,
}

impl Default for ThemeSettings {
    /// No making charges, no markup, 3% GST.
    fn default() -> Self {
        Self {
            making_charges_pct: Decimal::ZERO,
            markup_pct: Decimal::ZERO,
            gst_pct: Decimal::new(3, 0),
        }
    }
}
