//! Metafield namespaces and keys shared between the catalog client, the
//! attribute resolver, and the update orchestrator.
//!
//! Products carrying both rate markers under [`RATE_NAMESPACE`] are the
//! candidate set for a price-update run; the rate values themselves are
//! rewritten at the start of each product's processing. Variant-level pricing
//! inputs live under [`ATTR_NAMESPACE`].

/// Namespace for the per-product rate marker metafields.
pub const RATE_NAMESPACE: &str = "pricing";
/// 24K gold rate per gram, `number_decimal`.
pub const GOLD_RATE_KEY: &str = "gold_rate";
/// Sterling (925) silver rate per gram, `number_decimal`.
pub const SILVER_RATE_KEY: &str = "silver_rate";

/// Namespace for variant pricing attributes (with product-level fallbacks).
pub const ATTR_NAMESPACE: &str = "custom";
/// Metal weight in grams, `number_decimal`.
pub const METAL_WEIGHT_KEY: &str = "metal_weight";
/// Stone display names, list-encoded.
pub const STONE_TYPES_KEY: &str = "stone_types";
/// Stone weights in carats, list-encoded; authoritative length driver.
pub const STONE_CARATS_KEY: &str = "stone_carats";
/// Per-carat stone prices, list-encoded, index-aligned with carats.
pub const STONE_PRICES_KEY: &str = "stone_prices_per_carat";
/// Previously recorded total stone cost; used only for the
/// stone-price-change statistic, never for the update decision.
pub const STONE_PRICE_KEY: &str = "stone_price";

/// Admin API metafield type used for rate writes.
pub const NUMBER_DECIMAL_TYPE: &str = "number_decimal";
