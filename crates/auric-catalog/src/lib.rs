//! Shopify Admin API client for the price-sync pipeline.
//!
//! Covers the REST surface the updater needs: paginated product listing
//! (filtered to products carrying the rate-marker metafields), metafield
//! reads and upserts, variant price writes, and theme settings assets.

pub mod client;
pub mod error;
pub mod pagination;
mod retry;
pub mod types;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use types::{CatalogProduct, CatalogVariant, ThemeSettings};
