//! The pricing engine: metal resolution, cost composition, and metafield
//! attribute resolution.
//!
//! Everything here is pure and synchronous. The arithmetic is `rust_decimal`
//! end to end so breakdowns are exact and reproducible; rounding semantics
//! must stay bit-compatible with the storefront pricing widget (half-to-even,
//! applied once per displayed field — see [`calculator`]).

pub mod calculator;
pub mod metafields;
pub mod metal;
pub mod types;

pub use calculator::calculate_price;
pub use metal::{resolve_metal, Metal, MetalInfo};
pub use types::{MetalDetail, PriceBreakdown, PricingSettings, StoneLineItem};
