use rust_decimal::Decimal;
use serde::Serialize;

use crate::metal::Metal;

/// Default GST percentage applied after markup.
pub const DEFAULT_GST_PCT: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Charge percentages sourced from theme settings (or CLI overrides).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingSettings {
    /// Applied to the gold material cost only; silver carries no making charges.
    pub making_charges_pct: Decimal,
    /// Applied to the pre-tax subtotal.
    pub markup_pct: Decimal,
    /// Applied after markup, before the single final rounding.
    pub gst_pct: Decimal,
}

impl PricingSettings {
    #[must_use]
    pub fn new(making_charges_pct: Decimal, markup_pct: Decimal) -> Self {
        Self {
            making_charges_pct,
            markup_pct,
            gst_pct: DEFAULT_GST_PCT,
        }
    }

    #[must_use]
    pub fn with_gst_pct(mut self, gst_pct: Decimal) -> Self {
        self.gst_pct = gst_pct;
        self
    }
}

/// One priced stone on a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoneLineItem {
    /// Display name; synthesized as `stone_<n>` when the types list is short.
    pub kind: String,
    pub carat: Decimal,
    pub price_per_carat: Decimal,
    pub cost: Decimal,
}

/// Metal-side detail carried for logging and audit, not for the update decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetalDetail {
    pub metal: Metal,
    pub display_name: String,
    pub weight: Decimal,
    pub purity_factor: Decimal,
    pub base_rate: Decimal,
    /// `base_rate × purity_factor`, rounded for display.
    pub effective_rate: Decimal,
}

/// Full cost breakdown for one variant at one rate snapshot.
///
/// Every component field is independently rounded to whole currency units for
/// display and audit. `total_price` is the rounding of the *unrounded*
/// base+GST sum, so the displayed components do not always sum to the
/// displayed total. That mismatch is contractual — the storefront widget
/// computes the same way — and must not be reconciled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub metal_cost: Decimal,
    pub stone_cost: Decimal,
    pub making_charges: Decimal,
    /// Policy constant, always zero.
    pub laser_cost: Decimal,
    /// Policy constant, always zero.
    pub packaging_cost: Decimal,
    pub markup_cost: Decimal,
    pub gst_cost: Decimal,
    pub total_price: Decimal,
    pub metal: MetalDetail,
    pub stones: Vec<StoneLineItem>,
}
