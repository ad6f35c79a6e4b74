//! Deterministic cost composition for one variant.
//!
//! The composition order is fixed: metal → stones → making charges → laser →
//! packaging → markup → GST → final rounding. All intermediate math is exact
//! `Decimal`; each displayed component is rounded half-to-even to whole
//! currency units, and the total is rounded once from the unrounded base+GST
//! sum. This must stay bit-compatible with the storefront pricing widget, so
//! do not change rounding placement or strategy.

use rust_decimal::{Decimal, RoundingStrategy};

use auric_core::RateSnapshot;

use crate::metal::{resolve_metal, Metal};
use crate::types::{MetalDetail, PriceBreakdown, PricingSettings, StoneLineItem};

/// Rounds to whole currency units, half-to-even.
fn round_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

fn pct(value: Decimal, percentage: Decimal) -> Decimal {
    value * percentage / Decimal::ONE_HUNDRED
}

/// Computes the price breakdown for one variant, or `None` when the option
/// label does not resolve to a known metal (the caller must skip the variant).
///
/// Arithmetic edge cases — zero weight, empty stone lists — are not errors:
/// they produce a valid zero-cost breakdown. The stone lists are index-aligned;
/// carats and per-carat prices drive inclusion, and `stone_types` may be
/// shorter without gating anything (missing names are synthesized).
///
/// Pure function: identical inputs always yield identical breakdowns.
#[must_use]
pub fn calculate_price(
    settings: &PricingSettings,
    metal_weight: Decimal,
    stone_types: &[String],
    stone_carats: &[Decimal],
    stone_prices_per_carat: &[Decimal],
    option_label: &str,
    rates: &RateSnapshot,
) -> Option<PriceBreakdown> {
    let info = resolve_metal(option_label)?;

    let base_rate = match info.metal {
        Metal::Gold => rates.gold_rate_per_gram,
        Metal::Silver => rates.silver_rate_per_gram,
    };
    let effective_rate = base_rate * info.purity_factor;
    let metal_cost = metal_weight * effective_rate;

    // Making charges are a percentage of the gold material cost and apply to
    // gold only; silver pieces carry none. The asymmetry is intentional.
    let making_charges = match info.metal {
        Metal::Gold => {
            let gold_cost = metal_weight * info.purity_factor * rates.gold_rate_per_gram;
            pct(gold_cost, settings.making_charges_pct)
        }
        Metal::Silver => Decimal::ZERO,
    };

    let stones = stone_line_items(stone_types, stone_carats, stone_prices_per_carat);
    let stone_cost: Decimal = stones.iter().map(|s| s.cost).sum();

    let laser_cost = Decimal::ZERO;
    let packaging_cost = Decimal::ZERO;

    let subtotal = metal_cost + stone_cost + making_charges + laser_cost + packaging_cost;
    let markup_cost = pct(subtotal, settings.markup_pct);
    let base_price = subtotal + markup_cost;
    let gst_cost = pct(base_price, settings.gst_pct);

    // The single final rounding, applied to the unrounded sum. The component
    // fields below are rounded independently and are not reconciled to it.
    let total_price = round_unit(base_price + gst_cost);

    Some(PriceBreakdown {
        metal_cost: round_unit(metal_cost),
        stone_cost: round_unit(stone_cost),
        making_charges: round_unit(making_charges),
        laser_cost: round_unit(laser_cost),
        packaging_cost: round_unit(packaging_cost),
        markup_cost: round_unit(markup_cost),
        gst_cost: round_unit(gst_cost),
        total_price,
        metal: MetalDetail {
            metal: info.metal,
            display_name: info.display_name,
            weight: metal_weight,
            purity_factor: info.purity_factor,
            base_rate,
            effective_rate: round_unit(effective_rate),
        },
        stones,
    })
}

/// Builds the stone line items over `0..max(len(carats), len(prices))`.
///
/// An entry contributes only when both its carat and price exist and are
/// non-zero. The types list never gates inclusion; a missing name becomes
/// `stone_<n>` (1-based).
fn stone_line_items(
    stone_types: &[String],
    stone_carats: &[Decimal],
    stone_prices_per_carat: &[Decimal],
) -> Vec<StoneLineItem> {
    let count = stone_carats.len().max(stone_prices_per_carat.len());
    let mut items = Vec::new();

    for i in 0..count {
        let (Some(&carat), Some(&price)) = (stone_carats.get(i), stone_prices_per_carat.get(i))
        else {
            continue;
        };
        if carat.is_zero() || price.is_zero() {
            continue;
        }
        let kind = stone_types
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("stone_{}", i + 1));
        items.push(StoneLineItem {
            kind,
            carat,
            price_per_carat: price,
            cost: carat * price,
        });
    }

    items
}
