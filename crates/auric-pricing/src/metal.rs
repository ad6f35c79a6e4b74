//! Metal and purity resolution from free-text variant option labels.
//!
//! Labels come straight from the catalog's first option value and are not
//! normalized upstream. Observed shapes: `"14K Yellow Gold"`, `"18k rose gold"`,
//! `"22K Gold"`, `"SILVER925"`, `"Silver 925"`. Anything else resolves to
//! `None` — absence is the only failure signal, this function never panics.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

/// `<digits>K [Yellow|White|Rose]? Gold`, color optional.
static GOLD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)K\s*(Yellow|White|Rose)?\s*Gold").expect("gold label pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
}

impl std::fmt::Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metal::Gold => write!(f, "gold"),
            Metal::Silver => write!(f, "silver"),
        }
    }
}

/// Resolved metal type and purity for one variant option label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetalInfo {
    pub metal: Metal,
    /// Purity label as shown to merchandising: `"925"` or `"14kt"` etc.
    pub purity_label: String,
    /// Fractional purity in `0..=1`, exact decimal.
    pub purity_factor: Decimal,
    pub display_name: String,
}

/// Parses a variant option label into a [`MetalInfo`].
///
/// Rules, in order:
/// 1. A label containing `SILVER` (any case) is sterling: purity `"925"`,
///    factor `0.925`.
/// 2. A `<digits>K ... Gold` label maps the karat digits through a fixed
///    purity table; the color defaults to `Yellow`. Karat values outside the
///    table fall back to the 14K factor (`0.585`) — a long-standing storefront
///    behavior that must be preserved, not rejected.
/// 3. Everything else (empty label, unrecognized text) is `None`.
#[must_use]
pub fn resolve_metal(label: &str) -> Option<MetalInfo> {
    if label.trim().is_empty() {
        return None;
    }

    if label.to_uppercase().contains("SILVER") {
        return Some(MetalInfo {
            metal: Metal::Silver,
            purity_label: "925".to_owned(),
            purity_factor: Decimal::new(925, 3),
            display_name: "Silver 925".to_owned(),
        });
    }

    let caps = GOLD_LABEL.captures(label)?;
    let karat = caps.get(1).map_or("", |m| m.as_str());
    let color = caps.get(2).map_or("Yellow", |m| m.as_str());

    let (purity_label, purity_factor) = karat_purity(karat);
    Some(MetalInfo {
        metal: Metal::Gold,
        purity_label: purity_label.to_owned(),
        purity_factor,
        display_name: format!("{color} Gold {purity_label}"),
    })
}

/// Fixed karat-to-purity table. Unmapped karat digits (including digit
/// strings that do not parse) fall back to the 14K factor.
fn karat_purity(karat: &str) -> (&'static str, Decimal) {
    match karat.parse::<u32>() {
        Ok(24) => ("24kt", Decimal::ONE),
        Ok(22) => ("22kt", Decimal::new(916, 3)),
        Ok(18) => ("18kt", Decimal::new(750, 3)),
        Ok(10) => ("10kt", Decimal::new(417, 3)),
        Ok(9) => ("9kt", Decimal::new(375, 3)),
        // 14K is both a real entry and the documented fallback.
        _ => ("14kt", Decimal::new(585, 3)),
    }
}
