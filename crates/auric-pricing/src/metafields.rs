//! Variant-then-product metafield resolution.
//!
//! The precedence is exactly three tiers and must not be collapsed into a
//! plain `variant.or(product)`:
//!
//! 1. variant value, if present and non-blank;
//! 2. product value, if present — even when it decodes to zero;
//! 3. the caller's default.
//!
//! "Blank" at the variant tier means absent, JSON `null`, an empty string,
//! an empty-list encoding (`"[]"` or a native `[]`), or — for the numeric
//! weight field only — a decoded zero. Product-level zeros are accepted.
//!
//! Metafield values arrive in heterogeneous encodings: numbers as JSON
//! numbers or decimal strings, lists as native arrays or JSON-encoded
//! strings. Decode failures never abort a variant; the affected field
//! degrades to its default with a warning.

use rust_decimal::Decimal;
use serde_json::Value;

use auric_core::Metafield;

/// Resolves a numeric metafield through the three-tier fallback.
///
/// `zero_is_blank` opts the variant tier into treating a decoded zero as
/// blank; this applies to the metal weight and nothing else.
#[must_use]
pub fn resolve_decimal(
    variant: &[Metafield],
    product: &[Metafield],
    namespace: &str,
    key: &str,
    default: Decimal,
    zero_is_blank: bool,
) -> Decimal {
    resolve_optional_decimal(variant, product, namespace, key, zero_is_blank).unwrap_or(default)
}

/// Like [`resolve_decimal`] but keeps absence observable: `None` means the
/// field was blank/absent at both tiers (or failed to decode).
#[must_use]
pub fn resolve_optional_decimal(
    variant: &[Metafield],
    product: &[Metafield],
    namespace: &str,
    key: &str,
    zero_is_blank: bool,
) -> Option<Decimal> {
    if let Some(value) = Metafield::find(variant, namespace, key) {
        if !is_blank_scalar(value) {
            match decode_decimal(value) {
                Some(parsed) if zero_is_blank && parsed.is_zero() => {
                    // Variant-level zero counts as blank for this field;
                    // fall through to the product tier.
                }
                Some(parsed) => return Some(parsed),
                None => {
                    tracing::warn!(namespace, key, %value, "undecodable variant metafield");
                    return None;
                }
            }
        }
    }

    let value = Metafield::find(product, namespace, key)?;
    if value.is_null() {
        return None;
    }
    match decode_decimal(value) {
        Some(parsed) => Some(parsed),
        None => {
            tracing::warn!(namespace, key, %value, "undecodable product metafield");
            None
        }
    }
}

/// Resolves a list-of-decimals metafield through the three-tier fallback;
/// the default is the empty list.
#[must_use]
pub fn resolve_decimal_list(
    variant: &[Metafield],
    product: &[Metafield],
    namespace: &str,
    key: &str,
) -> Vec<Decimal> {
    resolve_list(variant, product, namespace, key, decode_decimal_list)
}

/// Resolves a list-of-strings metafield through the three-tier fallback;
/// the default is the empty list.
#[must_use]
pub fn resolve_string_list(
    variant: &[Metafield],
    product: &[Metafield],
    namespace: &str,
    key: &str,
) -> Vec<String> {
    resolve_list(variant, product, namespace, key, decode_string_list)
}

fn resolve_list<T>(
    variant: &[Metafield],
    product: &[Metafield],
    namespace: &str,
    key: &str,
    decode: fn(&Value) -> Option<Vec<T>>,
) -> Vec<T> {
    if let Some(value) = Metafield::find(variant, namespace, key) {
        if !is_blank_list(value) {
            return decode(value).unwrap_or_else(|| {
                tracing::warn!(namespace, key, %value, "undecodable variant list metafield");
                Vec::new()
            });
        }
    }

    if let Some(value) = Metafield::find(product, namespace, key) {
        if !value.is_null() {
            return decode(value).unwrap_or_else(|| {
                tracing::warn!(namespace, key, %value, "undecodable product list metafield");
                Vec::new()
            });
        }
    }

    Vec::new()
}

/// Blankness for scalar fields: null or an empty string.
fn is_blank_scalar(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Blankness for list fields: null, empty string, the literal `"[]"`
/// encoding, or a native empty array.
fn is_blank_list(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed == "[]"
        }
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Decodes a scalar value into a `Decimal`: JSON numbers go through their
/// exact text form; strings are parsed directly.
fn decode_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decodes a list value (native array or JSON-encoded string) into decimals.
/// Any undecodable element fails the whole list.
fn decode_decimal_list(value: &Value) -> Option<Vec<Decimal>> {
    decode_array(value)?
        .iter()
        .map(decode_decimal)
        .collect::<Option<Vec<_>>>()
}

/// Decodes a list value into strings; non-string elements are rendered
/// through their JSON text form (stone names are occasionally stored as
/// bare numbers).
fn decode_string_list(value: &Value) -> Option<Vec<String>> {
    Some(
        decode_array(value)?
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Normalizes the two list encodings into one owned array.
fn decode_array(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NS: &str = "custom";

    fn dec(s: &str) -> Decimal {
        s.parse().expect("test literal should parse")
    }

    fn mf(key: &str, value: Value) -> Metafield {
        Metafield::new(NS, key, value)
    }

    #[test]
    fn variant_value_wins_over_product() {
        let variant = vec![mf("metal_weight", json!("5.0"))];
        let product = vec![mf("metal_weight", json!("9.0"))];
        let resolved = resolve_decimal(&variant, &product, NS, "metal_weight", Decimal::ZERO, true);
        assert_eq!(resolved, dec("5.0"));
    }

    #[test]
    fn blank_variant_falls_back_to_product() {
        let variant = vec![mf("metal_weight", json!(""))];
        let product = vec![mf("metal_weight", json!("9.0"))];
        let resolved = resolve_decimal(&variant, &product, NS, "metal_weight", Decimal::ZERO, true);
        assert_eq!(resolved, dec("9.0"));
    }

    #[test]
    fn variant_zero_weight_falls_back_to_product() {
        let variant = vec![mf("metal_weight", json!("0"))];
        let product = vec![mf("metal_weight", json!("3.25"))];
        let resolved = resolve_decimal(&variant, &product, NS, "metal_weight", Decimal::ZERO, true);
        assert_eq!(resolved, dec("3.25"));
    }

    #[test]
    fn variant_zero_is_kept_when_zero_is_not_blank() {
        let variant = vec![mf("stone_price", json!("0"))];
        let product = vec![mf("stone_price", json!("450"))];
        let resolved = resolve_decimal(&variant, &product, NS, "stone_price", dec("-1"), false);
        assert_eq!(resolved, Decimal::ZERO);
    }

    #[test]
    fn product_zero_is_accepted() {
        let variant: Vec<Metafield> = Vec::new();
        let product = vec![mf("metal_weight", json!("0"))];
        let resolved = resolve_decimal(&variant, &product, NS, "metal_weight", dec("7"), true);
        assert_eq!(resolved, Decimal::ZERO);
    }

    #[test]
    fn absent_everywhere_returns_default() {
        let resolved = resolve_decimal(&[], &[], NS, "metal_weight", dec("1.5"), true);
        assert_eq!(resolved, dec("1.5"));
    }

    #[test]
    fn json_number_value_decodes() {
        let variant = vec![mf("metal_weight", json!(4.25))];
        let resolved = resolve_decimal(&variant, &[], NS, "metal_weight", Decimal::ZERO, true);
        assert_eq!(resolved, dec("4.25"));
    }

    #[test]
    fn non_numeric_variant_string_degrades_to_default() {
        let variant = vec![mf("metal_weight", json!("heavy"))];
        let product = vec![mf("metal_weight", json!("9.0"))];
        // Decode failure degrades to the default; it does not fall through.
        let resolved = resolve_decimal(&variant, &product, NS, "metal_weight", Decimal::ZERO, true);
        assert_eq!(resolved, Decimal::ZERO);
    }

    #[test]
    fn optional_decimal_reports_absence() {
        assert!(resolve_optional_decimal(&[], &[], NS, "stone_price", false).is_none());
        let product = vec![mf("stone_price", json!("450"))];
        assert_eq!(
            resolve_optional_decimal(&[], &product, NS, "stone_price", false),
            Some(dec("450"))
        );
    }

    #[test]
    fn encoded_string_list_decodes() {
        let variant = vec![mf("stone_carats", json!("[\"0.5\",\"0.3\"]"))];
        let resolved = resolve_decimal_list(&variant, &[], NS, "stone_carats");
        assert_eq!(resolved, vec![dec("0.5"), dec("0.3")]);
    }

    #[test]
    fn native_array_list_decodes() {
        let variant = vec![mf("stone_carats", json!([0.5, 0.3]))];
        let resolved = resolve_decimal_list(&variant, &[], NS, "stone_carats");
        assert_eq!(resolved, vec![dec("0.5"), dec("0.3")]);
    }

    #[test]
    fn empty_list_encoding_on_variant_falls_back_to_product() {
        let variant = vec![mf("stone_carats", json!("[]"))];
        let product = vec![mf("stone_carats", json!("[\"0.25\"]"))];
        let resolved = resolve_decimal_list(&variant, &product, NS, "stone_carats");
        assert_eq!(resolved, vec![dec("0.25")]);
    }

    #[test]
    fn native_empty_array_on_variant_falls_back_to_product() {
        let variant = vec![mf("stone_carats", json!([]))];
        let product = vec![mf("stone_carats", json!([1.0]))];
        let resolved = resolve_decimal_list(&variant, &product, NS, "stone_carats");
        assert_eq!(resolved, vec![dec("1")]);
    }

    #[test]
    fn malformed_list_encoding_degrades_to_empty() {
        let variant = vec![mf("stone_carats", json!("[0.5,"))];
        let resolved = resolve_decimal_list(&variant, &[], NS, "stone_carats");
        assert!(resolved.is_empty());
    }

    #[test]
    fn undecodable_element_degrades_whole_list() {
        let variant = vec![mf("stone_carats", json!(["0.5", "tiny"]))];
        let resolved = resolve_decimal_list(&variant, &[], NS, "stone_carats");
        assert!(resolved.is_empty());
    }

    #[test]
    fn string_list_resolves_with_mixed_elements() {
        let variant = vec![mf("stone_types", json!(["Diamond", 7]))];
        let resolved = resolve_string_list(&variant, &[], NS, "stone_types");
        assert_eq!(resolved, vec!["Diamond".to_owned(), "7".to_owned()]);
    }
}
