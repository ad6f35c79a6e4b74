use serde::{Deserialize, Serialize};

/// A namespaced key/value attribute attached to a catalog product or variant.
///
/// The Admin API is loose about `value`: numeric metafields arrive as JSON
/// numbers or as decimal strings, and list metafields arrive either as native
/// JSON arrays or as JSON-encoded strings (`"[\"0.5\",\"0.3\"]"`). The value
/// is kept as a raw [`serde_json::Value`] and decoded field-by-field in
/// `auric-pricing::metafields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metafield {
    /// Server-side metafield ID; absent on values we construct locally.
    #[serde(default)]
    pub id: Option<i64>,
    pub namespace: String,
    pub key: String,
    pub value: serde_json::Value,
    /// Admin API value type, e.g. `number_decimal` or `list.single_line_text_field`.
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
}

impl Metafield {
    /// Convenience constructor for locally built metafields (mostly tests).
    #[must_use]
    pub fn new(namespace: &str, key: &str, value: serde_json::Value) -> Self {
        Self {
            id: None,
            namespace: namespace.to_owned(),
            key: key.to_owned(),
            value,
            value_type: None,
        }
    }

    /// Finds the value for `namespace`/`key` in a metafield slice.
    #[must_use]
    pub fn find<'a>(
        metafields: &'a [Metafield],
        namespace: &str,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        metafields
            .iter()
            .find(|mf| mf.namespace == namespace && mf.key == key)
            .map(|mf| &mf.value)
    }

    /// Finds the full metafield (including its server ID) for `namespace`/`key`.
    #[must_use]
    pub fn find_entry<'a>(
        metafields: &'a [Metafield],
        namespace: &str,
        key: &str,
    ) -> Option<&'a Metafield> {
        metafields
            .iter()
            .find(|mf| mf.namespace == namespace && mf.key == key)
    }
}
