use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by the metal rate feed client.
///
/// Any of these aborts the whole run upstream: the orchestrator never prices
/// anything against a rate it could not validate.
#[derive(Debug, Error)]
pub enum RatesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be parsed as JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL (or a URL derived from it) is not valid.
    #[error("invalid rate feed URL: {0}")]
    InvalidUrl(String),

    /// The feed returned neither `price_gram_24k` nor `price` for a symbol.
    #[error("rate feed response for {symbol} is missing both price_gram_24k and price")]
    MissingPrice { symbol: &'static str },

    /// The feed returned a price that is not representable or not positive.
    #[error("invalid {symbol} rate from feed: {value}")]
    InvalidRate { symbol: &'static str, value: Decimal },

    /// A floating-point price could not be converted to an exact decimal.
    #[error("unrepresentable {symbol} price in feed response")]
    UnrepresentablePrice { symbol: &'static str },
}
