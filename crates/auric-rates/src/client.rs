//! HTTP client for the spot-price feed (GoldAPI-style REST endpoints).
//!
//! One GET per symbol: `XAU/{currency}` for gold, `XAG/{currency}` for
//! silver. The feed reports per-gram prices via `price_gram_24k` when
//! available, otherwise a per-troy-ounce `price` that we convert. Sterling
//! silver (925) is derived from the pure-silver rate here so downstream code
//! only ever sees the two rates it prices against.

use std::time::Duration;

use reqwest::{Client, Url};
use rust_decimal::Decimal;

use auric_core::RateSnapshot;

use crate::error::RatesError;

const DEFAULT_BASE_URL: &str = "https://www.goldapi.io/api/";

/// Grams per troy ounce, exact to the feed's published precision.
const GRAMS_PER_TROY_OUNCE: Decimal = Decimal::from_parts(311_035, 0, 0, false, 4);

/// Sterling purity applied to the pure-silver per-gram rate.
const STERLING_FACTOR: Decimal = Decimal::from_parts(925, 0, 0, false, 3);

/// Client for the metal spot-price feed.
///
/// Use [`RateFeedClient::new`] for production or
/// [`RateFeedClient::with_base_url`] to point at a mock server in tests.
pub struct RateFeedClient {
    client: Client,
    api_key: String,
    currency: String,
    base_url: Url,
}

impl RateFeedClient {
    /// Creates a client pointed at the production feed.
    ///
    /// # Errors
    ///
    /// Returns [`RatesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, currency: &str, timeout_secs: u64) -> Result<Self, RatesError> {
        Self::with_base_url(api_key, currency, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RatesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RatesError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        currency: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, RatesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("auric/0.1 (price-sync)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| RatesError::InvalidUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            currency: currency.to_owned(),
            base_url,
        })
    }

    /// Fetches the current gold and silver rates as one immutable snapshot.
    ///
    /// Gold is the 24K per-gram rate; silver is the sterling (925) per-gram
    /// rate derived from the pure-silver price.
    ///
    /// # Errors
    ///
    /// - [`RatesError::Http`] on network failure or non-2xx status.
    /// - [`RatesError::MissingPrice`] / [`RatesError::Deserialize`] when the
    ///   response does not carry a usable price.
    /// - [`RatesError::InvalidRate`] when a fetched rate is not strictly
    ///   positive — the caller must abort the run.
    pub async fn current_rates(&self) -> Result<RateSnapshot, RatesError> {
        let gold = self.per_gram_rate("XAU").await?;
        let silver = self.per_gram_rate("XAG").await? * STERLING_FACTOR;

        let snapshot = RateSnapshot {
            gold_rate_per_gram: gold,
            silver_rate_per_gram: silver,
            currency: self.currency.clone(),
        };
        if !snapshot.is_valid() {
            let (symbol, value) = if gold <= Decimal::ZERO {
                ("XAU", gold)
            } else {
                ("XAG", silver)
            };
            return Err(RatesError::InvalidRate { symbol, value });
        }

        tracing::info!(
            gold = %snapshot.gold_rate_per_gram,
            silver = %snapshot.silver_rate_per_gram,
            currency = %snapshot.currency,
            "fetched metal rates"
        );
        Ok(snapshot)
    }

    /// Fetches one symbol and extracts its pure-metal per-gram rate.
    async fn per_gram_rate(&self, symbol: &'static str) -> Result<Decimal, RatesError> {
        let url = self
            .base_url
            .join(&format!("{symbol}/{}", self.currency))
            .map_err(|e| RatesError::InvalidUrl(format!("{symbol}/{}: {e}", self.currency)))?;

        let response = self
            .client
            .get(url.clone())
            .header("x-access-token", &self.api_key)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let body: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| RatesError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        extract_per_gram(&body, symbol)
    }
}

/// Pulls the per-gram price from a feed response body.
///
/// Prefers `price_gram_24k` (already per-gram); falls back to the
/// per-troy-ounce `price` divided by 31.1035.
fn extract_per_gram(body: &serde_json::Value, symbol: &'static str) -> Result<Decimal, RatesError> {
    if let Some(per_gram) = body.get("price_gram_24k").and_then(serde_json::Value::as_f64) {
        return to_decimal(per_gram, symbol);
    }
    if let Some(per_ounce) = body.get("price").and_then(serde_json::Value::as_f64) {
        let per_ounce = to_decimal(per_ounce, symbol)?;
        return Ok(per_ounce / GRAMS_PER_TROY_OUNCE);
    }
    Err(RatesError::MissingPrice { symbol })
}

fn to_decimal(value: f64, symbol: &'static str) -> Result<Decimal, RatesError> {
    Decimal::try_from(value).map_err(|_| RatesError::UnrepresentablePrice { symbol })
}
