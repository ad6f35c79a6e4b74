use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;

use auric_core::keys::{GOLD_RATE_KEY, RATE_NAMESPACE, SILVER_RATE_KEY};
use auric_core::{AppConfig, Metafield, RateSnapshot};

use crate::error::CatalogError;
use crate::pagination::next_page_cursor;
use crate::retry::retry_with_backoff;
use crate::types::{AssetResponse, CatalogProduct, MetafieldsResponse, ProductsResponse, ThemeSettings};

const API_VERSION: &str = "2024-01";

/// Theme asset holding the store-wide pricing settings.
const SETTINGS_ASSET_KEY: &str = "config/settings_data.json";

/// Page cap to break cursor cycles.
const MAX_PAGES: usize = 200;

/// Authenticated client for the Shopify Admin REST API.
///
/// Transient failures (429, network errors) are retried with exponential
/// backoff per the configured retry policy; 404 and other non-2xx statuses
/// surface immediately as typed errors.
pub struct CatalogClient {
    client: Client,
    /// Admin API base, e.g. `https://shop.myshopify.com/admin/api/2024-01`.
    base_url: String,
    shop_host: String,
    access_token: String,
    page_limit: u32,
    inter_request_delay_ms: u64,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl CatalogClient {
    /// Creates a client pointed at the configured store's Admin API.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidShopUrl`] when the configured shop URL has no
    /// host, or [`CatalogError::Http`] when the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, CatalogError> {
        let host = shop_host(&config.shop_url);
        if host.is_empty() {
            return Err(CatalogError::InvalidShopUrl {
                shop_url: config.shop_url.clone(),
                reason: "no host".to_owned(),
            });
        }
        let base_url = format!("https://{host}/admin/api/{API_VERSION}");
        Self::build(config, host, base_url)
    }

    /// Creates a client whose Admin API base is `base_url` (for testing
    /// against wiremock).
    ///
    /// # Errors
    ///
    /// [`CatalogError::Http`] when the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, CatalogError> {
        let host = shop_host(&config.shop_url);
        let base_url = base_url.trim_end_matches('/').to_owned();
        Self::build(config, host, base_url)
    }

    fn build(config: &AppConfig, shop_host: String, base_url: String) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            shop_host,
            access_token: config.access_token.clone(),
            page_limit: config.page_limit,
            inter_request_delay_ms: config.inter_request_delay_ms,
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        })
    }

    /// Fetches every product carrying both rate-marker metafields
    /// (`pricing.gold_rate` and `pricing.silver_rate`), with each product's
    /// metafields attached.
    ///
    /// Pages through `products.json` via `Link`-header cursors, sleeping the
    /// configured delay between pages, then fetches metafields per product to
    /// apply the marker filter.
    ///
    /// # Errors
    ///
    /// Propagates any request failure after retries, and
    /// [`CatalogError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn list_priced_products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        let mut priced: Vec<CatalogProduct> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(CatalogError::PaginationLimit {
                    shop: self.shop_host.clone(),
                    max_pages: MAX_PAGES,
                });
            }
            if page_count > 1 && self.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.inter_request_delay_ms)).await;
            }

            let (page, link_header) = self.fetch_products_page(cursor.as_deref()).await?;
            let fetched = page.products.len();

            for mut product in page.products {
                let metafields = self.product_metafields(product.id).await?;
                let has_gold = Metafield::find(&metafields, RATE_NAMESPACE, GOLD_RATE_KEY).is_some();
                let has_silver =
                    Metafield::find(&metafields, RATE_NAMESPACE, SILVER_RATE_KEY).is_some();
                if has_gold && has_silver {
                    product.metafields = metafields;
                    priced.push(product);
                }
            }

            tracing::debug!(page = page_count, fetched, priced = priced.len(), "listed products page");

            cursor = next_page_cursor(link_header.as_deref());
            if cursor.is_none() {
                break;
            }
        }

        tracing::info!(products = priced.len(), "found products with rate markers");
        Ok(priced)
    }

    /// One page of `products.json` plus the raw `Link` header.
    async fn fetch_products_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<(ProductsResponse, Option<String>), CatalogError> {
        // Cursors are base64url-encoded by the Admin API and safe to splice.
        let url = match cursor {
            Some(cursor) => format!(
                "{}/products.json?limit={}&page_info={cursor}",
                self.base_url, self.page_limit
            ),
            None => format!("{}/products.json?limit={}", self.base_url, self.page_limit),
        };

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.get(&url).send().await?;
                let response = self.checked(response, &url).await?;
                let link_header = response
                    .headers()
                    .get(reqwest::header::LINK)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                let page = parse_body::<ProductsResponse>(response, &url).await?;
                Ok((page, link_header))
            }
        })
        .await
    }

    /// All metafields attached to a product.
    ///
    /// # Errors
    ///
    /// Propagates any request failure after retries.
    pub async fn product_metafields(&self, product_id: i64) -> Result<Vec<Metafield>, CatalogError> {
        let url = format!("{}/products/{product_id}/metafields.json", self.base_url);
        self.fetch_metafields(&url).await
    }

    /// All metafields attached to a variant.
    ///
    /// # Errors
    ///
    /// Propagates any request failure after retries.
    pub async fn variant_metafields(&self, variant_id: i64) -> Result<Vec<Metafield>, CatalogError> {
        let url = format!("{}/variants/{variant_id}/metafields.json", self.base_url);
        self.fetch_metafields(&url).await
    }

    async fn fetch_metafields(&self, url: &str) -> Result<Vec<Metafield>, CatalogError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.to_owned();
            async move {
                let response = self.get(&url).send().await?;
                let response = self.checked(response, &url).await?;
                let parsed = parse_body::<MetafieldsResponse>(response, &url).await?;
                Ok(parsed.metafields)
            }
        })
        .await
    }

    /// Sets a variant's price. The Admin API carries prices as decimal
    /// strings, which is exactly how `Decimal` serialises here.
    ///
    /// # Errors
    ///
    /// Propagates any request failure after retries.
    pub async fn update_variant_price(
        &self,
        variant_id: i64,
        price: Decimal,
    ) -> Result<(), CatalogError> {
        let url = format!("{}/variants/{variant_id}.json", self.base_url);
        let body = json!({ "variant": { "id": variant_id, "price": price } });

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let body = body.clone();
            async move {
                let response = self.put(&url).json(&body).send().await?;
                self.checked(response, &url).await?;
                Ok(())
            }
        })
        .await
    }

    /// Creates or updates a product metafield.
    ///
    /// Re-fetches the product's metafields to decide between PUT (existing
    /// entry by server ID) and POST (new entry); the caller's copy may be
    /// stale by the time a run writes back.
    ///
    /// # Errors
    ///
    /// Propagates any request failure after retries.
    pub async fn upsert_product_metafield(
        &self,
        product_id: i64,
        namespace: &str,
        key: &str,
        value: &str,
        value_type: &str,
    ) -> Result<(), CatalogError> {
        let existing = self.product_metafields(product_id).await?;
        let existing_id = Metafield::find_entry(&existing, namespace, key).and_then(|mf| mf.id);

        let (url, body, is_update) = match existing_id {
            Some(id) => (
                format!("{}/products/{product_id}/metafields/{id}.json", self.base_url),
                json!({ "metafield": { "id": id, "value": value, "type": value_type } }),
                true,
            ),
            None => (
                format!("{}/products/{product_id}/metafields.json", self.base_url),
                json!({ "metafield": {
                    "namespace": namespace,
                    "key": key,
                    "value": value,
                    "type": value_type,
                } }),
                false,
            ),
        };

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let body = body.clone();
            async move {
                let request = if is_update {
                    self.put(&url)
                } else {
                    self.post(&url)
                };
                let response = request.json(&body).send().await?;
                self.checked(response, &url).await?;
                Ok(())
            }
        })
        .await
    }

    /// Reads the pricing knobs out of the theme's `settings_data.json`.
    ///
    /// Individually missing or malformed settings fall back to their
    /// defaults (0% making charges, 0% markup, 3% GST).
    ///
    /// # Errors
    ///
    /// Propagates any request failure after retries, or
    /// [`CatalogError::Deserialize`] when the asset body is not JSON.
    pub async fn theme_settings(&self, theme_id: &str) -> Result<ThemeSettings, CatalogError> {
        let settings = self.fetch_settings_asset(theme_id).await?;
        let current = settings.get("current").cloned().unwrap_or(json!({}));
        let defaults = ThemeSettings::default();

        let settings = ThemeSettings {
            making_charges_pct: settings_decimal(
                &current,
                "making_charges",
                defaults.making_charges_pct,
            ),
            markup_pct: settings_decimal(&current, "markup_percentage", defaults.markup_pct),
            gst_pct: settings_decimal(&current, "gst_percentage", defaults.gst_pct),
        };
        tracing::info!(
            making_charges_pct = %settings.making_charges_pct,
            markup_pct = %settings.markup_pct,
            gst_pct = %settings.gst_pct,
            "fetched theme settings"
        );
        Ok(settings)
    }

    /// Writes the fresh gold and silver rates into the theme's
    /// `settings_data.json` via read-modify-write, leaving every other
    /// setting untouched.
    ///
    /// # Errors
    ///
    /// Propagates any request failure after retries, or
    /// [`CatalogError::Deserialize`] when the current asset body is not JSON.
    pub async fn update_theme_settings(
        &self,
        theme_id: &str,
        rates: &RateSnapshot,
    ) -> Result<(), CatalogError> {
        let mut settings = self.fetch_settings_asset(theme_id).await?;

        let current = settings
            .as_object_mut()
            .and_then(|root| {
                root.entry("current")
                    .or_insert_with(|| json!({}))
                    .as_object_mut()
            })
            .ok_or_else(|| CatalogError::Deserialize {
                context: format!("settings_data.json for theme {theme_id}"),
                source: serde::de::Error::custom("settings document is not a JSON object"),
            })?;
        current.insert("gold_rate".to_owned(), json_number(rates.gold_rate_per_gram));
        current.insert(
            "silver_rate".to_owned(),
            json_number(rates.silver_rate_per_gram),
        );

        let url = format!("{}/themes/{theme_id}/assets.json", self.base_url);
        let body = json!({ "asset": {
            "key": SETTINGS_ASSET_KEY,
            "value": settings.to_string(),
        } });

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let body = body.clone();
            async move {
                let response = self.put(&url).json(&body).send().await?;
                self.checked(response, &url).await?;
                Ok(())
            }
        })
        .await?;

        tracing::info!(
            theme_id,
            gold = %rates.gold_rate_per_gram,
            silver = %rates.silver_rate_per_gram,
            "updated theme rates"
        );
        Ok(())
    }

    /// Fetches and parses the `settings_data.json` asset body.
    async fn fetch_settings_asset(&self, theme_id: &str) -> Result<serde_json::Value, CatalogError> {
        let url = format!("{}/themes/{theme_id}/assets.json", self.base_url);

        let asset = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .get(&url)
                    .query(&[("asset[key]", SETTINGS_ASSET_KEY)])
                    .send()
                    .await?;
                let response = self.checked(response, &url).await?;
                parse_body::<AssetResponse>(response, &url).await
            }
        })
        .await?;

        serde_json::from_str(&asset.asset.value).map_err(|e| CatalogError::Deserialize {
            context: format!("settings_data.json for theme {theme_id}"),
            source: e,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("X-Shopify-Access-Token", &self.access_token)
    }

    fn put(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .put(url)
            .header("X-Shopify-Access-Token", &self.access_token)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("X-Shopify-Access-Token", &self.access_token)
    }

    /// Maps non-2xx statuses to typed errors.
    async fn checked(&self, response: Response, url: &str) -> Result<Response, CatalogError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(CatalogError::RateLimited {
                shop: self.shop_host.clone(),
                retry_after_secs,
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                url: url.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response)
    }
}

async fn parse_body<T: serde::de::DeserializeOwned>(
    response: Response,
    url: &str,
) -> Result<T, CatalogError> {
    let body = response.text().await?;
    serde_json::from_str::<T>(&body).map_err(|e| CatalogError::Deserialize {
        context: url.to_owned(),
        source: e,
    })
}

/// Strips the scheme and any path from a configured shop URL, leaving the
/// bare host (`"https://shop.myshopify.com/"` becomes
/// `"shop.myshopify.com"`).
fn shop_host(shop_url: &str) -> String {
    let without_scheme = shop_url
        .strip_prefix("https://")
        .or_else(|| shop_url.strip_prefix("http://"))
        .unwrap_or(shop_url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_owned()
}

/// Reads one settings value, accepting JSON numbers and decimal strings.
fn settings_decimal(current: &serde_json::Value, key: &str, default: Decimal) -> Decimal {
    let Some(raw) = current.get(key) else {
        return default;
    };
    let parsed = match raw {
        serde_json::Value::Number(n) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok()),
        serde_json::Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        tracing::warn!(key, value = %raw, "unreadable theme setting, using default");
        default
    })
}

/// Renders a decimal as a JSON number, falling back to a string when the
/// value does not survive the f64 round-trip.
fn json_number(value: Decimal) -> serde_json::Value {
    value
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(
            || serde_json::Value::String(value.to_string()),
            serde_json::Value::Number,
        )
}
