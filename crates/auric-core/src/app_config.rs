/// Process-wide configuration, loaded from `AURIC_*` environment variables.
///
/// `rate_feed_api_key` and `theme_id` are optional at load time: a manual run
/// with `--gold-rate`/`--silver-rate` and explicit charge overrides needs
/// neither. The CLI enforces their presence only on the paths that use them.
#[derive(Clone)]
pub struct AppConfig {
    pub shop_url: String,
    pub access_token: String,
    pub theme_id: Option<String>,
    pub rate_feed_api_key: Option<String>,
    pub currency: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub page_limit: u32,
    pub inter_request_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shop_url", &self.shop_url)
            .field("access_token", &"[redacted]")
            .field("theme_id", &self.theme_id)
            .field(
                "rate_feed_api_key",
                &self.rate_feed_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("currency", &self.currency)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("page_limit", &self.page_limit)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .finish()
    }
}
