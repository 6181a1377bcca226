use std::time::Duration;

use crate::errors::{ClientError, ClientResult};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RECONCILE_DELAY: Duration = Duration::from_millis(3000);

/// Connection and store settings for the admin console client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token, passed through untouched.
    pub token: Option<String>,
    /// Sent as `X-Tenant-ID` on every request.
    pub tenant_id: Option<String>,
    pub timeout: Duration,
    /// Wait before re-fetching an order whose optimistic update failed.
    pub reconcile_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            tenant_id: None,
            timeout: DEFAULT_TIMEOUT,
            reconcile_delay: DEFAULT_RECONCILE_DELAY,
        }
    }

    /// Reads `MARKETPLACE_*` variables, loading `.env` first when present.
    pub fn from_env() -> ClientResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let base_url = lookup("MARKETPLACE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let mut config = Self::new(base_url);
        config.token = lookup("MARKETPLACE_API_TOKEN").filter(|s| !s.is_empty());
        config.tenant_id = lookup("MARKETPLACE_TENANT_ID").filter(|s| !s.is_empty());
        if let Some(secs) = lookup("MARKETPLACE_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_number("MARKETPLACE_TIMEOUT_SECS", &secs)?);
        }
        if let Some(ms) = lookup("MARKETPLACE_RECONCILE_DELAY_MS") {
            config.reconcile_delay =
                Duration::from_millis(parse_number("MARKETPLACE_RECONCILE_DELAY_MS", &ms)?);
        }
        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_reconcile_delay(mut self, delay: Duration) -> Self {
        self.reconcile_delay = delay;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn parse_number(key: &str, raw: &str) -> ClientResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{key} must be a non-negative integer, got {raw:?}")))
}
