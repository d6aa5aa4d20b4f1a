//! Cloudflare DNS Provider

mod email;
mod error;
mod http;
mod provider;
mod types;

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::http_client::{DEFAULT_REQUEST_TIMEOUT, create_http_client};
use crate::retry::RetryPolicy;
use crate::types::{DnsConfig, ProviderType};
use crate::validation::TtlPolicy;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Cloudflare DNS Records API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE: u32 = 100;
/// `1` means automatic; anything else is kept within 60s..=1 day.
pub(crate) const TTL_POLICY: TtlPolicy = TtlPolicy {
    min: 60,
    max: 86_400,
    default: 1,
    auto: Some(1),
};

/// Cloudflare DNS provider bound to one zone.
///
/// Every request carries `Authorization: Bearer <api_key>` together with
/// `X-Auth-Email` / `X-Auth-Key`, so both API tokens and global keys work.
///
/// ```rust,no_run
/// use dns_migrate_provider::{CloudflareProvider, DnsConfig};
///
/// let config = DnsConfig::cloudflare("zone-id", "api-key", "ops@example.com");
/// let provider = CloudflareProvider::from_config(&config)?;
/// # Ok::<(), dns_migrate_provider::ProviderError>(())
/// ```
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) zone_id: String,
    pub(crate) api_key: String,
    pub(crate) email: String,
    pub(crate) retry_policy: RetryPolicy,
}

/// Builder for [`CloudflareProvider`].
pub struct CloudflareProviderBuilder {
    zone_id: String,
    api_key: String,
    email: String,
    base_url: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl CloudflareProviderBuilder {
    /// Point the provider at another API root (mock servers, proxies).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whole-request deadline (default 15s).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn build(self) -> Result<CloudflareProvider> {
        Ok(CloudflareProvider {
            client: create_http_client("cloudflare", self.timeout)?,
            base_url: self.base_url,
            zone_id: self.zone_id,
            api_key: self.api_key,
            email: self.email,
            retry_policy: self.retry_policy,
        })
    }
}

impl CloudflareProvider {
    pub fn builder(
        zone_id: impl Into<String>,
        api_key: impl Into<String>,
        email: impl Into<String>,
    ) -> CloudflareProviderBuilder {
        CloudflareProviderBuilder {
            zone_id: zone_id.into(),
            api_key: api_key.into(),
            email: email.into(),
            base_url: CF_API_BASE.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Start a builder from a stored config, failing fast on missing fields.
    pub fn builder_from_config(config: &DnsConfig) -> Result<CloudflareProviderBuilder> {
        if config.provider != ProviderType::Cloudflare {
            return Err(ProviderError::Configuration {
                provider: "cloudflare".to_string(),
                detail: format!("config is for provider '{}'", config.provider),
            });
        }
        config.ensure_complete()?;
        let field = |key: &str| config.field(key).unwrap_or_default().trim().to_string();
        Ok(Self::builder(
            field("cf_zone_id"),
            field("cf_api_key"),
            field("cf_email"),
        ))
    }

    pub fn from_config(config: &DnsConfig) -> Result<Self> {
        Self::builder_from_config(config)?.build()
    }
}
