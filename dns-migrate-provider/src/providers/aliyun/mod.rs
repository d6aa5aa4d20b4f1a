//! 阿里云 DNS Provider

mod error;
mod http;
mod provider;
mod sign;
mod types;

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::http_client::{DEFAULT_REQUEST_TIMEOUT, create_http_client};
use crate::retry::RetryPolicy;
use crate::types::{DnsConfig, ProviderType};
use crate::validation::TtlPolicy;

pub(crate) use types::{
    AliyunRecord, DescribeDomainRecordsParams, DescribeDomainRecordsResponse, RecordIdParams,
    RecordIdResponse, RecordParams, serialize_to_query_string,
};

pub(crate) const ALIYUN_DNS_VERSION: &str = "2015-01-09";
/// 空 body 的 SHA256 hash (固定值)
pub(crate) const EMPTY_BODY_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
/// 阿里云 API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE: u32 = 100;
/// Priority sent for MX/SRV when none can be derived.
pub(crate) const DEFAULT_PRIORITY: u16 = 10;
/// Alibaba Cloud DNS accepts 600s..=1 day on the free tier.
pub(crate) const TTL_POLICY: TtlPolicy = TtlPolicy {
    min: 600,
    max: 86_400,
    default: 600,
    auto: None,
};

/// Aliyun DNS provider bound to one domain.
///
/// Authenticates via ACS3-HMAC-SHA256 signing with an AccessKey pair. Each attempt,
/// retries included, is signed with a fresh nonce and timestamp.
///
/// ```rust,no_run
/// use dns_migrate_provider::{AliyunProvider, DnsConfig};
///
/// let config = DnsConfig::aliyun("LTAI...", "secret", "example.com");
/// let provider = AliyunProvider::from_config(&config)?;
/// # Ok::<(), dns_migrate_provider::ProviderError>(())
/// ```
pub struct AliyunProvider {
    pub(crate) client: Client,
    /// Scheme + host, without trailing slash.
    pub(crate) endpoint: String,
    /// Host part of `endpoint`; signed as the `host` header.
    pub(crate) host: String,
    pub(crate) region: String,
    pub(crate) access_key_id: String,
    pub(crate) access_key_secret: String,
    pub(crate) domain_name: String,
    pub(crate) retry_policy: RetryPolicy,
}

/// Builder for [`AliyunProvider`].
pub struct AliyunProviderBuilder {
    access_key_id: String,
    access_key_secret: String,
    domain_name: String,
    region: String,
    endpoint: Option<String>,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl AliyunProviderBuilder {
    /// Region used to derive the endpoint `alidns.{region}.aliyuncs.com`.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Override the endpoint (mock servers, VPC endpoints).
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into().trim_end_matches('/').to_string());
        self
    }

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

    pub fn build(self) -> Result<AliyunProvider> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| format!("https://alidns.{}.aliyuncs.com", self.region));
        let host = endpoint
            .split_once("://")
            .map_or(endpoint.as_str(), |(_, rest)| rest)
            .to_string();

        Ok(AliyunProvider {
            client: create_http_client("aliyun", self.timeout)?,
            endpoint,
            host,
            region: self.region,
            access_key_id: self.access_key_id,
            access_key_secret: self.access_key_secret,
            domain_name: self.domain_name,
            retry_policy: self.retry_policy,
        })
    }
}

impl AliyunProvider {
    pub fn builder(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        domain_name: impl Into<String>,
    ) -> AliyunProviderBuilder {
        AliyunProviderBuilder {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            domain_name: crate::providers::common::normalize_domain_name(&domain_name.into()),
            region: crate::types::DEFAULT_ALIYUN_REGION.to_string(),
            endpoint: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Start a builder from a stored config, failing fast on missing fields.
    pub fn builder_from_config(config: &DnsConfig) -> Result<AliyunProviderBuilder> {
        if config.provider != ProviderType::Aliyun {
            return Err(ProviderError::Configuration {
                provider: "aliyun".to_string(),
                detail: format!("config is for provider '{}'", config.provider),
            });
        }
        config.ensure_complete()?;
        let field = |key: &str| config.field(key).unwrap_or_default().trim().to_string();
        Ok(Self::builder(
            field("aliyun_access_key_id"),
            field("aliyun_access_key_secret"),
            field("aliyun_domain_name"),
        )
        .region(config.aliyun_region_or_default()))
    }

    pub fn from_config(config: &DnsConfig) -> Result<Self> {
        Self::builder_from_config(config)?.build()
    }
}
