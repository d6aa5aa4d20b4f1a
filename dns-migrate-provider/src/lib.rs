//! # dns-migrate-provider
//!
//! One record-management interface over several DNS hosting APIs, used as the
//! foundation for moving a domain's records from one provider to another.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method |
//! |----------|-------------|-------------|
//! | [Cloudflare](https://www.cloudflare.com/) | `cloudflare` | Bearer + `X-Auth-Email`/`X-Auth-Key` |
//! | [Aliyun DNS](https://www.aliyun.com/product/dns) | `aliyun` | ACS3-HMAC-SHA256 |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: both providers.
//! - **`cloudflare`** / **`aliyun`**: a single provider.
//! - **`native-tls`** *(default)* or **`rustls`**: TLS backend for `reqwest`.
//!
//! ## Record content
//!
//! Every provider accepts and reports record content in one grammar, so a record read
//! from one provider can be written to another unchanged:
//!
//! | Type | Content |
//! |------|---------|
//! | MX | `"<priority> <target>"` |
//! | SRV | `"<priority> <weight> <port> <target>"` |
//! | CAA | `<flags> <tag> "<value>"` |
//! | others | the plain value |
//!
//! Records are validated before any network call. TTLs are clamped into each provider's
//! band rather than rejected.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_migrate_provider::{
//!     create_provider, CreateDnsRecordRequest, DnsConfig, DnsProvider, DnsRecordType,
//!     RecordFilters,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DnsConfig::aliyun("LTAI...", "secret", "example.com");
//!     let provider = create_provider(&config)?;
//!
//!     if !provider.validate_domain().await? {
//!         return Err("domain not reachable with these credentials".into());
//!     }
//!
//!     let req = CreateDnsRecordRequest::new(DnsRecordType::Mx, "example.com", "10 mail.example.com")
//!         .with_ttl(3600);
//!     let record = provider.create_record(&req).await?;
//!     println!("created {} ({})", record.name, record.id);
//!
//!     for record in provider.list_all_records(&RecordFilters::default()).await? {
//!         println!("{} {} {}", record.name, record.record_type, record.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All provider operations return [`Result<T, ProviderError>`](ProviderError). Transient
//! errors (`NetworkError`, `Timeout`, `RateLimited`) are retried per the provider's
//! [`RetryPolicy`]; see [`ProviderError::is_retryable`] and [`ProviderError::kind`].

mod error;
mod factory;
mod http_client;
mod providers;
mod retry;
mod traits;
mod types;
mod utils;
pub mod validation;

// Re-export error types
pub use error::{ErrorKind, ProviderError, Result};

// Re-export factory functions
pub use factory::{
    ConfigValidation, create_provider, get_all_provider_metadata, supported_providers,
    validate_provider_config,
};

pub use http_client::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
pub use retry::{RetryPolicy, with_retry};

// Re-export core trait only (internal traits are not exported)
pub use traits::{BATCH_CONCURRENCY, DnsProvider};

pub use types::{
    BatchCreateFailure, BatchCreateResult, BatchDeleteFailure, BatchDeleteResult,
    CreateDnsRecordRequest, CredentialValidationError, DEFAULT_ALIYUN_REGION, DEFAULT_PER_PAGE,
    DnsConfig, DnsRecord, DnsRecordType, DomainInfo, DomainStatus, EmailForwardRule,
    EmailSettings, FieldType, PaginatedResponse, ProviderCredentialField, ProviderFeatures,
    ProviderLimits, ProviderMetadata, ProviderType, RecordFilters, UpdateDnsRecordRequest,
};

pub use utils::log_sanitizer::mask_secret;
pub use validation::TtlPolicy;

// Re-export concrete providers (behind feature flags)
#[cfg(feature = "cloudflare")]
pub use providers::{CloudflareProvider, CloudflareProviderBuilder};

#[cfg(feature = "aliyun")]
pub use providers::{AliyunProvider, AliyunProviderBuilder};
