//! Provider factory functions and metadata.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::traits::DnsProvider;
use crate::types::{DnsConfig, ProviderMetadata, ProviderType};

#[cfg(feature = "aliyun")]
use crate::providers::AliyunProvider;
#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareProvider;

/// Outcome of [`validate_provider_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValidation {
    pub valid: bool,
    /// Human-readable problems, one per missing or blank field.
    pub errors: Vec<String>,
}

/// Creates a [`DnsProvider`] instance from a stored [`DnsConfig`].
///
/// The concrete provider is picked by `config.provider`. Missing required fields fail
/// here with [`ProviderError::Configuration`], before any network call.
///
/// # Examples
///
/// ```rust,no_run
/// use dns_migrate_provider::{create_provider, DnsConfig};
///
/// let provider = create_provider(&DnsConfig::aliyun("id", "secret", "example.com")).unwrap();
/// assert_eq!(provider.id(), "aliyun");
/// ```
pub fn create_provider(config: &DnsConfig) -> Result<Arc<dyn DnsProvider>> {
    log::debug!("Creating {} provider", config.provider);
    match config.provider {
        #[cfg(feature = "cloudflare")]
        ProviderType::Cloudflare => Ok(Arc::new(CloudflareProvider::from_config(config)?)),
        #[cfg(feature = "aliyun")]
        ProviderType::Aliyun => Ok(Arc::new(AliyunProvider::from_config(config)?)),
        #[allow(unreachable_patterns)]
        other => Err(ProviderError::Configuration {
            provider: other.to_string(),
            detail: format!("provider '{other}' is not enabled in this build"),
        }),
    }
}

/// Structural check of a config: required fields present and non-blank. No network.
pub fn validate_provider_config(config: &DnsConfig) -> ConfigValidation {
    let errors: Vec<String> = config
        .credential_errors()
        .iter()
        .map(ToString::to_string)
        .collect();
    ConfigValidation {
        valid: errors.is_empty(),
        errors,
    }
}

/// Providers compiled into this build.
pub fn supported_providers() -> Vec<ProviderType> {
    vec![
        #[cfg(feature = "cloudflare")]
        ProviderType::Cloudflare,
        #[cfg(feature = "aliyun")]
        ProviderType::Aliyun,
    ]
}

/// Returns metadata for all providers enabled via feature flags.
pub fn get_all_provider_metadata() -> Vec<ProviderMetadata> {
    vec![
        #[cfg(feature = "cloudflare")]
        CloudflareProvider::metadata(),
        #[cfg(feature = "aliyun")]
        AliyunProvider::metadata(),
    ]
}
