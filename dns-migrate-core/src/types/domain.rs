use serde::{Deserialize, Serialize};

use dns_migrate_provider::{DnsConfig, ProviderType};

/// A domain row as kept by the storage layer, credentials for every provider inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDomain {
    pub id: String,
    pub domain_name: String,
    #[serde(default)]
    pub enable_dns: bool,
    /// Current DNS host. Rows written before multi-provider support have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_provider: Option<ProviderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cf_zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cf_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cf_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliyun_access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliyun_access_key_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliyun_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliyun_domain_name: Option<String>,
}

impl StoredDomain {
    pub fn new(id: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain_name: domain_name.into(),
            enable_dns: true,
            dns_provider: None,
            cf_zone_id: None,
            cf_api_key: None,
            cf_email: None,
            aliyun_access_key_id: None,
            aliyun_access_key_secret: None,
            aliyun_region: None,
            aliyun_domain_name: None,
        }
    }

    /// The provider currently hosting the domain; Cloudflare when unset.
    pub fn source_provider(&self) -> ProviderType {
        self.dns_provider.unwrap_or(ProviderType::Cloudflare)
    }

    /// Config of the current host, carrying every stored credential field.
    pub fn source_config(&self) -> DnsConfig {
        DnsConfig {
            provider: self.source_provider(),
            cf_zone_id: self.cf_zone_id.clone(),
            cf_api_key: self.cf_api_key.clone(),
            cf_email: self.cf_email.clone(),
            aliyun_access_key_id: self.aliyun_access_key_id.clone(),
            aliyun_access_key_secret: self.aliyun_access_key_secret.clone(),
            aliyun_region: self.aliyun_region.clone(),
            aliyun_domain_name: self.aliyun_domain_name.clone(),
        }
    }

    /// Config for `provider` built from only that provider's stored fields.
    pub fn config_for(&self, provider: ProviderType) -> DnsConfig {
        match provider {
            ProviderType::Cloudflare => DnsConfig {
                cf_zone_id: self.cf_zone_id.clone(),
                cf_api_key: self.cf_api_key.clone(),
                cf_email: self.cf_email.clone(),
                ..DnsConfig::new(provider)
            },
            ProviderType::Aliyun => DnsConfig {
                aliyun_access_key_id: self.aliyun_access_key_id.clone(),
                aliyun_access_key_secret: self.aliyun_access_key_secret.clone(),
                aliyun_region: self.aliyun_region.clone(),
                aliyun_domain_name: self.aliyun_domain_name.clone(),
                ..DnsConfig::new(provider)
            },
        }
    }

    /// Point the row at `provider`, overwriting that provider's fields from `config`.
    ///
    /// Fields of other providers are left alone so the previous host stays reachable.
    pub fn apply_provider_config(&mut self, provider: ProviderType, config: &DnsConfig) {
        self.dns_provider = Some(provider);
        match provider {
            ProviderType::Cloudflare => {
                self.cf_zone_id.clone_from(&config.cf_zone_id);
                self.cf_api_key.clone_from(&config.cf_api_key);
                self.cf_email.clone_from(&config.cf_email);
            }
            ProviderType::Aliyun => {
                self.aliyun_access_key_id.clone_from(&config.aliyun_access_key_id);
                self.aliyun_access_key_secret
                    .clone_from(&config.aliyun_access_key_secret);
                self.aliyun_region.clone_from(&config.aliyun_region);
                self.aliyun_domain_name.clone_from(&config.aliyun_domain_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloudflare_row() -> StoredDomain {
        StoredDomain {
            cf_zone_id: Some("zone".into()),
            cf_api_key: Some("key".into()),
            cf_email: Some("ops@example.com".into()),
            ..StoredDomain::new("d1", "example.com")
        }
    }

    #[test]
    fn source_defaults_to_cloudflare() {
        let row = cloudflare_row();
        assert_eq!(row.source_provider(), ProviderType::Cloudflare);
        let config = row.source_config();
        assert_eq!(config.provider, ProviderType::Cloudflare);
        assert!(config.credential_errors().is_empty());
    }

    #[test]
    fn config_for_only_copies_that_provider() {
        let row = StoredDomain {
            aliyun_access_key_id: Some("id".into()),
            ..cloudflare_row()
        };
        let config = row.config_for(ProviderType::Aliyun);
        assert_eq!(config.aliyun_access_key_id.as_deref(), Some("id"));
        assert!(config.cf_zone_id.is_none());
    }

    #[test]
    fn apply_switches_provider_and_keeps_old_fields() {
        let mut row = cloudflare_row();
        row.apply_provider_config(
            ProviderType::Aliyun,
            &DnsConfig::aliyun("id", "secret", "example.com"),
        );
        assert_eq!(row.dns_provider, Some(ProviderType::Aliyun));
        assert_eq!(row.aliyun_domain_name.as_deref(), Some("example.com"));
        assert_eq!(row.cf_zone_id.as_deref(), Some("zone"));
    }

    #[test]
    fn deserializes_legacy_row_without_provider() {
        let row: StoredDomain =
            serde_json::from_str(r#"{"id":"d1","domain_name":"example.com"}"#).unwrap();
        assert!(!row.enable_dns);
        assert_eq!(row.source_provider(), ProviderType::Cloudflare);
    }
}
