use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::utils::log_sanitizer::mask_secret;

// ============ Provider Types ============

/// Identifies which DNS provider implementation to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Cloudflare DNS. Requires feature `cloudflare`.
    Cloudflare,
    /// Aliyun (China) DNS. Requires feature `aliyun`.
    Aliyun,
}

impl ProviderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cloudflare => "cloudflare",
            Self::Aliyun => "aliyun",
        }
    }

    /// `(key, label)` pairs of the [`DnsConfig`] fields this provider cannot work without.
    pub fn required_fields(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Cloudflare => &[
                ("cf_zone_id", "Zone ID"),
                ("cf_api_key", "API Key"),
                ("cf_email", "Account Email"),
            ],
            Self::Aliyun => &[
                ("aliyun_access_key_id", "AccessKey ID"),
                ("aliyun_access_key_secret", "AccessKey Secret"),
                ("aliyun_domain_name", "Domain Name"),
            ],
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloudflare" => Ok(Self::Cloudflare),
            "aliyun" => Ok(Self::Aliyun),
            other => Err(ProviderError::Configuration {
                provider: other.to_string(),
                detail: format!("Unsupported DNS provider: {other}"),
            }),
        }
    }
}

// ============ Configuration ============

/// Default Aliyun region when none is configured.
pub const DEFAULT_ALIYUN_REGION: &str = "cn-hangzhou";

/// Flat provider configuration as persisted alongside a domain.
///
/// Only the fields listed by [`ProviderType::required_fields`] are mandatory for the
/// selected provider; the rest are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsConfig {
    pub provider: ProviderType,
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

impl DnsConfig {
    /// Empty config for `provider`; fill the fields with struct update syntax.
    pub fn new(provider: ProviderType) -> Self {
        Self {
            provider,
            cf_zone_id: None,
            cf_api_key: None,
            cf_email: None,
            aliyun_access_key_id: None,
            aliyun_access_key_secret: None,
            aliyun_region: None,
            aliyun_domain_name: None,
        }
    }

    pub fn cloudflare(
        zone_id: impl Into<String>,
        api_key: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            cf_zone_id: Some(zone_id.into()),
            cf_api_key: Some(api_key.into()),
            cf_email: Some(email.into()),
            ..Self::new(ProviderType::Cloudflare)
        }
    }

    pub fn aliyun(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        domain_name: impl Into<String>,
    ) -> Self {
        Self {
            aliyun_access_key_id: Some(access_key_id.into()),
            aliyun_access_key_secret: Some(access_key_secret.into()),
            aliyun_domain_name: Some(domain_name.into()),
            ..Self::new(ProviderType::Aliyun)
        }
    }

    /// Look up a field by its serialized key.
    pub fn field(&self, key: &str) -> Option<&str> {
        let value = match key {
            "cf_zone_id" => &self.cf_zone_id,
            "cf_api_key" => &self.cf_api_key,
            "cf_email" => &self.cf_email,
            "aliyun_access_key_id" => &self.aliyun_access_key_id,
            "aliyun_access_key_secret" => &self.aliyun_access_key_secret,
            "aliyun_region" => &self.aliyun_region,
            "aliyun_domain_name" => &self.aliyun_domain_name,
            _ => return None,
        };
        value.as_deref()
    }

    /// Region to use for Aliyun, falling back to `cn-hangzhou`.
    pub fn aliyun_region_or_default(&self) -> &str {
        self.aliyun_region
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_ALIYUN_REGION)
    }

    /// Every required field of the selected provider that is absent or blank.
    pub fn credential_errors(&self) -> Vec<CredentialValidationError> {
        self.provider
            .required_fields()
            .iter()
            .filter_map(|&(key, label)| match self.field(key) {
                None => Some(CredentialValidationError::MissingField {
                    provider: self.provider,
                    field: key.to_string(),
                    label: label.to_string(),
                }),
                Some(v) if v.trim().is_empty() => Some(CredentialValidationError::EmptyField {
                    provider: self.provider,
                    field: key.to_string(),
                    label: label.to_string(),
                }),
                Some(_) => None,
            })
            .collect()
    }

    /// Fail with [`ProviderError::Configuration`] when a required field is missing.
    pub fn ensure_complete(&self) -> Result<(), ProviderError> {
        let errors = self.credential_errors();
        if errors.is_empty() {
            return Ok(());
        }
        let detail = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(ProviderError::Configuration {
            provider: self.provider.to_string(),
            detail,
        })
    }

    /// Copy of this config with secrets reduced to `***` plus their last four characters.
    #[must_use]
    pub fn safe(&self) -> Self {
        Self {
            cf_api_key: self.cf_api_key.as_deref().map(mask_secret),
            aliyun_access_key_secret: self.aliyun_access_key_secret.as_deref().map(mask_secret),
            ..self.clone()
        }
    }
}

/// Validation error for provider configuration fields.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A required field is absent.
    MissingField {
        provider: ProviderType,
        field: String,
        label: String,
    },
    /// A required field is present but blank.
    EmptyField {
        provider: ProviderType,
        field: String,
        label: String,
    },
}

impl std::fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField {
                provider, label, ..
            } => write!(f, "Missing required {provider} field: {label}"),
            Self::EmptyField {
                provider, label, ..
            } => write!(f, "{provider} field must not be empty: {label}"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

// ============ Record Types ============

/// DNS record type.
///
/// The common types have their own variants. Anything else is kept verbatim in
/// [`Other`](Self::Other) and only length-checked by validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DnsRecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Ns,
    Srv,
    Caa,
    Ptr,
    Other(String),
}

impl DnsRecordType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Ptr => "PTR",
            Self::Other(s) => s,
        }
    }

    /// Types whose content carries a leading priority token.
    pub fn has_priority(&self) -> bool {
        matches!(self, Self::Mx | Self::Srv)
    }
}

impl From<&str> for DnsRecordType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "MX" => Self::Mx,
            "TXT" => Self::Txt,
            "NS" => Self::Ns,
            "SRV" => Self::Srv,
            "CAA" => Self::Caa,
            "PTR" => Self::Ptr,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for DnsRecordType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<DnsRecordType> for String {
    fn from(t: DnsRecordType) -> Self {
        match t {
            DnsRecordType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record as submitted for creation.
///
/// `content` follows the unified grammar: MX is `"<priority> <target>"`, SRV is
/// `"<priority> <weight> <port> <target>"`, CAA is `<flag> <tag> "<value>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDnsRecordRequest {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub name: String,
    pub content: String,
    /// Seconds. `None` or `0` selects the provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

impl CreateDnsRecordRequest {
    pub fn new(
        record_type: DnsRecordType,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            record_type,
            name: name.into(),
            content: content.into(),
            ttl: None,
            priority: None,
            comment: None,
            tags: Vec::new(),
            proxied: None,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Updates replace the whole record payload.
pub type UpdateDnsRecordRequest = CreateDnsRecordRequest;

/// A record as reported by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Opaque provider-assigned id. Never meaningful on another provider.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    /// Fully-qualified name; the zone apex is the bare zone name.
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub content: String,
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default)]
    pub proxiable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl DnsRecord {
    /// Strip the provider-owned fields, keeping only what another provider can accept.
    pub fn to_create_request(&self) -> CreateDnsRecordRequest {
        CreateDnsRecordRequest {
            record_type: self.record_type.clone(),
            name: self.name.clone(),
            content: self.content.clone(),
            ttl: Some(self.ttl),
            priority: self.priority,
            comment: self.comment.clone(),
            tags: self.tags.clone(),
            proxied: Some(self.proxied),
        }
    }
}

// ============ Query & Pagination ============

/// Default page size for record listing.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Filters for listing records. Pages are 1-indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilters {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<DnsRecordType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl RecordFilters {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1)
    }

    /// Same filters pointed at another page.
    #[must_use]
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }
}

/// One page of a list operation plus its `result_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    /// Number of items in this page.
    pub count: u32,
    pub page: u32,
    pub per_page: u32,
    /// Total across all pages.
    pub total_count: u32,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Build a page, computing `count` and `has_more`.
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total_count: u32) -> Self {
        let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let has_more = u64::from(page) * u64::from(per_page) < u64::from(total_count);
        Self {
            items,
            count,
            page,
            per_page,
            total_count,
            has_more,
        }
    }
}

// ============ Domain Types ============

/// Zone status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Active,
    Pending,
    Initializing,
    Moved,
    Deleted,
    Deactivated,
    #[serde(other)]
    Unknown,
}

/// Zone metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainInfo {
    pub id: String,
    pub name: String,
    pub status: DomainStatus,
    #[serde(default)]
    pub name_servers: Vec<String>,
    #[serde(default)]
    pub original_name_servers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_registrar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_on: Option<DateTime<Utc>>,
}

// ============ Email Forwarding ============

/// A literal-address forwarding rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailForwardRule {
    pub name: String,
    /// Address matched against the envelope recipient.
    pub pattern: String,
    pub destination: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSettings {
    pub enabled: bool,
    /// Destination for mail that matches no rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch_all: Option<String>,
    #[serde(default)]
    pub rules: Vec<EmailForwardRule>,
}

// ============ Batch Types ============

/// Outcome of a best-effort batch create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCreateResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub created_records: Vec<DnsRecord>,
    pub failures: Vec<BatchCreateFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCreateFailure {
    /// Position of the failed request in the input slice.
    pub request_index: usize,
    pub record_name: String,
    pub reason: String,
}

/// Outcome of a best-effort batch delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteResult {
    pub success_count: usize,
    pub failed_count: usize,
    /// Per-id outcome, in input order.
    pub results: Vec<(String, bool)>,
    pub failures: Vec<BatchDeleteFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteFailure {
    pub record_id: String,
    pub reason: String,
}

// ============ Provider Metadata Types ============

/// Input type of a configuration field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Password,
}

/// A configuration field a provider needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentialField {
    /// Key inside [`DnsConfig`] (e.g. `"cf_api_key"`).
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFeatures {
    /// CDN proxying (Cloudflare's orange cloud).
    pub proxy: bool,
    pub email_forwarding: bool,
}

/// Page size and TTL band of a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLimits {
    pub max_page_size: u32,
    pub min_ttl: u32,
    pub max_ttl: u32,
    pub default_ttl: u32,
}

/// Static description of a provider: identity, required fields, features, limits.
///
/// Obtain via [`DnsProvider::metadata()`](crate::DnsProvider::metadata) or
/// [`get_all_provider_metadata()`](crate::get_all_provider_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    pub id: ProviderType,
    pub name: String,
    pub description: String,
    pub required_fields: Vec<ProviderCredentialField>,
    pub features: ProviderFeatures,
    pub limits: ProviderLimits,
}

impl ProviderMetadata {
    /// Required fields derived from [`ProviderType::required_fields`]; secrets get
    /// [`FieldType::Password`].
    pub fn fields_for(provider: ProviderType) -> Vec<ProviderCredentialField> {
        provider
            .required_fields()
            .iter()
            .map(|&(key, label)| ProviderCredentialField {
                key: key.to_string(),
                label: label.to_string(),
                field_type: if key.ends_with("_key") || key.ends_with("_secret") {
                    FieldType::Password
                } else {
                    FieldType::Text
                },
            })
            .collect()
    }
}
