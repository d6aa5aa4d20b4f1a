//! Cloudflare DnsProvider trait 实现

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::Result;
use crate::providers::common::{BackendPage, normalize_domain_name, paginate};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CreateDnsRecordRequest, DnsConfig, DnsRecord, DnsRecordType, DomainInfo, DomainStatus,
    EmailSettings, PaginatedResponse, ProviderFeatures, ProviderLimits, ProviderMetadata, ProviderType,
    RecordFilters, UpdateDnsRecordRequest,
};
use crate::validation::{canonical_content, parse_caa, parse_mx, parse_srv, validate_record};

use super::types::{CloudflareCaaData, CloudflareRecordBody, CloudflareSrvData};
use super::{CloudflareDnsRecord, CloudflareProvider, CloudflareZone, MAX_PAGE_SIZE, TTL_POLICY};

impl CloudflareProvider {
    fn records_path(&self) -> String {
        format!("/zones/{}/dns_records", self.zone_id)
    }

    fn record_path(&self, record_id: &str) -> String {
        format!("/zones/{}/dns_records/{record_id}", self.zone_id)
    }

    /// Validate a request and turn it into the API payload.
    ///
    /// MX goes out as hostname + `priority`; SRV and CAA go out as structured `data`.
    fn record_body(&self, req: &CreateDnsRecordRequest) -> Result<CloudflareRecordBody> {
        let provider = self.provider_name();
        validate_record(provider, req)?;
        let content = canonical_content(req);

        let mut body = CloudflareRecordBody {
            record_type: req.record_type.as_str().to_string(),
            name: normalize_domain_name(&req.name),
            content: None,
            ttl: TTL_POLICY.clamp(req.ttl),
            proxied: req.proxied.unwrap_or(false),
            priority: None,
            comment: req.comment.clone(),
            tags: req.tags.clone(),
            data: None,
        };

        match req.record_type {
            DnsRecordType::Mx => {
                let mx = parse_mx(provider, &content)?;
                body.priority = Some(mx.priority);
                body.content = Some(mx.target.to_string());
            }
            DnsRecordType::Srv => {
                let srv = parse_srv(provider, &content)?;
                let data = CloudflareSrvData {
                    priority: srv.priority,
                    weight: srv.weight,
                    port: srv.port,
                    target: srv.target.to_string(),
                };
                body.data = Some(serde_json::to_value(data).map_err(|e| self.parse_error(e))?);
            }
            DnsRecordType::Caa => {
                let caa = parse_caa(provider, &content)?;
                let data = CloudflareCaaData {
                    flags: caa.flags,
                    tag: caa.tag,
                    value: caa.value,
                };
                body.data = Some(serde_json::to_value(data).map_err(|e| self.parse_error(e))?);
            }
            _ => body.content = Some(content),
        }
        Ok(body)
    }

    /// Rebuild unified content from the API's split representation.
    fn unified_content(record: &CloudflareDnsRecord, record_type: &DnsRecordType) -> String {
        let data = record.data.clone().unwrap_or(Value::Null);
        match record_type {
            DnsRecordType::Mx => match record.priority {
                Some(p) => format!("{p} {}", normalize_domain_name(&record.content)),
                None => record.content.clone(),
            },
            DnsRecordType::Srv => match serde_json::from_value::<CloudflareSrvData>(data) {
                Ok(srv) => format!(
                    "{} {} {} {}",
                    srv.priority,
                    srv.weight,
                    srv.port,
                    normalize_domain_name(&srv.target)
                ),
                Err(_) => match record.priority {
                    Some(p) => format!("{p} {}", record.content),
                    None => record.content.clone(),
                },
            },
            DnsRecordType::Caa => match serde_json::from_value::<CloudflareCaaData>(data) {
                Ok(caa) => format!("{} {} \"{}\"", caa.flags, caa.tag, caa.value),
                Err(_) => record.content.clone(),
            },
            _ => record.content.clone(),
        }
    }

    /// 将 Cloudflare 记录转换为 `DnsRecord`
    pub(crate) fn cf_record_to_dns_record(record: CloudflareDnsRecord) -> DnsRecord {
        let record_type = DnsRecordType::from(record.record_type.as_str());
        let content = Self::unified_content(&record, &record_type);
        let priority = if record_type.has_priority() {
            record.priority.or_else(|| {
                content
                    .split_whitespace()
                    .next()
                    .and_then(|p| p.parse().ok())
            })
        } else {
            None
        };

        DnsRecord {
            id: record.id,
            zone_id: record.zone_id,
            zone_name: record.zone_name,
            name: normalize_domain_name(&record.name),
            record_type,
            content,
            ttl: record.ttl,
            priority,
            comment: record.comment,
            tags: record.tags,
            proxied: record.proxied.unwrap_or(false),
            proxiable: record.proxiable.unwrap_or(false),
            created_on: record.created_on,
            modified_on: record.modified_on,
            meta: record.meta,
        }
    }

    /// Cloudflare 状态：active, pending, initializing, moved, deleted, deactivated
    fn zone_status(status: &str) -> DomainStatus {
        match status {
            "active" => DomainStatus::Active,
            "pending" => DomainStatus::Pending,
            "initializing" => DomainStatus::Initializing,
            "moved" => DomainStatus::Moved,
            "deleted" => DomainStatus::Deleted,
            "deactivated" => DomainStatus::Deactivated,
            _ => DomainStatus::Unknown,
        }
    }

    async fn fetch_page(&self, filters: &RecordFilters, page: u32, size: u32) -> Result<BackendPage> {
        let mut url = format!("{}?page={page}&per_page={size}", self.records_path());
        if let Some(ref record_type) = filters.record_type {
            url.push_str(&format!("&type={}", urlencoding::encode(record_type.as_str())));
        }
        if let Some(ref name) = filters.name
            && !name.is_empty()
        {
            let name = normalize_domain_name(name);
            url.push_str(&format!("&name={}", urlencoding::encode(&name)));
        }
        if let Some(ref content) = filters.content
            && !content.is_empty()
        {
            url.push_str(&format!("&content={}", urlencoding::encode(content)));
        }

        let (records, total) = self
            .call::<Vec<CloudflareDnsRecord>>(Method::GET, &url, None, ErrorContext::default())
            .await?;
        let records: Vec<DnsRecord> = records
            .unwrap_or_default()
            .into_iter()
            .map(Self::cf_record_to_dns_record)
            .collect();
        let total = total.unwrap_or_else(|| u32::try_from(records.len()).unwrap_or(u32::MAX));
        Ok((records, total))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Cloudflare
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Cloudflare,
            name: "Cloudflare".to_string(),
            description: "Cloudflare DNS, addressed by zone id".to_string(),
            required_fields: ProviderMetadata::fields_for(ProviderType::Cloudflare),
            features: ProviderFeatures {
                proxy: true,
                email_forwarding: true,
            },
            limits: ProviderLimits {
                max_page_size: MAX_PAGE_SIZE,
                min_ttl: TTL_POLICY.min,
                max_ttl: TTL_POLICY.max,
                default_ttl: TTL_POLICY.default,
            },
        }
    }

    fn safe_config(&self) -> DnsConfig {
        DnsConfig::cloudflare(&self.zone_id, &self.api_key, &self.email).safe()
    }

    async fn create_record(&self, req: &CreateDnsRecordRequest) -> Result<DnsRecord> {
        let body = self.record_body(req)?;
        let body = serde_json::to_value(&body).map_err(|e| self.parse_error(e))?;

        let record: CloudflareDnsRecord = self
            .call_result(
                Method::POST,
                &self.records_path(),
                Some(&body),
                ErrorContext::record(&req.name),
            )
            .await?;
        log::info!("[cloudflare] Created {} record {}", req.record_type, record.name);
        Ok(Self::cf_record_to_dns_record(record))
    }

    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord> {
        let body = self.record_body(req)?;
        let body = serde_json::to_value(&body).map_err(|e| self.parse_error(e))?;

        let ctx = ErrorContext {
            record_name: Some(req.name.clone()),
            record_id: Some(record_id.to_string()),
            domain: None,
        };
        let record: CloudflareDnsRecord = self
            .call_result(Method::PATCH, &self.record_path(record_id), Some(&body), ctx)
            .await?;
        Ok(Self::cf_record_to_dns_record(record))
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        self.call::<Value>(
            Method::DELETE,
            &self.record_path(record_id),
            None,
            ErrorContext::record_id(record_id),
        )
        .await?;
        Ok(())
    }

    async fn get_record(&self, record_id: &str) -> Result<DnsRecord> {
        let record: CloudflareDnsRecord = self
            .call_result(
                Method::GET,
                &self.record_path(record_id),
                None,
                ErrorContext::record_id(record_id),
            )
            .await?;
        Ok(Self::cf_record_to_dns_record(record))
    }

    async fn list_records(&self, filters: &RecordFilters) -> Result<PaginatedResponse<DnsRecord>> {
        paginate(filters, MAX_PAGE_SIZE, |page, size| {
            self.fetch_page(filters, page, size)
        })
        .await
    }

    async fn get_domain_info(&self) -> Result<DomainInfo> {
        let zone: CloudflareZone = self
            .call_result(
                Method::GET,
                &format!("/zones/{}", self.zone_id),
                None,
                ErrorContext::domain(&self.zone_id),
            )
            .await?;

        Ok(DomainInfo {
            id: zone.id,
            name: zone.name,
            status: Self::zone_status(&zone.status),
            name_servers: zone.name_servers,
            original_name_servers: zone.original_name_servers.unwrap_or_default(),
            original_registrar: zone.original_registrar,
            created_on: zone.created_on,
            modified_on: zone.modified_on,
            activated_on: zone.activated_on,
        })
    }

    async fn configure_email_forwarding(&self, settings: &EmailSettings) -> Result<bool> {
        self.apply_email_settings(settings).await
    }
}
