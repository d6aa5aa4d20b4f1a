//! 阿里云 DnsProvider trait 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::providers::common::{BackendPage, full_name_to_relative, paginate, relative_to_full_name};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CreateDnsRecordRequest, DnsConfig, DnsRecord, DnsRecordType, DomainInfo, DomainStatus,
    PaginatedResponse, ProviderFeatures, ProviderLimits, ProviderMetadata, ProviderType,
    RecordFilters, UpdateDnsRecordRequest,
};
use crate::validation::{canonical_content, parse_mx, parse_srv, validate_record};

use super::{
    AliyunProvider, AliyunRecord, DEFAULT_PRIORITY, DescribeDomainRecordsParams,
    DescribeDomainRecordsResponse, MAX_PAGE_SIZE, RecordIdParams, RecordIdResponse, RecordParams,
    TTL_POLICY,
};

/// 阿里云默认 DNS 服务器
const ALIYUN_NAME_SERVERS: [&str; 2] = ["vip1.alidns.com", "vip2.alidns.com"];

/// A validated request in Aliyun's shape.
struct WireRecord {
    rr: String,
    value: String,
    ttl: u32,
    priority: Option<u16>,
    /// Unified content echoed back to the caller.
    content: String,
}

impl AliyunProvider {
    /// Validate and convert: MX splits into `Value` + `Priority`, SRV keeps its full value
    /// and also sends `Priority`.
    fn to_wire(&self, req: &CreateDnsRecordRequest) -> Result<WireRecord> {
        let provider = self.provider_name();
        validate_record(provider, req)?;
        let content = canonical_content(req);

        let (value, priority) = match req.record_type {
            DnsRecordType::Mx => {
                let mx = parse_mx(provider, &content)?;
                (mx.target.to_string(), Some(mx.priority))
            }
            DnsRecordType::Srv => {
                let srv = parse_srv(provider, &content)?;
                (content.clone(), Some(srv.priority))
            }
            _ => (content.clone(), None),
        };

        Ok(WireRecord {
            rr: full_name_to_relative(&req.name, &self.domain_name),
            value,
            ttl: TTL_POLICY.clamp(req.ttl),
            priority,
            content,
        })
    }

    fn record_params(&self, req: &CreateDnsRecordRequest, wire: &WireRecord) -> RecordParams {
        RecordParams {
            domain_name: None,
            record_id: None,
            rr: wire.rr.clone(),
            record_type: req.record_type.as_str().to_string(),
            value: wire.value.clone(),
            ttl: wire.ttl,
            line: "default",
            priority: req
                .record_type
                .has_priority()
                .then(|| wire.priority.unwrap_or(DEFAULT_PRIORITY)),
        }
    }

    /// Record as echoed back after create/update, in the same FQDN form `get_record` uses.
    fn echo_record(
        &self,
        id: String,
        req: &CreateDnsRecordRequest,
        wire: WireRecord,
        created_on: Option<DateTime<Utc>>,
    ) -> DnsRecord {
        DnsRecord {
            id,
            zone_id: Some(self.domain_name.clone()),
            zone_name: Some(self.domain_name.clone()),
            name: relative_to_full_name(&wire.rr, &self.domain_name),
            record_type: req.record_type.clone(),
            content: wire.content,
            ttl: wire.ttl,
            priority: wire.priority,
            comment: None,
            tags: Vec::new(),
            proxied: false,
            proxiable: false,
            created_on,
            modified_on: Some(Utc::now()),
            meta: None,
        }
    }

    /// 将阿里云记录转换为 `DnsRecord`
    pub(crate) fn aliyun_record_to_dns_record(&self, record: AliyunRecord) -> DnsRecord {
        let zone = record
            .domain_name
            .unwrap_or_else(|| self.domain_name.clone());
        let record_type = DnsRecordType::from(record.record_type.as_str());
        let (content, priority) = match record_type {
            DnsRecordType::Mx => {
                let priority = record.priority.unwrap_or(DEFAULT_PRIORITY);
                (format!("{priority} {}", record.value), Some(priority))
            }
            DnsRecordType::Srv => {
                let priority = record.priority.or_else(|| {
                    record
                        .value
                        .split_whitespace()
                        .next()
                        .and_then(|p| p.parse().ok())
                });
                (record.value, priority)
            }
            _ => (record.value, None),
        };

        DnsRecord {
            id: record.record_id,
            zone_id: Some(zone.clone()),
            name: relative_to_full_name(&record.rr, &zone),
            zone_name: Some(zone),
            record_type,
            content,
            ttl: record.ttl,
            priority,
            comment: None,
            tags: Vec::new(),
            proxied: false,
            proxiable: false,
            created_on: record
                .create_timestamp
                .and_then(DateTime::from_timestamp_millis),
            modified_on: record
                .update_timestamp
                .and_then(DateTime::from_timestamp_millis),
            meta: None,
        }
    }

    async fn fetch_page(&self, filters: &RecordFilters, page: u32, size: u32) -> Result<BackendPage> {
        let params = DescribeDomainRecordsParams {
            domain_name: &self.domain_name,
            page_number: page,
            page_size: size,
            rr_keyword: filters
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(|n| full_name_to_relative(n, &self.domain_name)),
            type_key_word: filters.record_type.as_ref().map(DnsRecordType::as_str),
            value_key_word: filters.content.as_deref().filter(|c| !c.is_empty()),
        };

        let response: DescribeDomainRecordsResponse = self
            .request(
                "DescribeDomainRecords",
                &params,
                ErrorContext::domain(&self.domain_name),
            )
            .await?;

        let records: Vec<DnsRecord> = response
            .domain_records
            .map(|r| r.record)
            .unwrap_or_default()
            .into_iter()
            .map(|r| self.aliyun_record_to_dns_record(r))
            .collect();
        let total = response
            .total_count
            .unwrap_or_else(|| u32::try_from(records.len()).unwrap_or(u32::MAX));
        Ok((records, total))
    }
}

#[async_trait]
impl DnsProvider for AliyunProvider {
    fn id(&self) -> &'static str {
        "aliyun"
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Aliyun
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Aliyun,
            name: "Aliyun DNS".to_string(),
            description: "Alibaba Cloud DNS, addressed by domain name".to_string(),
            required_fields: ProviderMetadata::fields_for(ProviderType::Aliyun),
            features: ProviderFeatures::default(),
            limits: ProviderLimits {
                max_page_size: MAX_PAGE_SIZE,
                min_ttl: TTL_POLICY.min,
                max_ttl: TTL_POLICY.max,
                default_ttl: TTL_POLICY.default,
            },
        }
    }

    fn safe_config(&self) -> DnsConfig {
        DnsConfig {
            aliyun_region: Some(self.region.clone()),
            ..DnsConfig::aliyun(&self.access_key_id, &self.access_key_secret, &self.domain_name)
        }
        .safe()
    }

    async fn create_record(&self, req: &CreateDnsRecordRequest) -> Result<DnsRecord> {
        let wire = self.to_wire(req)?;
        let params = RecordParams {
            domain_name: Some(self.domain_name.clone()),
            ..self.record_params(req, &wire)
        };

        let response: RecordIdResponse = self
            .request("AddDomainRecord", &params, ErrorContext::record(&req.name))
            .await?;
        let id = response
            .record_id
            .ok_or_else(|| self.parse_error("AddDomainRecord response has no RecordId"))?;

        log::info!("[aliyun] Created {} record {} ({id})", req.record_type, req.name);
        Ok(self.echo_record(id, req, wire, Some(Utc::now())))
    }

    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord> {
        let wire = self.to_wire(req)?;
        let params = RecordParams {
            record_id: Some(record_id.to_string()),
            ..self.record_params(req, &wire)
        };

        let ctx = ErrorContext {
            record_name: Some(req.name.clone()),
            record_id: Some(record_id.to_string()),
            domain: Some(self.domain_name.clone()),
        };
        let _: RecordIdResponse = self.request("UpdateDomainRecord", &params, ctx).await?;
        Ok(self.echo_record(record_id.to_string(), req, wire, None))
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        let _: RecordIdResponse = self
            .request(
                "DeleteDomainRecord",
                &RecordIdParams { record_id },
                ErrorContext::record_id(record_id),
            )
            .await?;
        Ok(())
    }

    async fn get_record(&self, record_id: &str) -> Result<DnsRecord> {
        let record: AliyunRecord = self
            .request(
                "DescribeDomainRecordInfo",
                &RecordIdParams { record_id },
                ErrorContext::record_id(record_id),
            )
            .await?;
        Ok(self.aliyun_record_to_dns_record(record))
    }

    async fn list_records(&self, filters: &RecordFilters) -> Result<PaginatedResponse<DnsRecord>> {
        paginate(filters, MAX_PAGE_SIZE, |page, size| {
            self.fetch_page(filters, page, size)
        })
        .await
    }

    /// There is no zone lookup by name; a one-record listing proves the domain is reachable.
    async fn get_domain_info(&self) -> Result<DomainInfo> {
        let probe = DescribeDomainRecordsParams {
            domain_name: &self.domain_name,
            page_number: 1,
            page_size: 1,
            rr_keyword: None,
            type_key_word: None,
            value_key_word: None,
        };
        let _: DescribeDomainRecordsResponse = self
            .request(
                "DescribeDomainRecords",
                &probe,
                ErrorContext::domain(&self.domain_name),
            )
            .await?;

        Ok(DomainInfo {
            id: self.domain_name.clone(),
            name: self.domain_name.clone(),
            status: DomainStatus::Active,
            name_servers: ALIYUN_NAME_SERVERS.iter().map(ToString::to_string).collect(),
            original_name_servers: Vec::new(),
            original_registrar: None,
            created_on: None,
            modified_on: None,
            activated_on: None,
        })
    }
}
