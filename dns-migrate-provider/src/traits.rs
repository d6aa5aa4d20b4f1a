use async_trait::async_trait;
use futures::StreamExt;

use crate::error::{ProviderError, Result};
use crate::types::{
    BatchCreateFailure, BatchCreateResult, BatchDeleteFailure, BatchDeleteResult,
    CreateDnsRecordRequest, DnsConfig, DnsRecord, DomainInfo, EmailSettings, PaginatedResponse,
    ProviderMetadata, ProviderType, RecordFilters, UpdateDnsRecordRequest,
};

/// Maximum in-flight requests for the default batch implementations.
pub const BATCH_CONCURRENCY: usize = 5;

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    pub message: String,
}

impl RawApiError {
    #[cfg(test)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// What the failing call was about, so mapped errors can name the record or zone.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    pub record_name: Option<String>,
    pub record_id: Option<String>,
    pub domain: Option<String>,
}

impl ErrorContext {
    pub fn record(name: impl Into<String>) -> Self {
        Self {
            record_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn record_id(id: impl Into<String>) -> Self {
        Self {
            record_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ..Self::default()
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
///
/// Turns a backend's raw code/message pair into a [`ProviderError`].
pub(crate) trait ProviderErrorMapper {
    fn provider_name(&self) -> &'static str;

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// DNS 提供商 Trait
///
/// One instance is bound to one zone: the zone id / domain name comes from the
/// [`DnsConfig`] the provider was built from, so record operations only take record ids.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    fn provider_type(&self) -> ProviderType;

    /// Static metadata; callable before any instance exists.
    fn metadata() -> ProviderMetadata
    where
        Self: Sized;

    /// The config this instance was built from, secrets masked.
    fn safe_config(&self) -> DnsConfig;

    async fn create_record(&self, req: &CreateDnsRecordRequest) -> Result<DnsRecord>;

    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord>;

    async fn delete_record(&self, record_id: &str) -> Result<()>;

    async fn get_record(&self, record_id: &str) -> Result<DnsRecord>;

    /// One page of records. `per_page` above the backend limit is served by walking
    /// several backend pages.
    async fn list_records(&self, filters: &RecordFilters) -> Result<PaginatedResponse<DnsRecord>>;

    /// Whether the zone is reachable with these credentials.
    ///
    /// Rejected credentials or a missing zone give `Ok(false)`; transport failures are
    /// returned as errors.
    async fn validate_domain(&self) -> Result<bool> {
        match self.get_domain_info().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_expected() => {
                log::warn!("[{}] Domain validation failed: {e}", self.id());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_domain_info(&self) -> Result<DomainInfo>;

    /// Configure email routing for the zone. DNS-only backends keep this default.
    async fn configure_email_forwarding(&self, settings: &EmailSettings) -> Result<bool> {
        let _ = settings;
        Err(ProviderError::Unsupported {
            provider: self.id().to_string(),
            feature: "email_forwarding".to_string(),
        })
    }

    /// Every record matching `filters`, starting at `filters.page`.
    async fn list_all_records(&self, filters: &RecordFilters) -> Result<Vec<DnsRecord>> {
        let mut page = filters.page();
        let mut records = Vec::new();
        loop {
            let resp = self.list_records(&filters.at_page(page)).await?;
            let fetched = resp.items.len();
            records.extend(resp.items);
            if fetched == 0 || !resp.has_more {
                break;
            }
            page += 1;
        }
        Ok(records)
    }

    /// 批量创建 DNS 记录
    ///
    /// Best effort: every request is attempted, at most [`BATCH_CONCURRENCY`] at a time,
    /// and failures are reported per input index.
    async fn batch_create_records(
        &self,
        requests: &[CreateDnsRecordRequest],
    ) -> Result<BatchCreateResult> {
        // Materialised up front: a lazy `map` over borrowed requests is not `Send` here.
        let pending: Vec<_> = requests.iter().map(|r| self.create_record(r)).collect();
        let results: Vec<_> = futures::stream::iter(pending)
            .buffered(BATCH_CONCURRENCY)
            .collect()
            .await;

        let mut created_records = Vec::new();
        let mut failures = Vec::new();
        for (i, (result, req)) in results.into_iter().zip(requests).enumerate() {
            match result {
                Ok(record) => created_records.push(record),
                Err(e) => failures.push(BatchCreateFailure {
                    request_index: i,
                    record_name: req.name.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(BatchCreateResult {
            success_count: created_records.len(),
            failed_count: failures.len(),
            created_records,
            failures,
        })
    }

    /// 批量删除 DNS 记录
    async fn batch_delete_records(&self, record_ids: &[String]) -> Result<BatchDeleteResult> {
        let pending: Vec<_> = record_ids.iter().map(|id| self.delete_record(id)).collect();
        let outcomes: Vec<_> = futures::stream::iter(pending)
            .buffered(BATCH_CONCURRENCY)
            .collect()
            .await;

        let mut results = Vec::with_capacity(record_ids.len());
        let mut failures = Vec::new();
        for (outcome, id) in outcomes.into_iter().zip(record_ids) {
            results.push((id.clone(), outcome.is_ok()));
            if let Err(e) = outcome {
                failures.push(BatchDeleteFailure {
                    record_id: id.clone(),
                    reason: e.to_string(),
                });
            }
        }

        Ok(BatchDeleteResult {
            success_count: results.len() - failures.len(),
            failed_count: failures.len(),
            results,
            failures,
        })
    }
}
