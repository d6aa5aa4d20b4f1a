//! DNS 记录管理服务

use std::collections::BTreeMap;
use std::sync::Arc;

use dns_migrate_provider::DnsProvider;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{
    BatchCreateResult, BatchDeleteResult, CreateDnsRecordRequest, DnsConfig, DnsRecord,
    DomainInfo, EmailSettings, PaginatedResponse, ProviderSummary, ProviderValidation,
    RecordFilters, SyncResult, UpdateDnsRecordRequest,
};

/// DNS 记录管理服务
///
/// Every record operation takes an optional provider key; `None` uses the default set
/// with [`set_default_provider`](Self::set_default_provider).
pub struct DnsManager {
    ctx: Arc<ServiceContext>,
    default_key: RwLock<Option<String>>,
}

impl DnsManager {
    /// 创建 DNS 服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            default_key: RwLock::new(None),
        }
    }

    // ===== Provider 管理 =====

    /// Build a provider from `config` and register it under `key`.
    pub async fn register_provider(
        &self,
        key: &str,
        config: &DnsConfig,
    ) -> CoreResult<Arc<dyn DnsProvider>> {
        self.ctx
            .provider_registry
            .register(key.to_string(), config)
            .await
    }

    /// Unregister `key`, dropping it as default if it was one.
    pub async fn remove_provider(&self, key: &str) -> bool {
        let mut default_key = self.default_key.write().await;
        if default_key.as_deref() == Some(key) {
            *default_key = None;
        }
        self.ctx.provider_registry.remove(key).await
    }

    pub async fn set_default_provider(&self, key: &str) -> CoreResult<()> {
        self.ctx.get_provider(key).await?;
        *self.default_key.write().await = Some(key.to_string());
        Ok(())
    }

    pub async fn default_provider(&self) -> Option<String> {
        self.default_key.read().await.clone()
    }

    /// Explicit key first, then the default.
    pub async fn resolve(&self, key: Option<&str>) -> CoreResult<Arc<dyn DnsProvider>> {
        match key {
            Some(k) => self.ctx.get_provider(k).await,
            None => {
                let default_key = self.default_key.read().await.clone();
                let k = default_key.ok_or(CoreError::NoProviderSelected)?;
                self.ctx.get_provider(&k).await
            }
        }
    }

    /// Registered providers with masked configs, ordered by key.
    pub async fn list_providers(&self) -> Vec<ProviderSummary> {
        let mut summaries: Vec<_> = self
            .ctx
            .provider_registry
            .entries()
            .await
            .into_iter()
            .map(|(key, provider)| ProviderSummary {
                key,
                provider: provider.provider_type(),
                config: provider.safe_config(),
            })
            .collect();
        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        summaries
    }

    pub async fn validate_all_providers(&self) -> BTreeMap<String, ProviderValidation> {
        self.ctx.provider_registry.validate_all().await
    }

    // ===== 记录操作 =====

    pub async fn create_record(
        &self,
        request: &CreateDnsRecordRequest,
        key: Option<&str>,
    ) -> CoreResult<DnsRecord> {
        let provider = self.resolve(key).await?;
        Ok(provider.create_record(request).await?)
    }

    pub async fn update_record(
        &self,
        record_id: &str,
        request: &UpdateDnsRecordRequest,
        key: Option<&str>,
    ) -> CoreResult<DnsRecord> {
        let provider = self.resolve(key).await?;
        Ok(provider.update_record(record_id, request).await?)
    }

    pub async fn delete_record(&self, record_id: &str, key: Option<&str>) -> CoreResult<()> {
        let provider = self.resolve(key).await?;
        Ok(provider.delete_record(record_id).await?)
    }

    pub async fn get_record(&self, record_id: &str, key: Option<&str>) -> CoreResult<DnsRecord> {
        let provider = self.resolve(key).await?;
        Ok(provider.get_record(record_id).await?)
    }

    pub async fn list_records(
        &self,
        filters: &RecordFilters,
        key: Option<&str>,
    ) -> CoreResult<PaginatedResponse<DnsRecord>> {
        let provider = self.resolve(key).await?;
        Ok(provider.list_records(filters).await?)
    }

    /// Every matching record across all pages.
    pub async fn list_all_records(
        &self,
        filters: &RecordFilters,
        key: Option<&str>,
    ) -> CoreResult<Vec<DnsRecord>> {
        let provider = self.resolve(key).await?;
        Ok(provider.list_all_records(filters).await?)
    }

    pub async fn validate_domain(&self, key: Option<&str>) -> CoreResult<bool> {
        let provider = self.resolve(key).await?;
        Ok(provider.validate_domain().await?)
    }

    pub async fn get_domain_info(&self, key: Option<&str>) -> CoreResult<DomainInfo> {
        let provider = self.resolve(key).await?;
        Ok(provider.get_domain_info().await?)
    }

    pub async fn configure_email_forwarding(
        &self,
        settings: &EmailSettings,
        key: Option<&str>,
    ) -> CoreResult<bool> {
        let provider = self.resolve(key).await?;
        Ok(provider.configure_email_forwarding(settings).await?)
    }

    // ===== 批量操作 =====

    /// 批量创建 DNS 记录
    pub async fn batch_create_records(
        &self,
        requests: &[CreateDnsRecordRequest],
        key: Option<&str>,
    ) -> CoreResult<BatchCreateResult> {
        let provider = self.resolve(key).await?;
        let result = provider.batch_create_records(requests).await?;
        if result.failed_count > 0 {
            log::warn!(
                "Batch create on {}: {} succeeded, {} failed",
                provider.id(),
                result.success_count,
                result.failed_count
            );
        }
        Ok(result)
    }

    /// 批量删除 DNS 记录
    pub async fn batch_delete_records(
        &self,
        record_ids: &[String],
        key: Option<&str>,
    ) -> CoreResult<BatchDeleteResult> {
        let provider = self.resolve(key).await?;
        Ok(provider.batch_delete_records(record_ids).await?)
    }

    /// Copy every record matching `filters` from one provider to another.
    ///
    /// Only a failing source listing fails the call; per-record failures are collected
    /// as `"<name>: <error>"`.
    pub async fn sync_records_to_provider(
        &self,
        from: &str,
        to: &str,
        filters: &RecordFilters,
    ) -> CoreResult<SyncResult> {
        let source = self.ctx.get_provider(from).await?;
        let target = self.ctx.get_provider(to).await?;

        let records = source.list_all_records(filters).await.map_err(|e| {
            CoreError::SyncFailed(format!("failed to list records from '{from}': {e}"))
        })?;

        let mut result = SyncResult::default();
        for record in &records {
            match target.create_record(&record.to_create_request()).await {
                Ok(_) => result.success += 1,
                Err(e) => {
                    result.failed += 1;
                    result.errors.push(format!("{}: {e}", record.name));
                }
            }
        }

        log::info!(
            "Synced {from} -> {to}: {} created, {} failed",
            result.success,
            result.failed
        );
        Ok(result)
    }
}
