//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dns_migrate_provider::{
    CreateDnsRecordRequest, DnsConfig, DnsProvider, DnsRecord, DnsRecordType, DomainInfo,
    DomainStatus, PaginatedResponse, ProviderError, ProviderFeatures, ProviderLimits,
    ProviderMetadata, ProviderType, RecordFilters, Result as ProviderResult,
    UpdateDnsRecordRequest,
};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::{DomainStore, InMemoryProviderRegistry, ProviderFactory};
use crate::types::StoredDomain;

// ===== MockProvider =====

/// In-memory zone with failure injection.
pub struct MockProvider {
    provider_type: ProviderType,
    zone: String,
    records: RwLock<Vec<DnsRecord>>,
    next_id: AtomicUsize,
    create_calls: AtomicUsize,
    /// create_record fails for these record names
    failing_names: RwLock<HashSet<String>>,
    list_error: RwLock<bool>,
    /// every create_record fails with InvalidCredentials
    reject_credentials: RwLock<bool>,
    domain_valid: RwLock<bool>,
}

impl MockProvider {
    pub fn new(zone: &str) -> Self {
        Self::with_type(ProviderType::Cloudflare, zone)
    }

    pub fn with_type(provider_type: ProviderType, zone: &str) -> Self {
        Self {
            provider_type,
            zone: zone.to_string(),
            records: RwLock::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            create_calls: AtomicUsize::new(0),
            failing_names: RwLock::new(HashSet::new()),
            list_error: RwLock::new(false),
            reject_credentials: RwLock::new(false),
            domain_valid: RwLock::new(true),
        }
    }

    /// Add a record directly, bypassing failure injection.
    pub async fn seed(&self, record_type: DnsRecordType, name: &str, content: &str) {
        let req = CreateDnsRecordRequest::new(record_type, name, content);
        let record = self.store(&req);
        self.records.write().await.push(record);
    }

    pub async fn fail_create_for(&self, name: &str) {
        self.failing_names.write().await.insert(name.to_string());
    }

    pub async fn set_list_error(&self, fail: bool) {
        *self.list_error.write().await = fail;
    }

    pub async fn set_reject_credentials(&self, reject: bool) {
        *self.reject_credentials.write().await = reject;
    }

    pub async fn set_domain_valid(&self, valid: bool) {
        *self.domain_valid.write().await = valid;
    }

    pub async fn records(&self) -> Vec<DnsRecord> {
        self.records.read().await.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn store(&self, req: &CreateDnsRecordRequest) -> DnsRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        DnsRecord {
            id: format!("{}-{id}", self.provider_type),
            zone_id: Some(format!("zone-{}", self.zone)),
            zone_name: Some(self.zone.clone()),
            name: req.name.clone(),
            record_type: req.record_type.clone(),
            content: req.content.clone(),
            ttl: req.ttl.unwrap_or(600),
            priority: req.priority,
            comment: req.comment.clone(),
            tags: req.tags.clone(),
            proxied: req.proxied.unwrap_or(false),
            proxiable: false,
            created_on: None,
            modified_on: None,
            meta: None,
        }
    }

    fn not_found(&self, record_id: &str) -> ProviderError {
        ProviderError::RecordNotFound {
            provider: self.id().to_string(),
            record_id: record_id.to_string(),
            raw_message: None,
        }
    }
}

#[async_trait]
impl DnsProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.provider_type.as_str()
    }

    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Cloudflare,
            name: "Mock".to_string(),
            description: "In-memory test provider".to_string(),
            required_fields: Vec::new(),
            features: ProviderFeatures::default(),
            limits: ProviderLimits {
                max_page_size: 100,
                min_ttl: 1,
                max_ttl: 86_400,
                default_ttl: 600,
            },
        }
    }

    fn safe_config(&self) -> DnsConfig {
        DnsConfig {
            cf_zone_id: Some(format!("zone-{}", self.zone)),
            cf_api_key: Some("***cret".to_string()),
            ..DnsConfig::new(self.provider_type)
        }
    }

    async fn create_record(&self, req: &CreateDnsRecordRequest) -> ProviderResult<DnsRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if *self.reject_credentials.read().await {
            return Err(ProviderError::InvalidCredentials {
                provider: self.id().to_string(),
                raw_message: Some("signature does not match".to_string()),
            });
        }
        if self.failing_names.read().await.contains(&req.name) {
            return Err(ProviderError::RecordExists {
                provider: self.id().to_string(),
                record_name: req.name.clone(),
                raw_message: Some("record already exists".to_string()),
            });
        }
        let record = self.store(req);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> ProviderResult<DnsRecord> {
        let mut records = self.records.write().await;
        let Some(existing) = records.iter_mut().find(|r| r.id == record_id) else {
            return Err(self.not_found(record_id));
        };
        existing.content.clone_from(&req.content);
        existing.ttl = req.ttl.unwrap_or(existing.ttl);
        Ok(existing.clone())
    }

    async fn delete_record(&self, record_id: &str) -> ProviderResult<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != record_id);
        if records.len() == before {
            return Err(self.not_found(record_id));
        }
        Ok(())
    }

    async fn get_record(&self, record_id: &str) -> ProviderResult<DnsRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == record_id)
            .cloned()
            .ok_or_else(|| self.not_found(record_id))
    }

    async fn list_records(
        &self,
        filters: &RecordFilters,
    ) -> ProviderResult<PaginatedResponse<DnsRecord>> {
        if *self.list_error.read().await {
            return Err(ProviderError::NetworkError {
                provider: self.id().to_string(),
                detail: "connection reset".to_string(),
            });
        }
        let matching: Vec<DnsRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| filters.record_type.as_ref().is_none_or(|t| &r.record_type == t))
            .filter(|r| filters.name.as_ref().is_none_or(|n| &r.name == n))
            .cloned()
            .collect();
        let (page, per_page) = (filters.page(), filters.per_page());
        let total = u32::try_from(matching.len()).unwrap_or(u32::MAX);
        let items = matching
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect();
        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    async fn get_domain_info(&self) -> ProviderResult<DomainInfo> {
        if !*self.domain_valid.read().await {
            return Err(ProviderError::DomainNotFound {
                provider: self.id().to_string(),
                domain: self.zone.clone(),
                raw_message: None,
            });
        }
        Ok(DomainInfo {
            id: format!("zone-{}", self.zone),
            name: self.zone.clone(),
            status: DomainStatus::Active,
            name_servers: Vec::new(),
            original_name_servers: Vec::new(),
            original_registrar: None,
            created_on: None,
            modified_on: None,
            activated_on: None,
        })
    }
}

// ===== MockProviderFactory =====

/// Hands out pre-built mocks by provider type, or a fresh empty mock otherwise.
/// Incomplete configs are rejected like the real factory does.
#[derive(Default)]
pub struct MockProviderFactory {
    providers: HashMap<ProviderType, Arc<MockProvider>>,
}

impl MockProviderFactory {
    pub fn with(mut self, provider: Arc<MockProvider>) -> Self {
        self.providers.insert(provider.provider_type, provider);
        self
    }
}

impl ProviderFactory for MockProviderFactory {
    fn create(&self, config: &DnsConfig) -> Result<Arc<dyn DnsProvider>, ProviderError> {
        config.ensure_complete()?;
        let provider = self.providers.get(&config.provider).cloned().unwrap_or_else(|| {
            Arc::new(MockProvider::with_type(config.provider, "mock.example"))
        });
        Ok(provider)
    }
}

pub fn mock_registry() -> InMemoryProviderRegistry {
    registry_with(Vec::new())
}

pub fn registry_with(providers: Vec<Arc<MockProvider>>) -> InMemoryProviderRegistry {
    let factory = providers
        .into_iter()
        .fold(MockProviderFactory::default(), MockProviderFactory::with);
    InMemoryProviderRegistry::with_factory(Arc::new(factory))
}

// ===== MockDomainStore =====

pub struct MockDomainStore {
    domains: RwLock<HashMap<String, StoredDomain>>,
    /// 如果 Some，update 时返回此错误
    update_error: RwLock<Option<String>>,
    update_calls: AtomicUsize,
}

impl MockDomainStore {
    pub fn new() -> Self {
        Self {
            domains: RwLock::new(HashMap::new()),
            update_error: RwLock::new(None),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub async fn insert(&self, domain: StoredDomain) {
        self.domains.write().await.insert(domain.id.clone(), domain);
    }

    pub async fn domain(&self, id: &str) -> Option<StoredDomain> {
        self.domains.read().await.get(id).cloned()
    }

    pub async fn set_update_error(&self, err: Option<String>) {
        *self.update_error.write().await = err;
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainStore for MockDomainStore {
    async fn get_domain_by_id(&self, id: &str) -> CoreResult<Option<StoredDomain>> {
        Ok(self.domains.read().await.get(id).cloned())
    }

    async fn find_domain_by_name(&self, name: &str) -> CoreResult<Option<StoredDomain>> {
        Ok(self
            .domains
            .read()
            .await
            .values()
            .find(|d| d.domain_name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list_dns_enabled_domains(&self) -> CoreResult<Vec<StoredDomain>> {
        let mut domains: Vec<_> = self
            .domains
            .read()
            .await
            .values()
            .filter(|d| d.enable_dns)
            .cloned()
            .collect();
        domains.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(domains)
    }

    async fn update_domain_provider_config(
        &self,
        id: &str,
        provider: ProviderType,
        config: &DnsConfig,
    ) -> CoreResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref msg) = *self.update_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        let mut domains = self.domains.write().await;
        let domain = domains
            .get_mut(id)
            .ok_or_else(|| CoreError::DomainNotFound(id.to_string()))?;
        domain.apply_provider_config(provider, config);
        Ok(())
    }
}

// ===== 便捷工厂方法 =====

/// A Cloudflare-hosted domain row with complete credentials.
pub fn cloudflare_domain(id: &str, name: &str) -> StoredDomain {
    StoredDomain {
        cf_zone_id: Some(format!("zone-{id}")),
        cf_api_key: Some("cf-key".to_string()),
        cf_email: Some("ops@example.com".to_string()),
        ..StoredDomain::new(id, name)
    }
}

pub fn create_test_context(
    store: Arc<MockDomainStore>,
    registry: InMemoryProviderRegistry,
) -> Arc<ServiceContext> {
    Arc::new(ServiceContext::new(Arc::new(registry), store))
}
