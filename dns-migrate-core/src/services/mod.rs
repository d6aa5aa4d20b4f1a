//! 业务逻辑服务层

mod dns_manager;
mod migrator;

pub use dns_manager::DnsManager;
pub use migrator::DnsMigrator;

use std::sync::Arc;

use dns_migrate_provider::DnsProvider;

use crate::error::CoreResult;
use crate::traits::{DomainStore, ProviderRegistry};

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入平台特定的存储实现。
pub struct ServiceContext {
    /// Provider 注册表
    pub provider_registry: Arc<dyn ProviderRegistry>,
    /// 域名存储
    pub domain_store: Arc<dyn DomainStore>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        provider_registry: Arc<dyn ProviderRegistry>,
        domain_store: Arc<dyn DomainStore>,
    ) -> Self {
        Self {
            provider_registry,
            domain_store,
        }
    }

    /// 获取 Provider 实例
    pub async fn get_provider(&self, key: &str) -> CoreResult<Arc<dyn DnsProvider>> {
        self.provider_registry.get(key).await
    }
}
