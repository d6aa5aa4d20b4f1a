//! Domain persistence abstract Trait

use async_trait::async_trait;

use dns_migrate_provider::{DnsConfig, ProviderType};

use crate::error::CoreResult;
use crate::types::StoredDomain;

/// Domain storage Trait
///
/// The migrator reads domains through this trait and writes back the new provider
/// configuration once records have been copied.
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Get domain based on ID
    async fn get_domain_by_id(&self, id: &str) -> CoreResult<Option<StoredDomain>>;

    /// Get domain by its name (case-insensitive)
    async fn find_domain_by_name(&self, name: &str) -> CoreResult<Option<StoredDomain>>;

    /// All domains with DNS management enabled
    async fn list_dns_enabled_domains(&self) -> CoreResult<Vec<StoredDomain>>;

    /// Point a domain at `provider` and store that provider's credential fields
    ///
    /// # Arguments
    /// * `id` - Domain ID
    /// * `provider` - new DNS host
    /// * `config` - its configuration; only the fields of `provider` are written
    async fn update_domain_provider_config(
        &self,
        id: &str,
        provider: ProviderType,
        config: &DnsConfig,
    ) -> CoreResult<()>;
}
