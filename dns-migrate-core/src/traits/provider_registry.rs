//! Provider registry abstract Trait

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use dns_migrate_provider::{DnsConfig, DnsProvider, ProviderError, create_provider};

use crate::error::{CoreError, CoreResult};
use crate::types::ProviderValidation;

/// Builds provider instances from configs
///
/// The registry delegates construction here so tests can swap in mock providers.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, config: &DnsConfig) -> Result<Arc<dyn DnsProvider>, ProviderError>;
}

/// Factory backed by [`create_provider`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn create(&self, config: &DnsConfig) -> Result<Arc<dyn DnsProvider>, ProviderError> {
        create_provider(config)
    }
}

/// Provider Registry Trait
///
/// Manages named Provider instances. Registering under an existing key replaces the
/// previous instance.
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    /// Build a provider from `config` and register it
    ///
    /// # Arguments
    /// * `key` - Registry key
    /// * `config` - Provider configuration
    async fn register(&self, key: String, config: &DnsConfig)
        -> CoreResult<Arc<dyn DnsProvider>>;

    /// Register an already constructed Provider instance
    async fn register_provider(&self, key: String, provider: Arc<dyn DnsProvider>);

    /// Get Provider instance
    ///
    /// Fails with [`CoreError::ProviderNotRegistered`] for unknown keys.
    async fn get(&self, key: &str) -> CoreResult<Arc<dyn DnsProvider>>;

    /// Remove a Provider, returning whether one was registered
    async fn remove(&self, key: &str) -> bool;

    /// Remove every Provider
    async fn clear(&self);

    /// List all registered keys
    async fn keys(&self) -> Vec<String>;

    /// Snapshot of all registered Providers
    async fn entries(&self) -> Vec<(String, Arc<dyn DnsProvider>)>;

    /// Probe every registered Provider with `validate_domain`
    async fn validate_all(&self) -> BTreeMap<String, ProviderValidation> {
        let entries = self.entries().await;
        let probes = entries.iter().map(|(key, provider)| async move {
            let outcome = match provider.validate_domain().await {
                Ok(true) => ProviderValidation {
                    valid: true,
                    message: None,
                },
                Ok(false) => ProviderValidation {
                    valid: false,
                    message: Some("Domain validation failed".to_string()),
                },
                Err(e) => ProviderValidation {
                    valid: false,
                    message: Some(e.to_string()),
                },
            };
            (key.clone(), outcome)
        });
        futures::future::join_all(probes).await.into_iter().collect()
    }
}

/// In-memory Provider registry
///
/// Default implementation. Cloning shares the underlying map.
#[derive(Clone)]
pub struct InMemoryProviderRegistry {
    providers: Arc<RwLock<HashMap<String, Arc<dyn DnsProvider>>>>,
    factory: Arc<dyn ProviderFactory>,
}

impl InMemoryProviderRegistry {
    /// Create a new memory registry
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(Arc::new(DefaultProviderFactory))
    }

    /// Create a registry that builds providers through `factory`
    #[must_use]
    pub fn with_factory(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
            factory,
        }
    }
}

impl Default for InMemoryProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderRegistry for InMemoryProviderRegistry {
    async fn register(
        &self,
        key: String,
        config: &DnsConfig,
    ) -> CoreResult<Arc<dyn DnsProvider>> {
        let provider = self.factory.create(config)?;
        log::debug!("Registering {} provider as '{key}'", config.provider);
        self.providers.write().await.insert(key, provider.clone());
        Ok(provider)
    }

    async fn register_provider(&self, key: String, provider: Arc<dyn DnsProvider>) {
        self.providers.write().await.insert(key, provider);
    }

    async fn get(&self, key: &str) -> CoreResult<Arc<dyn DnsProvider>> {
        self.providers
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::ProviderNotRegistered(key.to_string()))
    }

    async fn remove(&self, key: &str) -> bool {
        self.providers.write().await.remove(key).is_some()
    }

    async fn clear(&self) {
        self.providers.write().await.clear();
    }

    async fn keys(&self) -> Vec<String> {
        self.providers.read().await.keys().cloned().collect()
    }

    async fn entries(&self) -> Vec<(String, Arc<dyn DnsProvider>)> {
        self.providers
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockProvider, mock_registry};
    use dns_migrate_provider::ProviderType;

    #[tokio::test]
    async fn register_replaces_previous_entry() {
        let registry = mock_registry();
        let first = registry
            .register("main".into(), &DnsConfig::aliyun("id", "secret", "a.com"))
            .await;
        assert!(first.is_ok(), "{:?}", first.err());
        let second = registry
            .register("main".into(), &DnsConfig::cloudflare("zone", "key", "ops@b.com"))
            .await;
        assert!(second.is_ok(), "{:?}", second.err());

        let current = registry.get("main").await;
        assert!(current.is_ok(), "main should be registered");
        let Ok(current) = current else { return };
        assert_eq!(current.provider_type(), ProviderType::Cloudflare);
        assert_eq!(registry.keys().await, vec!["main".to_string()]);
    }

    #[tokio::test]
    async fn unknown_key_is_not_registered_error() {
        let registry = InMemoryProviderRegistry::new();
        let res = registry.get("missing").await;
        assert!(matches!(res, Err(CoreError::ProviderNotRegistered(ref k)) if k == "missing"));
    }

    #[tokio::test]
    async fn incomplete_config_is_rejected_by_default_factory() {
        let registry = InMemoryProviderRegistry::new();
        let config = DnsConfig::new(ProviderType::Aliyun);
        let res = registry.register("x".into(), &config).await;
        assert!(matches!(res, Err(CoreError::Provider(ProviderError::Configuration { .. }))));
        assert!(registry.keys().await.is_empty());
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let registry = InMemoryProviderRegistry::new();
        let provider = create_provider(&DnsConfig::aliyun("id", "secret", "a.com"));
        assert!(provider.is_ok());
        let Ok(provider) = provider else { return };
        registry.register_provider("a".into(), provider.clone()).await;
        registry.register_provider("b".into(), provider).await;

        assert!(registry.remove("a").await);
        assert!(!registry.remove("a").await);
        registry.clear().await;
        assert!(registry.entries().await.is_empty());
    }

    #[tokio::test]
    async fn validate_all_reports_each_key() {
        let registry = InMemoryProviderRegistry::new();
        registry
            .register_provider("ok".into(), Arc::new(MockProvider::new("example.com")))
            .await;
        let unreachable = MockProvider::new("example.org");
        unreachable.set_domain_valid(false).await;
        registry
            .register_provider("down".into(), Arc::new(unreachable))
            .await;

        let report = registry.validate_all().await;
        assert_eq!(report.len(), 2);
        assert!(report["ok"].valid);
        assert!(!report["down"].valid);
        assert!(report["down"].message.is_some());
    }
}
