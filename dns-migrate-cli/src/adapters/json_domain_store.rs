//! JSON file-based domain store
//!
//! The file holds `{"domains": [...]}`, one entry per stored domain. Updates rewrite
//! the whole file through a temporary sibling and a rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dns_migrate_core::error::{CoreError, CoreResult};
use dns_migrate_core::traits::DomainStore;
use dns_migrate_core::types::{DnsConfig, ProviderType, StoredDomain};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const MAX_STORE_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    domains: Vec<StoredDomain>,
}

/// Domain store backed by a single JSON file.
pub struct JsonFileDomainStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl JsonFileDomainStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::debug!("Domain store file: {}", path.display());
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> CoreResult<StoreFile> {
        let metadata = tokio::fs::metadata(&self.path).await.map_err(|e| {
            CoreError::StorageError(format!("Cannot open {}: {e}", self.path.display()))
        })?;
        if metadata.len() > MAX_STORE_FILE_SIZE {
            return Err(CoreError::StorageError(format!(
                "Store file too large: {} bytes (max: {MAX_STORE_FILE_SIZE} bytes)",
                metadata.len()
            )));
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to read store file: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::SerializationError(format!("Invalid store format: {e}")))
    }

    async fn save(&self, file: &StoreFile) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(file)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to write store file: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to replace store file: {e}")))
    }
}

#[async_trait]
impl DomainStore for JsonFileDomainStore {
    async fn get_domain_by_id(&self, id: &str) -> CoreResult<Option<StoredDomain>> {
        Ok(self.load().await?.domains.into_iter().find(|d| d.id == id))
    }

    async fn find_domain_by_name(&self, name: &str) -> CoreResult<Option<StoredDomain>> {
        let name = name.trim_end_matches('.');
        Ok(self
            .load()
            .await?
            .domains
            .into_iter()
            .find(|d| d.domain_name.eq_ignore_ascii_case(name)))
    }

    async fn list_dns_enabled_domains(&self) -> CoreResult<Vec<StoredDomain>> {
        Ok(self
            .load()
            .await?
            .domains
            .into_iter()
            .filter(|d| d.enable_dns)
            .collect())
    }

    async fn update_domain_provider_config(
        &self,
        id: &str,
        provider: ProviderType,
        config: &DnsConfig,
    ) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        let domain = file
            .domains
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| CoreError::DomainNotFound(id.to_string()))?;
        domain.apply_provider_config(provider, config);
        self.save(&file).await?;
        tracing::info!("Stored domain {id} now points at {provider}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "domains": [
            {"id": "d1", "domain_name": "example.com", "enable_dns": true,
             "cf_zone_id": "zone", "cf_api_key": "key", "cf_email": "ops@example.com"},
            {"id": "d2", "domain_name": "Example.org", "enable_dns": false}
        ]
    }"#;

    async fn store_with_fixture() -> (JsonFileDomainStore, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("domains.json");
        tokio::fs::write(&path, FIXTURE).await.unwrap();
        (JsonFileDomainStore::new(path), tmp)
    }

    #[tokio::test]
    async fn looks_up_by_id_and_name() {
        let (store, _tmp) = store_with_fixture().await;

        let by_id = store.get_domain_by_id("d1").await;
        assert!(matches!(by_id, Ok(Some(ref d)) if d.domain_name == "example.com"));

        let by_name = store.find_domain_by_name("example.org.").await;
        assert!(matches!(by_name, Ok(Some(ref d)) if d.id == "d2"));

        let missing = store.get_domain_by_id("d9").await;
        assert!(matches!(missing, Ok(None)));
    }

    #[tokio::test]
    async fn lists_only_dns_enabled() {
        let (store, _tmp) = store_with_fixture().await;
        let res = store.list_dns_enabled_domains().await;
        assert!(res.is_ok(), "{res:?}");
        let Ok(domains) = res else { return };
        assert_eq!(domains.len(), 1);
        assert_eq!(domains[0].id, "d1");
    }

    #[tokio::test]
    async fn update_persists_to_disk() {
        let (store, _tmp) = store_with_fixture().await;
        let config = DnsConfig::aliyun("LTAI", "secret", "example.com");
        let res = store
            .update_domain_provider_config("d1", ProviderType::Aliyun, &config)
            .await;
        assert!(res.is_ok(), "{res:?}");

        let reopened = JsonFileDomainStore::new(store.path());
        let domain = reopened.get_domain_by_id("d1").await;
        assert!(matches!(domain, Ok(Some(ref d))
            if d.dns_provider == Some(ProviderType::Aliyun)
                && d.aliyun_access_key_id.as_deref() == Some("LTAI")
                && d.cf_zone_id.as_deref() == Some("zone")));
    }

    #[tokio::test]
    async fn update_of_unknown_domain_fails() {
        let (store, _tmp) = store_with_fixture().await;
        let config = DnsConfig::new(ProviderType::Aliyun);
        let res = store
            .update_domain_provider_config("nope", ProviderType::Aliyun, &config)
            .await;
        assert!(matches!(res, Err(CoreError::DomainNotFound(_))));
    }

    #[tokio::test]
    async fn missing_file_is_a_storage_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileDomainStore::new(tmp.path().join("absent.json"));
        let res = store.list_dns_enabled_domains().await;
        assert!(matches!(res, Err(CoreError::StorageError(_))));
    }

    #[tokio::test]
    async fn malformed_file_is_a_serialization_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("domains.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        let res = JsonFileDomainStore::new(path).get_domain_by_id("d1").await;
        assert!(matches!(res, Err(CoreError::SerializationError(_))));
    }
}
