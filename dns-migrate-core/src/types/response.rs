//! 组合操作的结果类型

use serde::{Deserialize, Serialize};

use dns_migrate_provider::{DnsConfig, ProviderType};

/// Outcome of copying records from one provider to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: usize,
    pub failed: usize,
    /// `"<record name>: <error>"` per failed record.
    pub errors: Vec<String>,
}

/// Reachability of one registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A registered provider with its secrets masked.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub key: String,
    pub provider: ProviderType,
    pub config: DnsConfig,
}
