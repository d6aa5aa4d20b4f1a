//! 类型定义模块

mod domain;
mod migration;
mod response;

pub use domain::StoredDomain;
pub use migration::{
    DomainMigrationResult, MigrationOptions, MigrationPhase, MigrationResult,
    MigrationVerification, Throttle,
};
pub use response::{ProviderSummary, ProviderValidation, SyncResult};

// Re-export provider 库的公共类型
pub use dns_migrate_provider::{
    BatchCreateResult, BatchDeleteResult, CreateDnsRecordRequest, DnsConfig, DnsRecord,
    DnsRecordType, DomainInfo, EmailSettings, PaginatedResponse, ProviderType, RecordFilters,
    UpdateDnsRecordRequest,
};
