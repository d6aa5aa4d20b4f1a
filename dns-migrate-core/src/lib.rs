//! DNS Migrate Core Library
//!
//! Business logic on top of `dns-migrate-provider`:
//! - Provider registry (named, process-local provider instances)
//! - DNS manager (CRUD forwarding, batch helpers, cross-provider sync)
//! - DNS migrator (moves a domain's records to another provider)
//!
//! Storage is abstracted through the [`DomainStore`] trait so the same services run
//! against a database, a JSON file or an in-memory test double.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{DnsManager, DnsMigrator, ServiceContext};
pub use traits::{DomainStore, InMemoryProviderRegistry, ProviderFactory, ProviderRegistry};
