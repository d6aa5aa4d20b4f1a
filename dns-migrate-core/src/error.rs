//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use dns_migrate_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// No provider is registered under the key
    #[error("Provider not registered: {0}")]
    ProviderNotRegistered(String),

    /// Neither an explicit key nor a default provider was given
    #[error("No DNS provider selected and no default provider set")]
    NoProviderSelected,

    /// Domain not found in storage
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// Target configuration failed structural validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The source listing of a sync or migration failed
    #[error("Sync failed: {0}")]
    SyncFailed(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Operation exists in the API but is not implemented
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ProviderNotRegistered(_)
            | Self::NoProviderSelected
            | Self::DomainNotFound(_)
            | Self::InvalidConfig(_)
            | Self::Unsupported(_) => true,
            Self::Provider(e) => e.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
