//! Storage layer abstraction trait definition

mod domain_store;
mod provider_registry;

pub use domain_store::DomainStore;
pub use provider_registry::{
    DefaultProviderFactory, InMemoryProviderRegistry, ProviderFactory, ProviderRegistry,
};
