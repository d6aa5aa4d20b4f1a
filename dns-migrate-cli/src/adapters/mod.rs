//! Storage adapters for the CLI

mod json_domain_store;

pub use json_domain_store::JsonFileDomainStore;
