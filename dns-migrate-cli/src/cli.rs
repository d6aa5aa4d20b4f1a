//! Command-line arguments

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use dns_migrate_core::types::{DnsConfig, MigrationOptions, ProviderType};
use dns_migrate_provider::DEFAULT_ALIYUN_REGION;

/// Migrate the DNS records of stored domains to Aliyun DNS.
///
/// Without `--domain`, every domain with DNS enabled is migrated in turn.
#[derive(Debug, Parser)]
#[command(name = "migrate-to-aliyun", version, about)]
pub struct Args {
    /// Only count the records that would be migrated
    #[arg(long)]
    pub dry_run: bool,

    /// Migrate a single domain by name
    #[arg(long, value_name = "NAME")]
    pub domain: Option<String>,

    /// Records per batch
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub batch_size: u32,

    /// Keep going after a failed record or domain
    #[arg(long)]
    pub continue_on_error: bool,

    /// Skip record-count and post-migration verification
    #[arg(long)]
    pub no_verify: bool,

    /// JSON file holding the stored domains
    #[arg(long, env = "DNS_MIGRATE_STORE", default_value = "domains.json")]
    pub store: PathBuf,

    #[arg(long, env = "ALIYUN_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    #[arg(long, env = "ALIYUN_ACCESS_KEY_SECRET", hide_env_values = true)]
    pub access_key_secret: Option<String>,

    #[arg(long, env = "ALIYUN_REGION", default_value = DEFAULT_ALIYUN_REGION)]
    pub region: String,
}

impl Args {
    /// Aliyun target config. The domain name is filled in per domain by the migrator.
    pub fn target_config(&self) -> Result<DnsConfig> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };
        let (Some(id), Some(secret)) = (
            non_blank(&self.access_key_id),
            non_blank(&self.access_key_secret),
        ) else {
            bail!(
                "Aliyun configuration incomplete: \
                 set ALIYUN_ACCESS_KEY_ID and ALIYUN_ACCESS_KEY_SECRET"
            );
        };

        Ok(DnsConfig {
            aliyun_access_key_id: Some(id),
            aliyun_access_key_secret: Some(secret),
            aliyun_region: Some(self.region.clone()),
            ..DnsConfig::new(ProviderType::Aliyun)
        })
    }

    pub fn migration_options(&self) -> MigrationOptions {
        MigrationOptions {
            dry_run: self.dry_run,
            batch_size: self.batch_size as usize,
            continue_on_error: self.continue_on_error,
            verify_after_migration: !self.no_verify,
            ..MigrationOptions::default()
        }
    }

    /// Post-migration `verify_migration` runs only for real, verified runs.
    pub fn should_verify(&self) -> bool {
        !self.no_verify && !self.dry_run
    }
}
