//! `migrate-to-aliyun`: move stored domains' DNS records to Aliyun DNS.
//!
//! Logs go to stderr (filter with `RUST_LOG`); the report goes to stdout.
//! Exits 0 when every domain migrated successfully, 1 otherwise.

mod adapters;
mod cli;
mod report;

use std::process::ExitCode;
use std::sync::Arc;

use adapters::JsonFileDomainStore;
use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use dns_migrate_core::traits::{DomainStore, InMemoryProviderRegistry};
use dns_migrate_core::types::ProviderType;
use dns_migrate_core::{DnsMigrator, ServiceContext};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // 日志输出到 stderr，stdout 留给迁移报告
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Migration failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every domain migrated successfully.
async fn run(args: &Args) -> Result<bool> {
    let target_config = args.target_config()?;
    let options = args.migration_options();
    tracing::info!("Starting DNS migration to Aliyun: {options:?}");

    let store = Arc::new(JsonFileDomainStore::new(&args.store));
    let ctx = Arc::new(ServiceContext::new(
        Arc::new(InMemoryProviderRegistry::new()),
        store.clone(),
    ));
    let migrator = DnsMigrator::new(ctx);

    let results = if let Some(name) = &args.domain {
        let domain = store
            .find_domain_by_name(name)
            .await?
            .with_context(|| format!("Domain {name} not found in {}", store.path().display()))?;
        tracing::info!("Migrating single domain {}", domain.domain_name);
        vec![
            migrator
                .migrate_domain(&domain.id, ProviderType::Aliyun, &target_config, &options)
                .await,
        ]
    } else {
        migrator
            .migrate_all_dns_domains(ProviderType::Aliyun, &target_config, &options)
            .await?
    };

    if results.is_empty() {
        tracing::warn!("No DNS-enabled domains found");
    }
    print!("{}", report::render_results(&results));

    if args.should_verify() {
        println!("\nVerification");
        for result in results.iter().filter(|r| r.success) {
            let check = migrator
                .verify_migration(&result.domain_id, ProviderType::Aliyun)
                .await;
            println!("{}", report::render_verification(result, &check));
        }
    }

    let all_ok = results.iter().all(|r| r.success);
    if all_ok {
        tracing::info!("Migration completed");
    } else {
        tracing::warn!("Migration finished with failures");
    }
    Ok(all_ok)
}
