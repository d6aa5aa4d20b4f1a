//! DNS 迁移服务
//!
//! Moves all records of a stored domain from its current provider to a target
//! provider, then points the stored domain at the target.
//!
//! A run walks `Initialized → SourceResolved → Validated`, then either reports a dry
//! run or copies records (`Migrating → Migrated`) and ends `Verified` or
//! `VerificationSkipped`. Any abort ends in `Failed`. Runs never return `Err`; the
//! outcome is always a [`DomainMigrationResult`].
//!
//! Record copying and persistence are not transactional: records already created on
//! the target stay there when a later step fails.

use std::sync::Arc;
use std::time::Instant;

use dns_migrate_provider::ErrorKind;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::services::{DnsManager, ServiceContext};
use crate::types::{
    DnsConfig, DnsRecord, DomainMigrationResult, MigrationOptions, MigrationPhase,
    MigrationResult, MigrationVerification, ProviderType, RecordFilters, StoredDomain,
};

/// Registry key unique to one run, e.g. `source_cloudflare_d1_<uuid>`.
fn run_key(role: &str, provider: ProviderType, domain_id: &str) -> String {
    format!("{role}_{provider}_{domain_id}_{}", Uuid::new_v4().simple())
}

/// Aliyun addresses zones by name; default it to the stored domain's name.
fn fill_domain_name(config: &mut DnsConfig, domain: &StoredDomain) {
    let missing = config
        .aliyun_domain_name
        .as_deref()
        .is_none_or(|n| n.trim().is_empty());
    if config.provider == ProviderType::Aliyun && missing {
        config.aliyun_domain_name = Some(domain.domain_name.clone());
    }
}

fn abort(result: &mut MigrationResult, err: &CoreError) {
    if err.is_expected() {
        log::warn!("Migration aborted: {err}");
    } else {
        log::error!("Migration aborted: {err}");
    }
    result.errors.push(err.to_string());
    result.phase = MigrationPhase::Failed;
}

/// DNS 迁移服务
pub struct DnsMigrator {
    ctx: Arc<ServiceContext>,
    manager: DnsManager,
}

/// Ephemeral registry keys of one run.
struct RunKeys {
    source: String,
    target: String,
}

impl DnsMigrator {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            manager: DnsManager::new(ctx.clone()),
            ctx,
        }
    }

    /// 迁移单个域名的 DNS 记录
    pub async fn migrate_domain(
        &self,
        domain_id: &str,
        target: ProviderType,
        target_config: &DnsConfig,
        options: &MigrationOptions,
    ) -> DomainMigrationResult {
        let started = Instant::now();
        let mut result = MigrationResult::new();
        let mut domain_name = String::new();

        match self.load_domain(domain_id).await {
            Ok(domain) => {
                result.phase = MigrationPhase::SourceResolved;
                domain_name.clone_from(&domain.domain_name);
                log::info!(
                    "Migrating {} from {} to {target}{}",
                    domain.domain_name,
                    domain.source_provider(),
                    if options.dry_run { " (dry run)" } else { "" }
                );
                if let Err(e) = self
                    .run(&domain, target, target_config, options, &mut result)
                    .await
                {
                    abort(&mut result, &e);
                }
            }
            Err(e) => abort(&mut result, &e),
        }

        result.success = result.phase != MigrationPhase::Failed && result.failed_records == 0;
        result.execution_time = started.elapsed();
        log::info!(
            "Migration of {domain_id} finished: {}/{} migrated, {} failed, phase {:?}",
            result.migrated_records,
            result.total_records,
            result.failed_records,
            result.phase
        );

        DomainMigrationResult {
            domain_id: domain_id.to_string(),
            domain_name,
            success: result.success,
            result,
        }
    }

    /// 批量迁移多个域名
    ///
    /// Domains run one after another. Without `continue_on_error` the first
    /// unsuccessful domain ends the batch.
    pub async fn migrate_multiple_domains(
        &self,
        domain_ids: &[String],
        target: ProviderType,
        target_config: &DnsConfig,
        options: &MigrationOptions,
    ) -> Vec<DomainMigrationResult> {
        let mut results = Vec::with_capacity(domain_ids.len());
        for domain_id in domain_ids {
            let result = self
                .migrate_domain(domain_id, target, target_config, options)
                .await;
            let failed = !result.success;
            results.push(result);

            if failed && !options.continue_on_error {
                log::warn!("Stopping batch after failed domain {domain_id}");
                break;
            }
        }
        results
    }

    /// 迁移所有启用了 DNS 的域名
    pub async fn migrate_all_dns_domains(
        &self,
        target: ProviderType,
        target_config: &DnsConfig,
        options: &MigrationOptions,
    ) -> CoreResult<Vec<DomainMigrationResult>> {
        let domain_ids: Vec<String> = self
            .ctx
            .domain_store
            .list_dns_enabled_domains()
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();
        log::info!("Migrating {} DNS-enabled domains", domain_ids.len());

        Ok(self
            .migrate_multiple_domains(&domain_ids, target, target_config, options)
            .await)
    }

    /// 验证迁移结果
    ///
    /// Builds the `target` config from the stored row, checks the zone is reachable and
    /// holds at least one record.
    pub async fn verify_migration(
        &self,
        domain_id: &str,
        target: ProviderType,
    ) -> MigrationVerification {
        let invalid = |message: String| MigrationVerification {
            valid: false,
            errors: vec![message],
        };

        let domain = match self.load_domain(domain_id).await {
            Ok(domain) => domain,
            Err(e) => return invalid(e.to_string()),
        };
        let mut config = domain.config_for(target);
        fill_domain_name(&mut config, &domain);

        let key = run_key("verify", target, &domain.id);
        let outcome = self.verify_registered(&key, &config).await;
        self.manager.remove_provider(&key).await;

        outcome.unwrap_or_else(|e| invalid(e.to_string()))
    }

    /// 回滚迁移
    ///
    /// Migrations keep no backup of the previous configuration, so there is nothing to
    /// restore from.
    #[allow(clippy::unused_async)]
    pub async fn rollback_migration(&self, domain_id: &str) -> CoreResult<DomainMigrationResult> {
        Err(CoreError::Unsupported(format!(
            "rollback of domain {domain_id} is not implemented"
        )))
    }

    async fn load_domain(&self, domain_id: &str) -> CoreResult<StoredDomain> {
        self.ctx
            .domain_store
            .get_domain_by_id(domain_id)
            .await?
            .ok_or_else(|| CoreError::DomainNotFound(domain_id.to_string()))
    }

    /// Structural check of the target config. No network.
    fn prepare_target_config(
        domain: &StoredDomain,
        target: ProviderType,
        config: &DnsConfig,
    ) -> CoreResult<DnsConfig> {
        if config.provider != target {
            return Err(CoreError::InvalidConfig(format!(
                "target config is for {}, expected {target}",
                config.provider
            )));
        }
        let mut config = config.clone();
        fill_domain_name(&mut config, domain);

        let errors = config.credential_errors();
        if !errors.is_empty() {
            let detail = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CoreError::InvalidConfig(detail));
        }
        Ok(config)
    }

    async fn run(
        &self,
        domain: &StoredDomain,
        target: ProviderType,
        target_config: &DnsConfig,
        options: &MigrationOptions,
        result: &mut MigrationResult,
    ) -> CoreResult<()> {
        let target_config = Self::prepare_target_config(domain, target, target_config)?;
        result.phase = MigrationPhase::Validated;

        let keys = RunKeys {
            source: run_key("source", domain.source_provider(), &domain.id),
            target: run_key("target", target, &domain.id),
        };
        let outcome = self
            .run_registered(domain, &keys, target, &target_config, options, result)
            .await;

        self.manager.remove_provider(&keys.source).await;
        self.manager.remove_provider(&keys.target).await;
        outcome
    }

    async fn run_registered(
        &self,
        domain: &StoredDomain,
        keys: &RunKeys,
        target: ProviderType,
        target_config: &DnsConfig,
        options: &MigrationOptions,
        result: &mut MigrationResult,
    ) -> CoreResult<()> {
        self.manager
            .register_provider(&keys.source, &domain.source_config())
            .await?;
        self.manager
            .register_provider(&keys.target, target_config)
            .await?;

        let records = self
            .manager
            .list_all_records(&RecordFilters::default(), Some(&keys.source))
            .await
            .map_err(|e| {
                CoreError::SyncFailed(format!("failed to list source records: {e}"))
            })?;
        result.total_records = records.len();

        if options.dry_run {
            result
                .warnings
                .push(format!("Dry run: would migrate {} records", records.len()));
            result.phase = MigrationPhase::DryRunReported;
            return Ok(());
        }

        result.phase = MigrationPhase::Migrating;
        if !self
            .copy_records(&records, &keys.target, options, result)
            .await
        {
            result.phase = MigrationPhase::Failed;
            return Ok(());
        }
        result.phase = MigrationPhase::Migrated;

        if options.verify_after_migration {
            self.verify_counts(&keys.target, result).await;
            result.phase = MigrationPhase::Verified;
        } else {
            result.phase = MigrationPhase::VerificationSkipped;
        }

        self.ctx
            .domain_store
            .update_domain_provider_config(&domain.id, target, target_config)
            .await?;
        log::info!("{} now uses {target}", domain.domain_name);
        Ok(())
    }

    /// Create every record on the target. Returns `false` when the run stopped early.
    async fn copy_records(
        &self,
        records: &[DnsRecord],
        target_key: &str,
        options: &MigrationOptions,
        result: &mut MigrationResult,
    ) -> bool {
        let throttle = options.throttle;
        for (index, batch) in records.chunks(options.batch_size.max(1)).enumerate() {
            log::debug!("Batch {}: {} records", index + 1, batch.len());

            for record in batch {
                let request = record.to_create_request();
                match self.manager.create_record(&request, Some(target_key)).await {
                    Ok(_) => {
                        result.migrated_records += 1;
                        if throttle.every > 0 && result.migrated_records % throttle.every == 0 {
                            tokio::time::sleep(throttle.pause).await;
                        }
                    }
                    Err(e) => {
                        result.failed_records += 1;
                        result
                            .errors
                            .push(format!("{} ({}): {e}", record.name, record.record_type));
                        // Rejected credentials fail every remaining record the same way.
                        let auth_failure = matches!(
                            &e,
                            CoreError::Provider(pe) if pe.kind() == ErrorKind::Authentication
                        );
                        if auth_failure {
                            log::error!("Target rejected credentials at {}: {e}", record.name);
                            return false;
                        }
                        if !options.continue_on_error {
                            log::warn!("Stopping at {}: {e}", record.name);
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// Advisory only: a mismatch or a failing re-list becomes a warning.
    async fn verify_counts(&self, target_key: &str, result: &mut MigrationResult) {
        match self
            .manager
            .list_all_records(&RecordFilters::default(), Some(target_key))
            .await
        {
            Ok(records) if records.len() != result.total_records => {
                result.warnings.push(format!(
                    "Record count mismatch: source {}, target {}",
                    result.total_records,
                    records.len()
                ));
            }
            Ok(_) => {}
            Err(e) => result.warnings.push(format!("Verification failed: {e}")),
        }
    }

    async fn verify_registered(
        &self,
        key: &str,
        config: &DnsConfig,
    ) -> CoreResult<MigrationVerification> {
        self.manager.register_provider(key, config).await?;
        if !self.manager.validate_domain(Some(key)).await? {
            return Ok(MigrationVerification {
                valid: false,
                errors: vec!["Domain validation failed".to_string()],
            });
        }

        let records = self
            .manager
            .list_all_records(&RecordFilters::default(), Some(key))
            .await?;
        if records.is_empty() {
            return Ok(MigrationVerification {
                valid: false,
                errors: vec!["No records found on target".to_string()],
            });
        }
        Ok(MigrationVerification {
            valid: true,
            errors: Vec::new(),
        })
    }
}
