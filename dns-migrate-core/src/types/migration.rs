//! 迁移相关类型

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pause inserted between successful creates to stay under target rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throttle {
    /// Pause after every `every`-th success. `0` disables throttling.
    pub every: usize,
    pub pause: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            every: 5,
            pause: Duration::from_secs(1),
        }
    }
}

/// 迁移选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationOptions {
    /// Only count the source records; write nothing.
    pub dry_run: bool,
    pub batch_size: usize,
    /// Keep going after a failed record (or a failed domain in multi-domain runs).
    pub continue_on_error: bool,
    /// Re-list the target afterwards and warn on a count mismatch.
    pub verify_after_migration: bool,
    pub throttle: Throttle,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: 10,
            continue_on_error: false,
            verify_after_migration: true,
            throttle: Throttle::default(),
        }
    }
}

/// Furthest point a migration run reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    Initialized,
    SourceResolved,
    Validated,
    DryRunReported,
    Migrating,
    Migrated,
    Verified,
    VerificationSkipped,
    Failed,
}

/// 单个域名的迁移统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResult {
    pub success: bool,
    pub total_records: usize,
    pub migrated_records: usize,
    /// On an early abort only the record that stopped the run is counted.
    pub failed_records: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub execution_time: Duration,
    pub phase: MigrationPhase,
}

impl MigrationResult {
    pub(crate) fn new() -> Self {
        Self {
            success: false,
            total_records: 0,
            migrated_records: 0,
            failed_records: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            execution_time: Duration::ZERO,
            phase: MigrationPhase::Initialized,
        }
    }

    /// Migrated share of the source records, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.migrated_records as f64 / self.total_records as f64 * 100.0;
        rate
    }
}

/// 域名迁移结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMigrationResult {
    pub domain_id: String,
    /// Empty when the domain could not be loaded.
    pub domain_name: String,
    pub success: bool,
    pub result: MigrationResult,
}

/// Post-migration health check of a domain on its new provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationVerification {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = MigrationOptions::default();
        assert!(!options.dry_run);
        assert_eq!(options.batch_size, 10);
        assert!(!options.continue_on_error);
        assert!(options.verify_after_migration);
        assert_eq!(options.throttle.every, 5);
        assert_eq!(options.throttle.pause, Duration::from_secs(1));
    }

    #[test]
    fn partial_options_fill_defaults() {
        let options: MigrationOptions = serde_json::from_str(r#"{"dry_run":true}"#).unwrap();
        assert!(options.dry_run);
        assert_eq!(options.batch_size, 10);
        assert!(options.verify_after_migration);
    }

    #[test]
    fn success_rate_handles_empty_domains() {
        let mut result = MigrationResult::new();
        assert!(result.success_rate().abs() < f64::EPSILON);
        result.total_records = 4;
        result.migrated_records = 3;
        assert!((result.success_rate() - 75.0).abs() < f64::EPSILON);
    }
}
