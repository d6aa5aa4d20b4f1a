//! Human-readable migration report

use std::fmt;

use dns_migrate_core::types::{DomainMigrationResult, MigrationVerification};

/// Totals across all migrated domains.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_domains: usize,
    pub successful_domains: usize,
    pub total_records: usize,
    pub migrated_records: usize,
    pub failed_records: usize,
}

impl Summary {
    pub fn from_results(results: &[DomainMigrationResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            acc.total_domains += 1;
            acc.successful_domains += usize::from(r.success);
            acc.total_records += r.result.total_records;
            acc.migrated_records += r.result.migrated_records;
            acc.failed_records += r.result.failed_records;
            acc
        })
    }

    pub fn domain_success_rate(&self) -> f64 {
        percentage(self.successful_domains, self.total_domains)
    }

    pub fn record_success_rate(&self) -> f64 {
        percentage(self.migrated_records, self.total_records)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Per-domain stats followed by overall totals.
pub fn render_results(results: &[DomainMigrationResult]) -> String {
    Report(results).to_string()
}

struct Report<'a>(&'a [DomainMigrationResult]);

impl Report<'_> {
    fn write_domain(f: &mut fmt::Formatter<'_>, r: &DomainMigrationResult) -> fmt::Result {
        let m = &r.result;
        let name = if r.domain_name.is_empty() {
            &r.domain_id
        } else {
            &r.domain_name
        };
        writeln!(f, "\nDomain: {name}")?;
        writeln!(
            f,
            "  Status:    {}",
            if r.success { "succeeded" } else { "failed" }
        )?;
        writeln!(f, "  Records:   {}", m.total_records)?;
        writeln!(f, "  Migrated:  {}", m.migrated_records)?;
        writeln!(f, "  Failed:    {}", m.failed_records)?;
        writeln!(f, "  Duration:  {}ms", m.execution_time.as_millis())?;
        write_list(f, "Errors", &m.errors)?;
        write_list(f, "Warnings", &m.warnings)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, title: &str, lines: &[String]) -> fmt::Result {
    if lines.is_empty() {
        return Ok(());
    }
    writeln!(f, "  {title}:")?;
    for line in lines {
        writeln!(f, "    - {line}")?;
    }
    Ok(())
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration results")?;
        writeln!(f, "{}", "=".repeat(50))?;
        for r in self.0 {
            Self::write_domain(f, r)?;
        }

        let s = Summary::from_results(self.0);
        writeln!(f, "\nOverall")?;
        writeln!(f, "  Domains:             {}", s.total_domains)?;
        writeln!(f, "  Successful domains:  {}", s.successful_domains)?;
        writeln!(f, "  Domain success rate: {:.2}%", s.domain_success_rate())?;
        writeln!(f, "  Records:             {}", s.total_records)?;
        writeln!(f, "  Migrated records:    {}", s.migrated_records)?;
        writeln!(f, "  Failed records:      {}", s.failed_records)?;
        writeln!(f, "  Record success rate: {:.2}%", s.record_success_rate())
    }
}

pub fn render_verification(
    result: &DomainMigrationResult,
    check: &MigrationVerification,
) -> String {
    if check.valid {
        format!("  {}: verified", result.domain_name)
    } else {
        format!(
            "  {}: verification failed ({})",
            result.domain_name,
            check.errors.join("; ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dns_migrate_core::types::MigrationResult;

    fn result(name: &str, total: usize, migrated: usize, failed: usize) -> DomainMigrationResult {
        let errors: Vec<String> = (0..failed).map(|_| format!("{name} (A): boom")).collect();
        let phase = if failed == 0 { "verified" } else { "failed" };
        let m: MigrationResult = serde_json::from_value(serde_json::json!({
            "success": failed == 0,
            "total_records": total,
            "migrated_records": migrated,
            "failed_records": failed,
            "errors": errors,
            "warnings": [],
            "execution_time": {"secs": 0, "nanos": 1_500_000},
            "phase": phase,
        }))
        .unwrap();
        DomainMigrationResult {
            domain_id: format!("id-{name}"),
            domain_name: name.to_string(),
            success: m.success,
            result: m,
        }
    }

    #[test]
    fn summary_totals_and_rates() {
        let results = vec![result("a.com", 4, 4, 0), result("b.com", 6, 2, 1)];
        let s = Summary::from_results(&results);
        assert_eq!(
            s,
            Summary {
                total_domains: 2,
                successful_domains: 1,
                total_records: 10,
                migrated_records: 6,
                failed_records: 1,
            }
        );
        assert!((s.domain_success_rate() - 50.0).abs() < f64::EPSILON);
        assert!((s.record_success_rate() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_run_has_zero_rates() {
        let s = Summary::from_results(&[]);
        assert!(s.record_success_rate().abs() < f64::EPSILON);
        assert!(s.domain_success_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn report_lists_errors_and_totals() {
        let text = render_results(&[result("b.com", 6, 2, 1)]);
        assert!(text.contains("Domain: b.com"));
        assert!(text.contains("    - b.com (A): boom"));
        assert!(text.contains("Duration:  1ms"));
        assert!(text.contains("Record success rate: 33.33%"));
    }

    #[test]
    fn clean_domain_has_no_error_or_warning_sections() {
        let text = render_results(&[result("a.com", 2, 2, 0)]);
        assert!(text.starts_with("Migration results\n"));
        assert!(!text.contains("Errors:"));
        assert!(!text.contains("Warnings:"));
        assert!(text.ends_with("Record success rate: 100.00%\n"));
    }

    #[test]
    fn verification_line() {
        let r = result("a.com", 1, 1, 0);
        let ok = MigrationVerification {
            valid: true,
            errors: Vec::new(),
        };
        assert_eq!(render_verification(&r, &ok), "  a.com: verified");

        let bad = MigrationVerification {
            valid: false,
            errors: vec!["Domain validation failed".to_string()],
        };
        assert!(render_verification(&r, &bad).ends_with("(Domain validation failed)"));
    }
}
