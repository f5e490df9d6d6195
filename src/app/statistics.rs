//! End-of-run statistics.

use std::collections::BTreeSet;

use log::info;

use crate::error_handling::ErrorLog;
use crate::orchestrator::MappingReport;

/// Prints the error log counts per kind.
pub fn print_error_statistics(errors: &ErrorLog) {
    if errors.is_empty() {
        info!("No errors logged");
        return;
    }
    info!("Error Counts ({} total):", errors.len());
    for (kind, count) in errors.counts() {
        info!("   {}: {}", kind.as_str(), count);
    }
}

/// Prints a short summary of what a run mapped, then the error counts.
pub fn print_run_summary(report: &MappingReport, elapsed_seconds: f64) {
    let results = &report.results;
    let unreachable = results
        .web_sites
        .values()
        .filter(|landing| landing.is_unreachable())
        .count();
    let systems: BTreeSet<u32> = results
        .as_results
        .iter()
        .filter_map(|(_, record)| record.entry.as_ref().map(|entry| entry.number))
        .collect();
    info!(
        "Mapped {} web sites ({} unreachable) and {} mail domains in {:.1}s",
        results.web_sites.len(),
        unreachable,
        results.mail_domains.len(),
        elapsed_seconds
    );
    info!(
        "{} domains depend on {} zones; {} nameservers mapped onto {} autonomous systems",
        results.zone_dependencies.per_domain.len(),
        results.zone_dependencies.zones().len(),
        results.as_results.len(),
        systems.len()
    );
    info!(
        "{} scripts on {} hosting sites; {} records in the store",
        results.scripts.hosting_sites.len(),
        results.script_sites.len(),
        report.store.len()
    );
    print_error_statistics(&report.errors);
}
