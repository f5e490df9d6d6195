//! Export of mapping reports.
//!
//! This module writes the results of a run to an output directory:
//! flattened CSV tables per aggregate, the error log, a JSON summary, and the
//! record store as a snapshot that a later run can preload.

mod csv;
mod json;
mod types;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::{
    AS_RESULTS_FILE, ERROR_LOG_FILE, MAIL_FILE, ROV_FILE, SCRIPTS_FILE, SNAPSHOT_FILE,
    SUMMARY_FILE, ZONES_FILE,
};
use crate::orchestrator::{MappingReport, MappingResults};

pub use csv::{write_as_csv, write_mail_csv, write_rov_csv, write_scripts_csv, write_zones_csv};
pub use json::write_summary_json;
pub use types::{ExportOptions, ExportReport};

type TableWriter = fn(&MappingResults, BufWriter<File>) -> ::csv::Result<usize>;

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Writes every export of `report` into `options.output_dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or any file cannot be
/// written.
pub fn export_all(report: &MappingReport, options: &ExportOptions) -> Result<ExportReport> {
    let dir = &options.output_dir;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let mut exported = ExportReport::default();

    let tables: [(&str, TableWriter); 5] = [
        (ZONES_FILE, write_zones_csv),
        (AS_RESULTS_FILE, write_as_csv),
        (ROV_FILE, write_rov_csv),
        (MAIL_FILE, write_mail_csv),
        (SCRIPTS_FILE, write_scripts_csv),
    ];
    for (file_name, write) in tables {
        let path = dir.join(file_name);
        let rows = write(&report.results, create(&path)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {rows} rows to {}", path.display());
        exported.push(path, rows);
    }

    let path = dir.join(ERROR_LOG_FILE);
    report
        .errors
        .write_csv(create(&path)?, options.error_log_delimiter)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} error log entries to {}", report.errors.len(), path.display());
    exported.push(path, report.errors.len());

    let path = dir.join(SUMMARY_FILE);
    let mut writer = create(&path)?;
    write_summary_json(report, &mut writer)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    exported.push(path, 1);

    if options.write_snapshot {
        let path = dir.join(SNAPSHOT_FILE);
        report
            .store
            .write_snapshot_file(&path, options.snapshot_separator)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!("Wrote {} records to {}", report.store.len(), path.display());
        exported.push(path, report.store.len());
    }

    Ok(exported)
}
