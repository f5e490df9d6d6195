//! Export types and options.

use std::path::PathBuf;

use crate::config::{DEFAULT_OUTPUT_DIR, DEFAULT_SNAPSHOT_SEPARATOR, ERROR_LOG_DELIMITER};

/// Options for exporting a mapping report.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Directory all files are written to, created when missing
    pub output_dir: PathBuf,
    /// Field delimiter of the error log
    pub error_log_delimiter: u8,
    /// Field separator of the record snapshot
    pub snapshot_separator: char,
    /// Whether the record store is written as a snapshot
    pub write_snapshot: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            error_log_delimiter: ERROR_LOG_DELIMITER,
            snapshot_separator: DEFAULT_SNAPSHOT_SEPARATOR,
            write_snapshot: true,
        }
    }
}

/// Files written by an export, with their row counts.
#[derive(Clone, Debug, Default)]
pub struct ExportReport {
    pub files: Vec<(PathBuf, usize)>,
}

impl ExportReport {
    pub(super) fn push(&mut self, path: PathBuf, rows: usize) {
        self.files.push((path, rows));
    }
}
