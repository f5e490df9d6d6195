//! Snapshot persistence of the record store.
//!
//! One line per record: `name<sep>TYPE<sep>[v1,v2,...]`. Loading is
//! best-effort: a line that does not split into three fields, carries an
//! unknown type token, or holds an invalid name or value is skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path as FsPath;

use log::{debug, info};

use super::RecordStore;
use crate::dns::{DomainName, RRecord, RecordType};
use crate::error_handling::SnapshotError;

/// Outcome of loading a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records added to the store.
    pub loaded: usize,
    /// Well-formed records whose key was already present.
    pub duplicates: usize,
    /// Malformed lines.
    pub skipped: usize,
}

/// Parses one snapshot line. Returns `None` for anything malformed.
pub fn parse_snapshot_line(line: &str, separator: char) -> Option<RRecord> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(separator).collect();
    let [name, rtype, values] = fields.as_slice() else {
        return None;
    };
    let name = DomainName::new(name).ok()?;
    let rtype: RecordType = rtype.parse().ok()?;
    let values = values
        .trim()
        .strip_prefix('[')?
        .strip_suffix(']')?
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    RRecord::new(name, rtype, values).ok()
}

fn format_snapshot_line(record: &RRecord, separator: char) -> String {
    format!(
        "{}{separator}{}{separator}[{}]",
        record.name(),
        record.rtype(),
        record.values().join(",")
    )
}

impl RecordStore {
    /// Loads snapshot lines into the store, keeping the first record per key.
    pub fn load_snapshot<R: BufRead>(
        &mut self,
        reader: R,
        separator: char,
    ) -> Result<LoadReport, SnapshotError> {
        let mut report = LoadReport::default();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_snapshot_line(&line, separator) {
                Some(record) => {
                    if self.add(record, true) {
                        report.loaded += 1;
                    } else {
                        report.duplicates += 1;
                    }
                }
                None => {
                    debug!("Skipping malformed snapshot line {}: {line}", number + 1);
                    report.skipped += 1;
                }
            }
        }
        Ok(report)
    }

    pub fn load_snapshot_file(
        &mut self,
        path: &FsPath,
        separator: char,
    ) -> Result<LoadReport, SnapshotError> {
        let file = File::open(path)?;
        let report = self.load_snapshot(BufReader::new(file), separator)?;
        info!(
            "Loaded {} records from snapshot {} ({} duplicates, {} skipped)",
            report.loaded,
            path.display(),
            report.duplicates,
            report.skipped
        );
        Ok(report)
    }

    /// Writes every record, in insertion order.
    pub fn write_snapshot<W: Write>(&self, mut writer: W, separator: char) -> Result<(), SnapshotError> {
        for record in self.iter() {
            writeln!(writer, "{}", format_snapshot_line(record, separator))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_snapshot_file(&self, path: &FsPath, separator: char) -> Result<(), SnapshotError> {
        let file = File::create(path)?;
        self.write_snapshot(BufWriter::new(file), separator)?;
        info!("Wrote {} records to snapshot {}", self.len(), path.display());
        Ok(())
    }
}
