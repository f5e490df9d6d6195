//! JSON summary of a whole mapping report.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use crate::error_handling::{ErrorKind, ErrorLogEntry};
use crate::orchestrator::{MappingReport, MappingResults};

#[derive(Serialize)]
struct Summary<'a> {
    generated_at: String,
    stored_records: usize,
    error_counts: BTreeMap<ErrorKind, usize>,
    errors: &'a [ErrorLogEntry],
    results: &'a MappingResults,
}

/// Writes the report as one pretty-printed JSON document.
pub fn write_summary_json<W: Write>(report: &MappingReport, writer: W) -> serde_json::Result<()> {
    let summary = Summary {
        generated_at: Utc::now().to_rfc3339(),
        stored_records: report.store.len(),
        error_counts: report.errors.counts(),
        errors: report.errors.entries(),
        results: &report.results,
    };
    serde_json::to_writer_pretty(writer, &summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorLog;
    use crate::store::RecordStore;

    #[test]
    fn test_summary_counts_errors_by_kind() {
        let mut errors = ErrorLog::new();
        errors.add(ErrorKind::NoAnswer, "quiet.example.", "no MX records");
        errors.add(ErrorKind::NoAnswer, "silent.example.", "no MX records");
        let report = MappingReport {
            results: MappingResults::default(),
            errors,
            store: RecordStore::new(),
        };

        let mut out = Vec::new();
        write_summary_json(&report, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["error_counts"]["NoAnswerError"], 2);
        assert_eq!(value["errors"][1]["entity"], "silent.example.");
        assert_eq!(value["stored_records"], 0);
    }
}
