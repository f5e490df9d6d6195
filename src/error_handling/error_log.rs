//! The structured error log of a run.
//!
//! Every per-entity failure raised in any phase ends up here as one
//! `(kind, entity, reason)` entry. Entities are never dropped silently: if
//! something could not be resolved, the log says what and why.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;

use super::categorization::{
    categorize_asn_error, categorize_resolution_error, categorize_rov_error,
};
use super::types::{
    AsnError, CollaboratorError, ErrorKind, IntegrityError, ResolutionError, RovLookupError,
};

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One entry of the error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLogEntry {
    pub kind: ErrorKind,
    pub entity: String,
    pub reason: String,
}

/// Append-only list of error log entries, in the order failures happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    entries: Vec<ErrorLogEntry>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ErrorKind, entity: impl Into<String>, reason: impl Into<String>) {
        let entry = ErrorLogEntry {
            kind,
            entity: entity.into(),
            reason: reason.into(),
        };
        log::warn!("{} on '{}': {}", entry.kind, entry.entity, entry.reason);
        self.entries.push(entry);
    }

    pub fn extend(&mut self, other: ErrorLog) {
        self.entries.extend(other.entries);
    }

    /// Logs a resolution failure against `entity`.
    ///
    /// # Errors
    ///
    /// Integrity violations are handed back to the caller instead of being
    /// logged, so that they keep propagating.
    pub fn record_resolution(
        &mut self,
        error: ResolutionError,
        entity: impl Into<String>,
    ) -> Result<(), IntegrityError> {
        match categorize_resolution_error(&error) {
            Some(kind) => {
                self.add(kind, entity, error.to_string());
                Ok(())
            }
            None => match error {
                ResolutionError::Integrity(integrity) => Err(integrity),
                // categorize_resolution_error only declines integrity errors
                other => {
                    self.add(ErrorKind::QueryFailed, entity, other.to_string());
                    Ok(())
                }
            },
        }
    }

    pub fn record_asn(&mut self, error: &AsnError, entity: impl Into<String>) {
        self.add(categorize_asn_error(error), entity, error.to_string());
    }

    pub fn record_rov(&mut self, error: &RovLookupError, entity: impl Into<String>) {
        self.add(categorize_rov_error(error), entity, error.to_string());
    }

    pub fn record_collaborator(
        &mut self,
        kind: ErrorKind,
        error: &CollaboratorError,
        entity: impl Into<String>,
    ) {
        self.add(kind, entity, error.to_string());
    }

    pub fn entries(&self) -> &[ErrorLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of the given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Entry counts per kind, omitting kinds that never occurred.
    pub fn counts(&self) -> BTreeMap<ErrorKind, usize> {
        ErrorKind::iter()
            .map(|kind| (kind, self.count(kind)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Writes the log as delimited text with an `exception, entity, reason_phrase` header.
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> csv::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        writer.write_record(["exception", "entity", "reason_phrase"])?;
        for entry in &self.entries {
            writer.write_record([entry.kind.as_str(), &entry.entity, &entry.reason])?;
        }
        writer.flush()?;
        Ok(())
    }
}
