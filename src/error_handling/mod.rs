//! Error handling and the structured error log.
//!
//! This module provides:
//! - Error type definitions, one enum per concern
//! - Categorization of loggable errors into `ErrorKind`
//! - The run-wide `ErrorLog`
//!
//! Errors are split into two classes:
//! - **Data conditions**: per-entity failures that become error log entries
//! - **Integrity violations**: defects in the calling code that always propagate

mod categorization;
mod error_log;
mod types;

// Re-export public API
pub use categorization::{
    categorize_asn_error, categorize_landing_error, categorize_query_error,
    categorize_resolution_error, categorize_rov_error,
};
pub use error_log::{ErrorLog, ErrorLogEntry};
pub use types::{
    AsnError, CollaboratorError, DomainNameError, ErrorKind, InitializationError,
    IntegrityError, QueryError, RecordError, RecordNotFound, ResolutionError, RovLookupError,
    SnapshotError,
};
