//! DNS data model and wire queries.
//!
//! This module provides:
//! - Normalized domain names (`DomainName`)
//! - Record types and records (`RecordType`, `RRecord`, `RecordKey`)
//! - The `DnsQuerier` collaborator and its hickory-backed implementation

mod name;
mod querier;
mod record;

// Re-export public API
pub use name::DomainName;
pub use querier::{DnsQuerier, HickoryQuerier, QueryAnswer};
pub use record::{parse_mx_value, RRecord, RecordKey, RecordType};
pub(crate) use record::normalize_value;
