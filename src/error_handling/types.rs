//! Error type definitions.
//!
//! This module defines every error raised by the mapper together with the
//! `ErrorKind` categories used by the structured error log.

use std::net::Ipv4Addr;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::dns::{DomainName, RecordType};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error starting the runtime that drives the network collaborators.
    #[error("Runtime initialization error: {0}")]
    RuntimeError(#[from] std::io::Error),
}

/// A string that cannot be turned into a `DomainName`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainNameError {
    #[error("Empty domain name")]
    Empty,

    #[error("Domain name '{0}' contains an empty label")]
    EmptyLabel(String),

    #[error("Domain name '{0}' contains a label longer than 63 octets")]
    LabelTooLong(String),

    #[error("Domain name '{0}' is longer than 253 octets")]
    TooLong(String),

    #[error("Domain name '{0}' contains whitespace")]
    InvalidCharacter(String),
}

/// A record that cannot be built from its parts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Unknown resource record type '{0}'")]
    UnknownType(String),

    #[error(transparent)]
    InvalidName(#[from] DomainNameError),

    #[error("{rtype} record for {name} has no values")]
    NoValues { name: String, rtype: RecordType },

    #[error("'{value}' is not a valid {rtype} value")]
    InvalidValue { rtype: RecordType, value: String },
}

/// Store miss. An expected control-flow signal, never logged on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No {rtype} record for {name} in the store")]
pub struct RecordNotFound {
    pub name: DomainName,
    pub rtype: RecordType,
}

/// A path or zone was assembled from records that violate its invariants.
///
/// This indicates a defect in the calling code, not a data condition, and is
/// never converted into an error log entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Alias hop {name} is a {found} record, expected CNAME")]
    AliasHopNotCname { name: DomainName, found: RecordType },

    #[error("Terminal record {name} is a {found} record, expected {expected}")]
    TerminalTypeMismatch {
        name: DomainName,
        expected: RecordType,
        found: RecordType,
    },

    #[error("Alias {from} does not point to {expected_next}")]
    BrokenChain {
        from: DomainName,
        expected_next: DomainName,
    },

    #[error("Terminal {rtype} record {name} carries an invalid value: {reason}")]
    InvalidTerminal {
        name: DomainName,
        rtype: RecordType,
        reason: String,
    },
}

/// Failure reported by the wire DNS collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Domain {0} does not exist")]
    NonExistentDomain(String),

    #[error("No {rtype} answer for {name}")]
    NoAnswer { name: String, rtype: RecordType },

    #[error("{rtype} query for {name} failed: {reason}")]
    Failed {
        name: String,
        rtype: RecordType,
        reason: String,
    },
}

/// Failure while turning stored records (or fresh queries) into answers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The alias chain dead-ends before a record of the requested type.
    #[error("No available path for {0}")]
    NoAvailablePath(DomainName),

    /// The alias chain is runaway or cyclic.
    #[error("Reached maximum threshold of {limit} alias hops resolving {name}")]
    ReachedMaximumThreshold { name: DomainName, limit: usize },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    InvalidName(#[from] DomainNameError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// Failure of the IP-to-AS matcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsnError {
    #[error("No autonomous system announces {0}")]
    AutonomousSystemNotFound(Ipv4Addr),

    #[error("Impossible to compute belonging network of {address} from AS{as_number} range [{start} - {end}]")]
    NetworkComputation {
        address: Ipv4Addr,
        as_number: u32,
        start: Ipv4Addr,
        end: Ipv4Addr,
    },
}

/// Failure of the ROV prefix lookup for one AS or one address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RovLookupError {
    #[error("No prefixes table for AS{0}")]
    TableAbsent(u32),

    #[error("Prefixes table of AS{0} is empty")]
    TableEmpty(u32),

    #[error("No prefix of AS{as_number} contains {address}")]
    NetworkNotFound { as_number: u32, address: Ipv4Addr },

    #[error("Prefix source failed for AS{as_number}: {reason}")]
    Source { as_number: u32, reason: String },
}

/// Failure of the landing or script discovery collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Request to {target} failed: {reason}")]
    Request { target: String, reason: String },

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("URL '{0}' has no host component")]
    MissingHost(String),
}

/// Failure reading or writing a record store snapshot.
///
/// Malformed lines are not errors: they are skipped and counted.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Categories of the structured error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIterMacro)]
pub enum ErrorKind {
    // Input
    InvalidDomainName,
    // Store resolution
    NoAvailablePath,
    ReachedMaximumThreshold,
    // Wire DNS
    DomainNonExistent,
    NoAnswer,
    QueryFailed,
    // AS matching
    AutonomousSystemNotFound,
    NetworkComputation,
    // Landing and scripts
    LandingFailed,
    ScriptCollectionFailed,
    // ROV cross-check
    RovTableAbsent,
    RovTableEmpty,
    RovNetworkNotFound,
    RovSourceFailed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidDomainName => "InvalidDomainNameError",
            ErrorKind::NoAvailablePath => "NoAvailablePathError",
            ErrorKind::ReachedMaximumThreshold => "ReachedMaximumRecursivePathThresholdError",
            ErrorKind::DomainNonExistent => "DomainNonExistentError",
            ErrorKind::NoAnswer => "NoAnswerError",
            ErrorKind::QueryFailed => "UnknownReasonError",
            ErrorKind::AutonomousSystemNotFound => "AutonomousSystemNotFoundError",
            ErrorKind::NetworkComputation => "NetworkComputationError",
            ErrorKind::LandingFailed => "LandingError",
            ErrorKind::ScriptCollectionFailed => "ScriptCollectionError",
            ErrorKind::RovTableAbsent => "TableNotPresentError",
            ErrorKind::RovTableEmpty => "TableEmptyError",
            ErrorKind::RovNetworkNotFound => "NetworkNotFoundError",
            ErrorKind::RovSourceFailed => "PrefixSourceError",
        }
    }
}
