//! Error categorization.
//!
//! Maps every loggable error onto its `ErrorKind`. Integrity violations have no
//! category: they are programmer errors and must propagate.

use super::types::{
    AsnError, CollaboratorError, ErrorKind, QueryError, ResolutionError, RovLookupError,
};

/// Categorizes a wire query failure.
pub fn categorize_query_error(error: &QueryError) -> ErrorKind {
    match error {
        QueryError::NonExistentDomain(_) => ErrorKind::DomainNonExistent,
        QueryError::NoAnswer { .. } => ErrorKind::NoAnswer,
        QueryError::Failed { .. } => ErrorKind::QueryFailed,
    }
}

/// Categorizes a resolution failure.
///
/// Returns `None` for `ResolutionError::Integrity`, which is not a data condition.
pub fn categorize_resolution_error(error: &ResolutionError) -> Option<ErrorKind> {
    match error {
        ResolutionError::NoAvailablePath(_) => Some(ErrorKind::NoAvailablePath),
        ResolutionError::ReachedMaximumThreshold { .. } => {
            Some(ErrorKind::ReachedMaximumThreshold)
        }
        ResolutionError::Query(query) => Some(categorize_query_error(query)),
        ResolutionError::InvalidName(_) => Some(ErrorKind::InvalidDomainName),
        ResolutionError::Integrity(_) => None,
    }
}

/// Categorizes an AS matching failure.
pub fn categorize_asn_error(error: &AsnError) -> ErrorKind {
    match error {
        AsnError::AutonomousSystemNotFound(_) => ErrorKind::AutonomousSystemNotFound,
        AsnError::NetworkComputation { .. } => ErrorKind::NetworkComputation,
    }
}

/// Categorizes a ROV prefix lookup failure.
pub fn categorize_rov_error(error: &RovLookupError) -> ErrorKind {
    match error {
        RovLookupError::TableAbsent(_) => ErrorKind::RovTableAbsent,
        RovLookupError::TableEmpty(_) => ErrorKind::RovTableEmpty,
        RovLookupError::NetworkNotFound { .. } => ErrorKind::RovNetworkNotFound,
        RovLookupError::Source { .. } => ErrorKind::RovSourceFailed,
    }
}

/// Categorizes a landing failure. Script discovery failures are categorized by
/// the caller since both collaborators share the error type.
pub fn categorize_landing_error(_error: &CollaboratorError) -> ErrorKind {
    ErrorKind::LandingFailed
}
