//! Alias-chasing path resolution against the record store.

use serde::Serialize;

use crate::dns::{DomainName, RRecord, RecordType};
use crate::error_handling::{IntegrityError, ResolutionError};
use crate::store::RecordStore;

/// Default ceiling on the number of CNAME hops a path may contain.
pub const MAX_PATH_HOPS: usize = 1000;

/// An alias chain from a query name to its terminal answer.
///
/// Zero or more CNAME hops followed by exactly one terminal record of the
/// requested type. Each hop points to the name of the next record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    hops: Vec<RRecord>,
    terminal: RRecord,
}

impl Path {
    /// Assembles a path, checking it against the rules of `expected`.
    ///
    /// # Errors
    ///
    /// Any violation is an `IntegrityError`: a hop that is not a CNAME, a
    /// terminal of the wrong type, a hop that does not point to the next
    /// record, or terminal values that do not fit the type.
    pub fn new(
        hops: Vec<RRecord>,
        terminal: RRecord,
        expected: RecordType,
    ) -> Result<Self, IntegrityError> {
        check_integrity(&hops, &terminal, expected)?;
        Ok(Self { hops, terminal })
    }

    /// The name the path was resolved for.
    pub fn qname(&self) -> &DomainName {
        self.hops
            .first()
            .map(RRecord::name)
            .unwrap_or_else(|| self.terminal.name())
    }

    /// The name carrying the terminal record.
    pub fn canonical_name(&self) -> &DomainName {
        self.terminal.name()
    }

    pub fn terminal(&self) -> &RRecord {
        &self.terminal
    }

    pub fn hops(&self) -> &[RRecord] {
        &self.hops
    }

    pub fn rtype(&self) -> RecordType {
        self.terminal.rtype()
    }

    /// Hops followed by the terminal record.
    pub fn iter(&self) -> impl Iterator<Item = &RRecord> {
        self.hops.iter().chain(std::iter::once(&self.terminal))
    }

    pub fn len(&self) -> usize {
        self.hops.len() + 1
    }

    /// Always false: a path has at least its terminal record.
    pub fn is_empty(&self) -> bool {
        false
    }
}

fn check_integrity(
    hops: &[RRecord],
    terminal: &RRecord,
    expected: RecordType,
) -> Result<(), IntegrityError> {
    for hop in hops {
        if hop.rtype() != RecordType::CNAME {
            return Err(IntegrityError::AliasHopNotCname {
                name: hop.name().clone(),
                found: hop.rtype(),
            });
        }
    }
    if terminal.rtype() != expected {
        return Err(IntegrityError::TerminalTypeMismatch {
            name: terminal.name().clone(),
            expected,
            found: terminal.rtype(),
        });
    }
    let next_names = hops.iter().skip(1).chain(std::iter::once(terminal));
    for (hop, next) in hops.iter().zip(next_names) {
        if hop.first_value() != next.name().as_str() {
            return Err(IntegrityError::BrokenChain {
                from: hop.name().clone(),
                expected_next: next.name().clone(),
            });
        }
    }
    for value in terminal.values() {
        crate::dns::normalize_value(expected, value).map_err(|e| {
            IntegrityError::InvalidTerminal {
                name: terminal.name().clone(),
                rtype: expected,
                reason: e.to_string(),
            }
        })?;
    }
    Ok(())
}

/// Resolves `name` to a record of `rtype`, chasing CNAMEs through the store.
pub fn resolve_path(
    store: &RecordStore,
    name: &DomainName,
    rtype: RecordType,
) -> Result<Path, ResolutionError> {
    resolve_path_with_limit(store, name, rtype, MAX_PATH_HOPS)
}

/// Like `resolve_path`, with an explicit hop ceiling.
///
/// A chain that would need `limit` hops or more fails with
/// `ReachedMaximumThreshold`, which also catches alias cycles.
pub fn resolve_path_with_limit(
    store: &RecordStore,
    name: &DomainName,
    rtype: RecordType,
    limit: usize,
) -> Result<Path, ResolutionError> {
    let mut hops: Vec<RRecord> = Vec::new();
    let mut current = name.clone();
    loop {
        if hops.len() >= limit {
            return Err(ResolutionError::ReachedMaximumThreshold {
                name: name.clone(),
                limit,
            });
        }
        if let Ok(terminal) = store.lookup_first(&current, rtype) {
            return Ok(Path::new(hops, terminal.clone(), rtype)?);
        }
        let alias = store
            .lookup_first(&current, RecordType::CNAME)
            .map_err(|_| ResolutionError::NoAvailablePath(current.clone()))?;
        let next = DomainName::new(alias.first_value())?;
        hops.push(alias.clone());
        current = next;
    }
}
