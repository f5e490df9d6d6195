//! Nameserver to autonomous system mapping.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use log::debug;
use serde::Serialize;

use super::entry::AutonomousSystemEntry;
use super::table::RangeTable;
use crate::dns::DomainName;
use crate::error_handling::ErrorLog;
use crate::resolution::resolve_address_via_aliases;
use crate::store::RecordStore;

/// What is known about one nameserver on the AS side.
///
/// Every field past the nameserver is optional: a nameserver whose address
/// could not be resolved is still recorded, with all three fields absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsResolutionRecord {
    pub nameserver: DomainName,
    pub address: Option<Ipv4Addr>,
    pub entry: Option<AutonomousSystemEntry>,
    pub belonging_network: Option<Ipv4Net>,
}

impl AsResolutionRecord {
    pub fn unresolved(nameserver: DomainName) -> Self {
        Self {
            nameserver,
            address: None,
            entry: None,
            belonging_network: None,
        }
    }
}

/// Nameserver name to `AsResolutionRecord`, merged first-seen-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AsResolutionResults {
    records: BTreeMap<DomainName, AsResolutionRecord>,
}

impl AsResolutionResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record` unless its nameserver is already present.
    pub fn insert(&mut self, record: AsResolutionRecord) -> bool {
        if self.records.contains_key(&record.nameserver) {
            return false;
        }
        self.records.insert(record.nameserver.clone(), record);
        true
    }

    /// Adds every nameserver of `other` not yet present. Existing records are kept.
    pub fn merge(&mut self, other: &AsResolutionResults) -> usize {
        other
            .records
            .values()
            .filter(|record| self.insert((*record).clone()))
            .count()
    }

    pub fn get(&self, nameserver: &DomainName) -> Option<&AsResolutionRecord> {
        self.records.get(nameserver)
    }

    pub fn contains(&self, nameserver: &DomainName) -> bool {
        self.records.contains_key(nameserver)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DomainName, &AsResolutionRecord)> {
        self.records.iter()
    }
}

/// Matches one address against the range table.
///
/// A missing AS leaves entry and network absent; a failed network
/// computation keeps the entry and leaves the network absent. Both are logged
/// against the nameserver.
pub fn match_address(
    table: &RangeTable,
    nameserver: &DomainName,
    address: Ipv4Addr,
    errors: &mut ErrorLog,
) -> AsResolutionRecord {
    let mut record = AsResolutionRecord::unresolved(nameserver.clone());
    record.address = Some(address);

    let entry = match table.lookup(address) {
        Ok(entry) => entry,
        Err(e) => {
            errors.record_asn(&e, nameserver.as_str());
            return record;
        }
    };
    match entry.belonging_network(address) {
        Ok(network) => record.belonging_network = Some(network),
        Err(e) => errors.record_asn(&e, nameserver.as_str()),
    }
    debug!("{nameserver} ({address}) is announced by AS{}", entry.number);
    record.entry = Some(entry.clone());
    record
}

/// Maps every nameserver to its AS, reading addresses from the store.
///
/// Nameservers without a known address are recorded unresolved. Their
/// address failure was already logged when it happened.
pub fn map_nameservers(
    table: &RangeTable,
    store: &RecordStore,
    nameservers: &[DomainName],
    errors: &mut ErrorLog,
) -> AsResolutionResults {
    let mut results = AsResolutionResults::new();
    for nameserver in nameservers {
        if results.contains(nameserver) {
            continue;
        }
        let address = resolve_address_via_aliases(store, nameserver)
            .ok()
            .and_then(|record| record.addresses().first().copied());
        let record = match address {
            Some(address) => match_address(table, nameserver, address, errors),
            None => AsResolutionRecord::unresolved(nameserver.clone()),
        };
        results.insert(record);
    }
    results
}
