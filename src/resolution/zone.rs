//! Zone reconstruction from NS records.

use serde::Serialize;

use super::alias::{all_aliases_of, resolve_address_via_aliases};
use super::path::resolve_path;
use crate::dns::{DomainName, RRecord, RecordType};
use crate::error_handling::{IntegrityError, ResolutionError};
use crate::store::RecordStore;

/// A DNS zone with every declared nameserver resolved to an address.
///
/// Zones are never partial: one address record per declared nameserver, in
/// the order of the NS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    name: DomainName,
    nameserver_names: Vec<DomainName>,
    nameservers: Vec<RRecord>,
    aliases: Vec<RRecord>,
}

impl Zone {
    pub fn name(&self) -> &DomainName {
        &self.name
    }

    /// Nameserver names as declared by the NS record.
    pub fn nameserver_names(&self) -> &[DomainName] {
        &self.nameserver_names
    }

    /// Address records of the nameservers.
    pub fn nameservers(&self) -> &[RRecord] {
        &self.nameservers
    }

    /// Synthetic CNAME records, canonical nameserver name to its aliases.
    pub fn aliases(&self) -> &[RRecord] {
        &self.aliases
    }

    /// Address record of a declared nameserver.
    pub fn resolve_nameserver(&self, nameserver: &DomainName) -> Option<&RRecord> {
        self.nameserver_names
            .iter()
            .position(|declared| declared == nameserver)
            .and_then(|i| self.nameservers.get(i))
    }

    /// Declared nameserver names paired with their address records.
    pub fn iter_nameservers(&self) -> impl Iterator<Item = (&DomainName, &RRecord)> {
        self.nameserver_names.iter().zip(self.nameservers.iter())
    }
}

/// Builds the zone described by `ns`.
///
/// # Errors
///
/// Fails as a whole as soon as one nameserver cannot be given an address,
/// directly or through its aliases. Passing a record that is not NS is an
/// `IntegrityError`.
pub fn build_from_ns_record(store: &RecordStore, ns: &RRecord) -> Result<Zone, ResolutionError> {
    if ns.rtype() != RecordType::NS {
        return Err(IntegrityError::TerminalTypeMismatch {
            name: ns.name().clone(),
            expected: RecordType::NS,
            found: ns.rtype(),
        }
        .into());
    }

    let nameserver_names = ns.value_names();
    let mut nameservers = Vec::with_capacity(nameserver_names.len());
    let mut aliases = Vec::new();
    for nameserver in &nameserver_names {
        let address = resolve_address_via_aliases(store, nameserver)?;
        let alias_names: Vec<String> = all_aliases_of(store, nameserver)
            .into_iter()
            .filter(|alias| alias != address.name())
            .map(|alias| alias.to_string())
            .collect();
        if !alias_names.is_empty() {
            let synthetic = RRecord::new(address.name().clone(), RecordType::CNAME, alias_names)
                .map_err(|e| IntegrityError::InvalidTerminal {
                    name: address.name().clone(),
                    rtype: RecordType::CNAME,
                    reason: e.to_string(),
                })?;
            aliases.push(synthetic);
        }
        nameservers.push(address);
    }

    Ok(Zone {
        name: ns.name().clone(),
        nameserver_names,
        nameservers,
        aliases,
    })
}

/// Resolves the NS path of `zone_name` and builds the zone it ends in.
pub fn build_zone(store: &RecordStore, zone_name: &DomainName) -> Result<Zone, ResolutionError> {
    let ns_path = resolve_path(store, zone_name, RecordType::NS)?;
    build_from_ns_record(store, ns_path.terminal())
}

/// Names of the zones whose NS records list `nameserver` or one of its aliases.
pub fn zones_naming(store: &RecordStore, nameserver: &DomainName) -> Vec<DomainName> {
    let mut candidates = all_aliases_of(store, nameserver);
    if !candidates.contains(nameserver) {
        candidates.push(nameserver.clone());
    }

    let mut zones: Vec<DomainName> = Vec::new();
    for ns in store.records_of_type(RecordType::NS) {
        let listed = ns
            .value_names()
            .iter()
            .any(|declared| candidates.contains(declared));
        if listed && !zones.contains(ns.name()) {
            zones.push(ns.name().clone());
        }
    }
    zones
}
