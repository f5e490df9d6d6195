//! Reverse alias lookups over the CNAME records of the store.

use std::collections::{HashSet, VecDeque};

use crate::dns::{DomainName, RRecord, RecordType};
use crate::error_handling::ResolutionError;
use crate::store::RecordStore;

/// Every name connected to `name` through CNAME records, `name` included.
///
/// Edges are treated as undirected, so `CNAME(a -> b)` puts `a` and `b` in the
/// same alias set whichever of the two is asked for. Names come out in
/// discovery order, scanning CNAME records in store order. When no CNAME
/// record touches `name` the result is empty.
pub fn all_aliases_of(store: &RecordStore, name: &DomainName) -> Vec<DomainName> {
    let edges: Vec<(&DomainName, Vec<DomainName>)> = store
        .records_of_type(RecordType::CNAME)
        .map(|record| (record.name(), record.value_names()))
        .collect();

    let mut aliases: Vec<DomainName> = Vec::new();
    let mut seen: HashSet<DomainName> = HashSet::new();
    let mut pending = VecDeque::from([name.clone()]);
    seen.insert(name.clone());

    while let Some(current) = pending.pop_front() {
        let mut touched = false;
        for (owner, targets) in &edges {
            let linked: Vec<&DomainName> = if *owner == &current {
                targets.iter().collect()
            } else if targets.contains(&current) {
                vec![*owner]
            } else {
                continue;
            };
            touched = true;
            for next in linked {
                if seen.insert(next.clone()) {
                    pending.push_back(next.clone());
                }
            }
        }
        if touched || &current != name {
            aliases.push(current);
        }
    }
    aliases
}

/// Finds an address record for `name`, falling back to its aliases.
///
/// Tries `name` itself first, then every member of its alias set in store
/// order. A zone's NS record may list an alias rather than the name carrying
/// the address, which is what the fallback covers.
pub fn resolve_address_via_aliases(
    store: &RecordStore,
    name: &DomainName,
) -> Result<RRecord, ResolutionError> {
    if let Ok(record) = store.lookup_first(name, RecordType::A) {
        return Ok(record.clone());
    }
    all_aliases_of(store, name)
        .iter()
        .filter(|alias| *alias != name)
        .find_map(|alias| store.lookup_first(alias, RecordType::A).ok())
        .cloned()
        .ok_or_else(|| ResolutionError::NoAvailablePath(name.clone()))
}
