//! The in-memory record store.
//!
//! One `RecordStore` lives for the whole run, owned by the orchestrator. Every
//! record learned from queries or from a snapshot is appended here and stays
//! visible to every later resolution step.
//!
//! Identity inside the store is the explicit `RecordKey` `(name, type)`. With
//! `dedupe` on, a second record under an existing key is dropped even when its
//! values differ: the first record learned for a key is the one that counts.

mod snapshot;

use std::collections::HashMap;

use log::debug;

use crate::dns::{DomainName, RRecord, RecordKey, RecordType};
use crate::error_handling::RecordNotFound;
use crate::resolution::Path;

pub use snapshot::{parse_snapshot_line, LoadReport};

/// Ordered collection of records indexed by `(name, type)`.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<RRecord>,
    index: HashMap<RecordKey, Vec<usize>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record`.
    ///
    /// With `dedupe` set the record is only added when no record with the same
    /// key is present. Returns whether the record was added.
    pub fn add(&mut self, record: RRecord, dedupe: bool) -> bool {
        let key = record.key();
        if dedupe && self.index.contains_key(&key) {
            return false;
        }
        self.index.entry(key).or_default().push(self.records.len());
        self.records.push(record);
        true
    }

    /// Appends every record in order. Returns how many were added.
    pub fn add_many<I>(&mut self, records: I, dedupe: bool) -> usize
    where
        I: IntoIterator<Item = RRecord>,
    {
        let mut added = 0;
        for record in records {
            if self.add(record, dedupe) {
                added += 1;
            }
        }
        added
    }

    /// Appends every record of a resolved path, hops first.
    pub fn add_path(&mut self, path: &Path, dedupe: bool) -> usize {
        self.add_many(path.iter().cloned(), dedupe)
    }

    /// First record stored under `(name, rtype)`.
    pub fn lookup_first(
        &self,
        name: &DomainName,
        rtype: RecordType,
    ) -> Result<&RRecord, RecordNotFound> {
        self.positions(name, rtype)
            .and_then(|positions| positions.first())
            .map(|&position| &self.records[position])
            .ok_or_else(|| RecordNotFound {
                name: name.clone(),
                rtype,
            })
    }

    /// Every record stored under `(name, rtype)`, in insertion order.
    pub fn lookup_all(
        &self,
        name: &DomainName,
        rtype: RecordType,
    ) -> Result<Vec<&RRecord>, RecordNotFound> {
        match self.positions(name, rtype) {
            Some(positions) if !positions.is_empty() => {
                Ok(positions.iter().map(|&p| &self.records[p]).collect())
            }
            _ => Err(RecordNotFound {
                name: name.clone(),
                rtype,
            }),
        }
    }

    pub fn contains_key(&self, name: &DomainName, rtype: RecordType) -> bool {
        self.positions(name, rtype).is_some()
    }

    /// Merges `other` into this store.
    ///
    /// Additive only: a record of `other` is appended when its key is not yet
    /// present, and nothing already stored is ever replaced. Order of `other`
    /// is preserved for the appended records.
    pub fn merge(&mut self, other: &RecordStore) -> usize {
        let added = other
            .records
            .iter()
            .filter(|record| self.add((*record).clone(), true))
            .count();
        debug!("Merged {added} of {} records into the store", other.len());
        added
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RRecord> {
        self.records.iter()
    }

    pub fn records_of_type(&self, rtype: RecordType) -> impl Iterator<Item = &RRecord> {
        self.records.iter().filter(move |r| r.rtype() == rtype)
    }

    fn positions(&self, name: &DomainName, rtype: RecordType) -> Option<&Vec<usize>> {
        self.index.get(&RecordKey::new(name.clone(), rtype))
    }
}
