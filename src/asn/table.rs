//! The ordered IP-to-AS range table.

use std::fs::File;
use std::io::Read;
use std::net::Ipv4Addr;
use std::path::Path;

use log::{info, warn};

use super::entry::AutonomousSystemEntry;
use crate::error_handling::AsnError;

/// AS number used by the iptoasn dataset for unannounced space.
pub const NOT_ROUTED_AS: u32 = 0;

/// Range table sorted by start address.
///
/// When ranges overlap, the covering entry with the greatest start address
/// wins, and among entries sharing that start the one loaded first wins.
#[derive(Debug, Clone, Default)]
pub struct RangeTable {
    entries: Vec<AutonomousSystemEntry>,
    /// `reach[i]` is the greatest end address among `entries[..=i]`.
    reach: Vec<Ipv4Addr>,
}

impl RangeTable {
    /// Builds a table, stable-sorting the entries by start address.
    pub fn from_entries(mut entries: Vec<AutonomousSystemEntry>) -> Self {
        entries.sort_by_key(|entry| entry.start);
        let reach = entries
            .iter()
            .scan(Ipv4Addr::UNSPECIFIED, |furthest, entry| {
                *furthest = (*furthest).max(entry.end);
                Some(*furthest)
            })
            .collect();
        Self { entries, reach }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AutonomousSystemEntry] {
        &self.entries
    }

    /// The entry announcing `address`.
    ///
    /// Binary search for the last entry starting at or before the address,
    /// then a backward scan for a covering one. The scan stops as soon as no
    /// earlier entry reaches the address. "Not routed" rows never match.
    pub fn lookup(&self, address: Ipv4Addr) -> Result<&AutonomousSystemEntry, AsnError> {
        let upper = self.entries.partition_point(|entry| entry.start <= address);
        let mut best: Option<&AutonomousSystemEntry> = None;
        for index in (0..upper).rev() {
            if self.reach[index] < address {
                break;
            }
            let entry = &self.entries[index];
            if let Some(found) = best {
                if entry.start != found.start {
                    break;
                }
            }
            if entry.number != NOT_ROUTED_AS && entry.covers(address) {
                best = Some(entry);
            }
        }
        best.ok_or(AsnError::AutonomousSystemNotFound(address))
    }

    /// Loads an iptoasn `ip2asn-v4.tsv` table.
    ///
    /// Rows are `start\tend\tasn\tcountry\tdescription`; malformed rows are
    /// skipped with a warning.
    pub fn load_tsv<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for row in reader.records() {
            let row = row?;
            match parse_row(&row) {
                Some(entry) => entries.push(entry),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("Skipped {skipped} malformed range table rows");
        }
        Ok(Self::from_entries(entries))
    }

    pub fn load_tsv_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let file = File::open(path)
            .with_context(|| format!("Failed to open range table {}", path.display()))?;
        let table = Self::load_tsv(file)
            .with_context(|| format!("Failed to read range table {}", path.display()))?;
        info!("Loaded {} range table entries from {}", table.len(), path.display());
        Ok(table)
    }
}

fn parse_row(row: &csv::StringRecord) -> Option<AutonomousSystemEntry> {
    let start: Ipv4Addr = row.get(0)?.trim().parse().ok()?;
    let end: Ipv4Addr = row.get(1)?.trim().parse().ok()?;
    let number: u32 = row.get(2)?.trim().parse().ok()?;
    if end < start {
        return None;
    }
    let country_code = row.get(3).unwrap_or_default().trim();
    let description = row.get(4).unwrap_or_default().trim();
    Some(AutonomousSystemEntry::new(
        number,
        description,
        country_code,
        start,
        end,
    ))
}
