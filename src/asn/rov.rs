//! Route origin validation cross-check.
//!
//! The AS results are regrouped by AS number, each AS's announced prefix
//! table is fetched once from a `RovPrefixSource`, and every nameserver of
//! the AS is paired with the prefix row containing its address.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;

use ipnet::Ipv4Net;
use log::{debug, info, warn};
use serde::Serialize;

use super::entry::AutonomousSystemEntry;
use super::network::AsResolutionResults;
use crate::dns::DomainName;
use crate::error_handling::{ErrorLog, RovLookupError};

/// Route origin validation state of a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RovState {
    Valid,
    Invalid,
    Unknown,
}

impl RovState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RovState::Valid => "VLD",
            RovState::Invalid => "INV",
            RovState::Unknown => "UNK",
        }
    }
}

impl fmt::Display for RovState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RovState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "VLD" | "VALID" => RovState::Valid,
            "INV" | "INVALID" => RovState::Invalid,
            _ => RovState::Unknown,
        })
    }
}

/// One row of an AS's announced prefixes table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixRow {
    pub prefix: Ipv4Net,
    pub rov_state: RovState,
    pub country_code: String,
    pub visibility: Option<u32>,
    pub roas: String,
}

/// Supplier of per-AS prefix tables.
pub trait RovPrefixSource {
    /// The announced prefixes of `as_number`.
    ///
    /// # Errors
    ///
    /// `RovLookupError::TableAbsent` when the source knows nothing of the AS,
    /// `RovLookupError::Source` when it could not be consulted.
    fn prefixes(&self, as_number: u32) -> Result<Vec<PrefixRow>, RovLookupError>;
}

/// The row of `rows` whose prefix contains `address`.
pub fn network_of(
    rows: &[PrefixRow],
    as_number: u32,
    address: Ipv4Addr,
) -> Result<&PrefixRow, RovLookupError> {
    if rows.is_empty() {
        return Err(RovLookupError::TableEmpty(as_number));
    }
    rows.iter()
        .find(|row| row.prefix.contains(&address))
        .ok_or(RovLookupError::NetworkNotFound {
            as_number,
            address,
        })
}

/// Prefix tables loaded from a tab-separated file.
///
/// Rows are `asn\tprefix\trov_state[\tcountry\tvisibility\troas]`.
#[derive(Debug, Clone, Default)]
pub struct TsvPrefixSource {
    tables: HashMap<u32, Vec<PrefixRow>>,
}

impl TsvPrefixSource {
    pub fn from_rows(rows: impl IntoIterator<Item = (u32, PrefixRow)>) -> Self {
        let mut tables: HashMap<u32, Vec<PrefixRow>> = HashMap::new();
        for (as_number, row) in rows {
            tables.entry(as_number).or_default().push(row);
        }
        Self { tables }
    }

    /// Declares an AS with an empty prefix table.
    pub fn with_empty_table(mut self, as_number: u32) -> Self {
        self.tables.entry(as_number).or_default();
        self
    }

    pub fn load<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for record in reader.records() {
            let record = record?;
            match parse_prefix_row(&record) {
                Some(row) => rows.push(row),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("Skipped {skipped} malformed prefix rows");
        }
        Ok(Self::from_rows(rows))
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let file = File::open(path)
            .with_context(|| format!("Failed to open prefix table {}", path.display()))?;
        let source = Self::load(file)
            .with_context(|| format!("Failed to read prefix table {}", path.display()))?;
        info!(
            "Loaded prefix tables of {} autonomous systems from {}",
            source.tables.len(),
            path.display()
        );
        Ok(source)
    }
}

fn parse_prefix_row(record: &csv::StringRecord) -> Option<(u32, PrefixRow)> {
    let as_number: u32 = record
        .get(0)?
        .trim()
        .trim_start_matches("AS")
        .parse()
        .ok()?;
    let prefix: Ipv4Net = record.get(1)?.trim().parse().ok()?;
    let rov_state = record.get(2)?.parse().ok()?;
    let row = PrefixRow {
        prefix,
        rov_state,
        country_code: record.get(3).unwrap_or_default().trim().to_string(),
        visibility: record.get(4).and_then(|v| v.trim().parse().ok()),
        roas: record.get(5).unwrap_or_default().trim().to_string(),
    };
    Some((as_number, row))
}

impl RovPrefixSource for TsvPrefixSource {
    fn prefixes(&self, as_number: u32) -> Result<Vec<PrefixRow>, RovLookupError> {
        self.tables
            .get(&as_number)
            .cloned()
            .ok_or(RovLookupError::TableAbsent(as_number))
    }
}

/// One nameserver of an AS, with the prefix row found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RovEntry {
    pub address: Option<Ipv4Addr>,
    pub entry: AutonomousSystemEntry,
    pub belonging_network: Option<Ipv4Net>,
    pub prefix: Option<PrefixRow>,
}

/// AS number to nameserver to `RovEntry`.
pub type RovResults = BTreeMap<u32, BTreeMap<DomainName, RovEntry>>;

/// Regroups AS results by AS number. Nameservers without AS are left out.
pub fn regroup_by_as(results: &AsResolutionResults) -> RovResults {
    let mut grouped = RovResults::new();
    for (nameserver, record) in results.iter() {
        let Some(entry) = &record.entry else {
            continue;
        };
        grouped
            .entry(entry.number)
            .or_default()
            .entry(nameserver.clone())
            .or_insert_with(|| RovEntry {
                address: record.address,
                entry: entry.clone(),
                belonging_network: record.belonging_network,
                prefix: None,
            });
    }
    grouped
}

/// Runs the ROV cross-check over the cumulative AS results.
///
/// The prefix source is consulted once per AS. Failures are logged: a
/// missing or failing table against the AS, an uncovered address against
/// the nameserver.
pub fn cross_check(
    results: &AsResolutionResults,
    source: &dyn RovPrefixSource,
    errors: &mut ErrorLog,
) -> RovResults {
    let mut grouped = regroup_by_as(results);
    info!("ROV cross-check over {} autonomous systems", grouped.len());

    for (as_number, nameservers) in grouped.iter_mut() {
        let entity = format!("AS{as_number}");
        let rows = match source.prefixes(*as_number) {
            Ok(rows) => rows,
            Err(e) => {
                errors.record_rov(&e, entity);
                continue;
            }
        };
        if rows.is_empty() {
            errors.record_rov(&RovLookupError::TableEmpty(*as_number), entity);
            continue;
        }
        for (nameserver, rov_entry) in nameservers.iter_mut() {
            let Some(address) = rov_entry.address else {
                continue;
            };
            match network_of(&rows, *as_number, address) {
                Ok(row) => {
                    debug!("{nameserver} ({address}) lies in {} [{}]", row.prefix, row.rov_state);
                    rov_entry.prefix = Some(row.clone());
                }
                Err(e) => errors.record_rov(&e, nameserver.as_str()),
            }
        }
    }
    grouped
}
