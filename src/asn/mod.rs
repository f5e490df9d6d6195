//! Autonomous system matching.
//!
//! This module provides:
//! - The IP-to-AS range table and its iptoasn loader (`RangeTable`)
//! - Belonging network computation by range summarization
//! - Nameserver to AS mapping with first-seen-wins results
//! - The ROV cross-check against per-AS prefix tables

mod entry;
mod network;
mod rov;
mod table;

// Re-export public API
pub use entry::AutonomousSystemEntry;
pub use network::{map_nameservers, match_address, AsResolutionRecord, AsResolutionResults};
pub use rov::{
    cross_check, network_of, regroup_by_as, PrefixRow, RovEntry, RovPrefixSource, RovResults,
    RovState, TsvPrefixSource,
};
pub use table::{RangeTable, NOT_ROUTED_AS};
