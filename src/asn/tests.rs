// Autonomous system matching tests.

use std::net::Ipv4Addr;

use super::*;
use crate::dns::{DomainName, RRecord, RecordType};
use crate::error_handling::{AsnError, ErrorKind, ErrorLog, RovLookupError};
use crate::store::RecordStore;

fn ip(raw: &str) -> Ipv4Addr {
    raw.parse().unwrap()
}

fn name(raw: &str) -> DomainName {
    DomainName::new(raw).unwrap()
}

fn entry(number: u32, start: &str, end: &str) -> AutonomousSystemEntry {
    AutonomousSystemEntry::new(number, format!("AS{number} network"), "IT", ip(start), ip(end))
}

fn row(prefix: &str, state: RovState) -> PrefixRow {
    PrefixRow {
        prefix: prefix.parse().unwrap(),
        rov_state: state,
        country_code: "IT".into(),
        visibility: Some(100),
        roas: String::new(),
    }
}

#[test]
fn test_lookup_matches_covering_range() {
    let table = RangeTable::from_entries(vec![entry(100, "1.1.1.0", "1.1.1.255")]);
    let matched = table.lookup(ip("1.1.1.5")).unwrap();
    assert_eq!(matched.number, 100);
    let network = matched.belonging_network(ip("1.1.1.5")).unwrap();
    assert!(network.contains(&ip("1.1.1.5")));

    assert_eq!(
        table.lookup(ip("2.2.2.2")).unwrap_err(),
        AsnError::AutonomousSystemNotFound(ip("2.2.2.2"))
    );
}

#[test]
fn test_lookup_handles_unsorted_input_and_gaps() {
    let table = RangeTable::from_entries(vec![
        entry(300, "10.0.2.0", "10.0.2.255"),
        entry(100, "10.0.0.0", "10.0.0.255"),
    ]);
    assert_eq!(table.lookup(ip("10.0.2.9")).unwrap().number, 300);
    assert_eq!(table.lookup(ip("10.0.0.9")).unwrap().number, 100);
    assert!(table.lookup(ip("10.0.1.9")).is_err());
    assert!(table.lookup(ip("9.255.255.255")).is_err());
}

#[test]
fn test_lookup_overlap_prefers_greatest_start_then_first_loaded() {
    let table = RangeTable::from_entries(vec![
        entry(1, "10.0.0.0", "10.255.255.255"),
        entry(2, "10.1.0.0", "10.1.255.255"),
        entry(3, "10.1.0.0", "10.1.255.255"),
    ]);
    assert_eq!(table.lookup(ip("10.1.2.3")).unwrap().number, 2);
    assert_eq!(table.lookup(ip("10.2.0.1")).unwrap().number, 1);
}

#[test]
fn test_lookup_skips_not_routed_rows() {
    let table = RangeTable::from_entries(vec![entry(NOT_ROUTED_AS, "1.0.0.0", "1.0.0.255")]);
    assert!(table.lookup(ip("1.0.0.1")).is_err());
}

#[test]
fn test_lookup_reaches_long_range_behind_many_short_ones() {
    let mut entries = vec![entry(64500, "10.0.0.0", "10.255.255.255")];
    for i in 0..100u32 {
        entries.push(entry(64600 + i, &format!("10.0.{i}.0"), &format!("10.0.{i}.127")));
    }
    entries.push(entry(NOT_ROUTED_AS, "10.0.200.0", "10.0.200.255"));
    entries.push(entry(64700, "12.0.0.0", "12.0.0.255"));
    let table = RangeTable::from_entries(entries);

    assert_eq!(table.lookup(ip("10.0.7.3")).unwrap().number, 64607);
    assert_eq!(table.lookup(ip("10.0.50.200")).unwrap().number, 64500);
    assert_eq!(table.lookup(ip("10.0.200.5")).unwrap().number, 64500);
    assert_eq!(
        table.lookup(ip("11.0.0.1")),
        Err(AsnError::AutonomousSystemNotFound(ip("11.0.0.1")))
    );
    assert!(table.lookup(ip("12.0.1.0")).is_err());
}

#[test]
fn test_networks_summarize_range() {
    let odd = entry(100, "10.0.0.0", "10.0.2.255");
    let networks: Vec<String> = odd.networks().iter().map(ToString::to_string).collect();
    assert_eq!(networks, vec!["10.0.0.0/23", "10.0.2.0/24"]);
    assert_eq!(
        odd.belonging_network(ip("10.0.2.7")).unwrap().to_string(),
        "10.0.2.0/24"
    );
}

#[test]
fn test_belonging_network_outside_range_fails() {
    let range = entry(100, "1.1.1.0", "1.1.1.255");
    assert!(matches!(
        range.belonging_network(ip("2.2.2.2")),
        Err(AsnError::NetworkComputation { as_number: 100, .. })
    ));
}

#[test]
fn test_load_tsv_skips_malformed_rows() {
    let data = "1.0.0.0\t1.0.0.255\t13335\tUS\tCLOUDFLARENET\n\
                garbage\n\
                1.0.4.0\t1.0.7.255\t38803\tAU\tGTELECOM Pty \"Ltd\"\n\
                1.0.8.0\t1.0.1.0\t1\tXX\tbackwards\n\
                1.0.16.0\t1.0.16.255\t0\tNone\tNot routed\n";
    let table = RangeTable::load_tsv(data.as_bytes()).unwrap();
    assert_eq!(table.len(), 3);
    let matched = table.lookup(ip("1.0.5.1")).unwrap();
    assert_eq!(matched.number, 38803);
    assert_eq!(matched.country_code, "AU");
    assert_eq!(matched.description, "GTELECOM Pty \"Ltd\"");
}

#[test]
fn test_map_nameservers_records_every_attempt() {
    let table = RangeTable::from_entries(vec![entry(100, "1.1.1.0", "1.1.1.255")]);
    let mut store = RecordStore::new();
    store.add(RRecord::from_parts("ns1.example.", RecordType::A, &["1.1.1.5"]).unwrap(), true);
    store.add(RRecord::from_parts("ns2.example.", RecordType::A, &["2.2.2.2"]).unwrap(), true);
    let nameservers = vec![name("ns1.example."), name("ns2.example."), name("ns3.example.")];
    let mut errors = ErrorLog::new();

    let results = map_nameservers(&table, &store, &nameservers, &mut errors);
    assert_eq!(results.len(), 3);

    let ns1 = results.get(&name("ns1.example.")).unwrap();
    assert_eq!(ns1.entry.as_ref().map(|e| e.number), Some(100));
    assert!(ns1.belonging_network.is_some());

    let ns2 = results.get(&name("ns2.example.")).unwrap();
    assert_eq!(ns2.address, Some(ip("2.2.2.2")));
    assert!(ns2.entry.is_none());

    assert_eq!(
        results.get(&name("ns3.example.")),
        Some(&AsResolutionRecord::unresolved(name("ns3.example.")))
    );
    assert_eq!(errors.count(ErrorKind::AutonomousSystemNotFound), 1);
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_as_results_merge_first_wins() {
    let mut first = AsResolutionResults::new();
    first.insert(AsResolutionRecord::unresolved(name("ns1.example.")));
    let mut second = AsResolutionResults::new();
    let mut resolved = AsResolutionRecord::unresolved(name("ns1.example."));
    resolved.address = Some(ip("1.1.1.5"));
    second.insert(resolved);
    second.insert(AsResolutionRecord::unresolved(name("ns2.example.")));

    assert_eq!(first.merge(&second), 1);
    assert_eq!(first.get(&name("ns1.example.")).unwrap().address, None);
    assert!(first.contains(&name("ns2.example.")));
}

fn as_results() -> AsResolutionResults {
    let table = RangeTable::from_entries(vec![
        entry(100, "1.1.1.0", "1.1.1.255"),
        entry(200, "3.3.0.0", "3.3.255.255"),
        entry(300, "4.4.4.0", "4.4.4.255"),
    ]);
    let mut errors = ErrorLog::new();
    let mut results = AsResolutionResults::new();
    for (ns, address) in [
        ("ns1.example.", "1.1.1.5"),
        ("ns2.example.", "1.1.1.200"),
        ("ns3.example.", "3.3.3.3"),
        ("ns4.example.", "4.4.4.4"),
    ] {
        results.insert(match_address(&table, &name(ns), ip(address), &mut errors));
    }
    results.insert(AsResolutionRecord::unresolved(name("ns5.example.")));
    results
}

#[test]
fn test_regroup_by_as_excludes_nameservers_without_as() {
    let grouped = regroup_by_as(&as_results());
    assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![100, 200, 300]);
    assert_eq!(grouped[&100].len(), 2);
    assert!(grouped
        .values()
        .all(|nameservers| !nameservers.contains_key(&name("ns5.example."))));
}

#[test]
fn test_cross_check_pairs_rows_and_logs_failures() {
    let source = TsvPrefixSource::from_rows(vec![
        (100, row("1.1.1.0/25", RovState::Valid)),
        (100, row("1.1.0.0/16", RovState::Invalid)),
    ])
    .with_empty_table(300);
    let mut errors = ErrorLog::new();

    let checked = cross_check(&as_results(), &source, &mut errors);

    let ns1 = &checked[&100][&name("ns1.example.")];
    assert_eq!(ns1.prefix.as_ref().map(|r| r.rov_state), Some(RovState::Valid));
    let ns2 = &checked[&100][&name("ns2.example.")];
    assert_eq!(ns2.prefix.as_ref().map(|r| r.rov_state), Some(RovState::Invalid));
    assert!(checked[&200][&name("ns3.example.")].prefix.is_none());

    assert_eq!(errors.count(ErrorKind::RovTableAbsent), 1);
    assert_eq!(errors.count(ErrorKind::RovTableEmpty), 1);
    let entities: Vec<&str> = errors.entries().iter().map(|e| e.entity.as_str()).collect();
    assert_eq!(entities, vec!["AS200", "AS300"]);
}

#[test]
fn test_network_of_reports_missing_network() {
    let rows = vec![row("8.8.8.0/24", RovState::Valid)];
    assert_eq!(
        network_of(&rows, 15169, ip("9.9.9.9")).unwrap_err(),
        RovLookupError::NetworkNotFound {
            as_number: 15169,
            address: ip("9.9.9.9")
        }
    );
    assert_eq!(network_of(&[], 15169, ip("8.8.8.8")).unwrap_err(), RovLookupError::TableEmpty(15169));
}

#[test]
fn test_prefix_source_loads_tsv() {
    let data = "# asn\tprefix\trov\n\
                AS13335\t1.1.1.0/24\tVLD\tUS\t100\tAS13335\n\
                13335\t1.0.0.0/24\tunknown\n\
                nonsense\t1.0.0.0/24\tVLD\n";
    let source = TsvPrefixSource::load(data.as_bytes()).unwrap();
    let rows = source.prefixes(13335).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].rov_state, RovState::Valid);
    assert_eq!(rows[0].visibility, Some(100));
    assert_eq!(rows[1].rov_state, RovState::Unknown);
    assert_eq!(source.prefixes(1).unwrap_err(), RovLookupError::TableAbsent(1));
}
