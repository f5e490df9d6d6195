//! End-to-end runs of the three-phase pipeline over in-memory collaborators.

mod helpers;

use std::net::Ipv4Addr;

use dns_rov_mapper::asn::{RangeTable, RovState};
use dns_rov_mapper::dns::RecordType;
use dns_rov_mapper::error_handling::ErrorKind;
use dns_rov_mapper::landing::Scheme;
use dns_rov_mapper::resolution::ResolverSettings;
use dns_rov_mapper::store::RecordStore;
use dns_rov_mapper::{Collaborators, MappingReport, OrchestratorSettings, ResolutionOrchestrator};

use helpers::*;

fn seeds(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn run_shop(dns: &WorldDns, settings: OrchestratorSettings) -> MappingReport {
    let landing = shop_landing();
    let scripts = shop_scripts();
    let rov = prefix_source();
    let table = range_table();
    let collaborators = Collaborators {
        dns,
        landing: &landing,
        scripts: &scripts,
        rov: Some(&rov),
    };
    ResolutionOrchestrator::new(&table, collaborators, settings)
        .run(
            &seeds(&["shop.example"]),
            &seeds(&["shop.example", "nowhere.test"]),
        )
        .unwrap()
}

fn has_entry(report: &MappingReport, kind: ErrorKind, entity: &str) -> bool {
    report
        .errors
        .entries()
        .iter()
        .any(|e| e.kind == kind && e.entity == entity)
}

#[test]
fn test_preamble_lands_sites_and_resolves_mail() {
    let dns = WorldDns::new(shop_records()).nxdomain("nowhere.test.");
    let report = run_shop(&dns, OrchestratorSettings::default());
    let results = &report.results;

    let landing = &results.web_sites["shop.example"];
    assert_eq!(
        landing.https.as_ref().unwrap().server,
        name("www.shop.example.")
    );
    assert!(landing.http.is_none());
    assert!(has_entry(&report, ErrorKind::LandingFailed, "http://shop.example"));

    assert_eq!(
        results.mail_domains[&name("shop.example.")],
        vec![name("mx.shop.example.")]
    );
    assert!(results.mail_domains[&name("nowhere.test.")].is_empty());
    assert!(has_entry(&report, ErrorKind::DomainNonExistent, "nowhere.test."));
}

#[test]
fn test_midst_maps_zones_and_nameservers_onto_autonomous_systems() {
    let dns = WorldDns::new(shop_records()).nxdomain("nowhere.test.");
    let report = run_shop(&dns, OrchestratorSettings::default());
    let deps = &report.results.zone_dependencies;

    let zones: Vec<_> = deps.per_domain[&name("www.shop.example.")]
        .iter()
        .map(|zone| zone.name().clone())
        .collect();
    assert_eq!(zones, vec![name("shop.example."), name("dns.test.")]);
    assert_eq!(
        deps.per_nameserver[&name("ns1.dns.test.")],
        vec![name("shop.example."), name("dns.test.")]
    );

    let ns1 = report.results.as_results.get(&name("ns1.dns.test.")).unwrap();
    assert_eq!(ns1.address, Some(Ipv4Addr::new(192, 0, 2, 1)));
    assert_eq!(ns1.entry.as_ref().unwrap().number, 64500);
    assert_eq!(ns1.belonging_network, Some("192.0.2.0/24".parse().unwrap()));

    let ns2 = report.results.as_results.get(&name("ns2.dns.test.")).unwrap();
    assert_eq!(ns2.entry.as_ref().unwrap().number, 64501);
    assert_eq!(ns2.belonging_network, Some("198.51.100.0/25".parse().unwrap()));
}

#[test]
fn test_epilogue_follows_script_sites_and_keeps_unresolved_nameservers() {
    let dns = WorldDns::new(shop_records()).nxdomain("nowhere.test.");
    let report = run_shop(&dns, OrchestratorSettings::default());
    let results = &report.results;

    assert!(results
        .scripts
        .all_sites()
        .contains(&name("static.assets.test.")));
    assert!(results.script_sites.contains_key(&name("static.assets.test.")));

    // The only nameserver of assets.test. has no address: no zone, logged twice
    assert!(results.zone_dependencies.per_domain[&name("static.assets.test.")].is_empty());
    assert!(has_entry(&report, ErrorKind::NoAnswer, "ns.lost.test."));
    assert!(report
        .errors
        .entries()
        .iter()
        .any(|e| e.entity == "assets.test."));

    let lost = results.as_results.get(&name("ns.lost.test.")).unwrap();
    assert_eq!(lost.address, None);
    assert_eq!(lost.entry, None);
    assert_eq!(lost.belonging_network, None);
}

#[test]
fn test_rov_cross_check_covers_every_mapped_system() {
    let dns = WorldDns::new(shop_records()).nxdomain("nowhere.test.");
    let report = run_shop(&dns, OrchestratorSettings::default());
    let rov = &report.results.rov;

    let ns1 = &rov[&64500][&name("ns1.dns.test.")];
    assert_eq!(ns1.prefix.as_ref().unwrap().rov_state, RovState::Valid);
    assert!(rov[&64501][&name("ns2.dns.test.")].prefix.is_none());
    assert!(has_entry(&report, ErrorKind::RovTableEmpty, "AS64501"));
    assert!(!rov.values().any(|per_ns| per_ns.contains_key(&name("ns.lost.test."))));
}

#[test]
fn test_skipping_scripts_ends_the_run_after_the_midst() {
    let dns = WorldDns::new(shop_records()).nxdomain("nowhere.test.");
    let settings = OrchestratorSettings {
        resolve_scripts: false,
        ..Default::default()
    };
    let report = run_shop(&dns, settings);

    assert!(report.results.scripts.hosting_sites.is_empty());
    assert!(report.results.script_sites.is_empty());
    assert!(!dns.was_asked("assets.test.", RecordType::NS));
    assert!(report.results.as_results.get(&name("ns1.dns.test.")).is_some());
}

#[test]
fn test_preloaded_store_is_consulted_before_the_wire() {
    let mut store = RecordStore::new();
    store.add_many(shop_records(), true);
    let dns = WorldDns::new(shop_records()).nxdomain("nowhere.test.");
    let landing = shop_landing();
    let scripts = shop_scripts();
    let table = range_table();
    let collaborators = Collaborators {
        dns: &dns,
        landing: &landing,
        scripts: &scripts,
        rov: None,
    };

    let report =
        ResolutionOrchestrator::with_store(store, &table, collaborators, Default::default())
            .run(&seeds(&["shop.example"]), &seeds(&["shop.example"]))
            .unwrap();

    assert!(!dns.was_asked("shop.example.", RecordType::NS));
    assert!(!dns.was_asked("shop.example.", RecordType::MX));
    assert!(!dns.was_asked("ns1.dns.test.", RecordType::A));
    assert!(report.results.rov.is_empty());
    assert_eq!(
        report.results.mail_domains[&name("shop.example.")],
        vec![name("mx.shop.example.")]
    );
}

#[test]
fn test_hop_ceiling_is_logged_as_threshold_error() {
    let mut records = shop_records();
    records.push(record("chain.test.", RecordType::CNAME, &["hop1.test."]));
    records.push(record("hop1.test.", RecordType::CNAME, &["hop2.test."]));
    records.push(record("hop2.test.", RecordType::MX, &["10 mx.shop.example."]));
    let dns = WorldDns::new(records);
    let landing = FixedLanding::default();
    let scripts = FixedScripts::default();
    let table = range_table();
    let collaborators = Collaborators {
        dns: &dns,
        landing: &landing,
        scripts: &scripts,
        rov: None,
    };
    let settings = OrchestratorSettings {
        resolver: ResolverSettings {
            max_hops: 1,
            include_tld: false,
        },
        resolve_scripts: true,
    };

    let report = ResolutionOrchestrator::new(&table, collaborators, settings)
        .run(&[], &seeds(&["chain.test"]))
        .unwrap();

    assert!(has_entry(
        &report,
        ErrorKind::ReachedMaximumThreshold,
        "chain.test."
    ));
    assert!(report.results.mail_domains[&name("chain.test.")].is_empty());
}

#[test]
fn test_invalid_seeds_are_logged_and_skipped() {
    let dns = WorldDns::new(Vec::new());
    let landing = FixedLanding::default();
    let scripts = FixedScripts::default();
    let table = RangeTable::default();
    let collaborators = Collaborators {
        dns: &dns,
        landing: &landing,
        scripts: &scripts,
        rov: None,
    };

    let report = ResolutionOrchestrator::new(&table, collaborators, Default::default())
        .run(&[], &seeds(&["bad..name", "  "]))
        .unwrap();

    assert_eq!(report.errors.count(ErrorKind::InvalidDomainName), 1);
    assert!(report.results.mail_domains.is_empty());
    assert_eq!(dns.query_count(), 0);
}

#[test]
fn test_aliased_names_reach_their_target_zones_and_failures_log_once() {
    let mut records = shop_records();
    records.push(record("cdn.test.", RecordType::NS, &["ns.cdn.test."]));
    // Unannounced space: the AS lookup of ns.cdn.test. fails
    records.push(record("ns.cdn.test.", RecordType::A, &["203.0.113.53"]));
    records.push(record("img.assets.test.", RecordType::CNAME, &["edge.cdn.test."]));
    let dns = WorldDns::new(records);
    let landing = shop_landing().lands("img.assets.test", Scheme::Https, "https://img.assets.test/");
    let scripts = shop_scripts().serves("https://www.shop.example/", "https://img.assets.test/logo.js");
    let table = range_table();
    let collaborators = Collaborators {
        dns: &dns,
        landing: &landing,
        scripts: &scripts,
        rov: None,
    };

    let report = ResolutionOrchestrator::new(&table, collaborators, Default::default())
        .run(&seeds(&["shop.example"]), &[])
        .unwrap();
    let deps = &report.results.zone_dependencies;

    for aliased in ["www.shop.example.", "img.assets.test."] {
        assert!(
            deps.per_domain[&name(aliased)]
                .iter()
                .any(|zone| zone.name() == &name("cdn.test.")),
            "{aliased} misses its alias target zone"
        );
    }

    let logged_for = |entity: &str| {
        report
            .errors
            .entries()
            .iter()
            .filter(|e| e.entity == entity)
            .count()
    };
    // assets.test. fails for both script sites of the epilogue
    assert_eq!(logged_for("assets.test."), 1);
    assert_eq!(logged_for("ns.lost.test."), 1);
    assert_eq!(dns.times_asked("ns.lost.test.", RecordType::A), 1);
    // ns.cdn.test. is met in the midst and again in the epilogue
    assert_eq!(report.errors.count(ErrorKind::AutonomousSystemNotFound), 1);
    assert!(report.results.as_results.contains(&name("ns.cdn.test.")));
}
