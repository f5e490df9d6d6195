// Shared test helpers: in-memory collaborators and a small mapped world.
//
// The world is a web shop whose zone is served from a DNS provider, a mail
// domain in the same zone, and a script hosted on a site whose only
// nameserver has no address.

#![allow(dead_code)] // Each test file uses a different subset

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::Ipv4Addr;

use url::Url;

use dns_rov_mapper::asn::{AutonomousSystemEntry, PrefixRow, RangeTable, RovState, TsvPrefixSource};
use dns_rov_mapper::dns::{DnsQuerier, DomainName, QueryAnswer, RRecord, RecordKey, RecordType};
use dns_rov_mapper::error_handling::{CollaboratorError, QueryError};
use dns_rov_mapper::landing::{Landing, LandingResolver, Scheme, ScriptCollector, ScriptRef};
use dns_rov_mapper::resolution::resolve_path;
use dns_rov_mapper::store::RecordStore;

pub fn name(raw: &str) -> DomainName {
    DomainName::new(raw).expect("valid test name")
}

pub fn record(owner: &str, rtype: RecordType, values: &[&str]) -> RRecord {
    RRecord::from_parts(owner, rtype, values).expect("valid test record")
}

pub fn url(raw: &str) -> Url {
    Url::parse(raw).expect("valid test url")
}

/// Authoritative answers for every name of a fixed record set.
///
/// Queries follow CNAME chains inside the set like a recursive resolver would.
/// Missing data answers `NoAnswer`, names listed with `nxdomain` answer
/// `NonExistentDomain`.
pub struct WorldDns {
    world: RecordStore,
    nxdomain: Vec<DomainName>,
    asked: RefCell<Vec<RecordKey>>,
}

impl WorldDns {
    pub fn new(records: Vec<RRecord>) -> Self {
        let mut world = RecordStore::new();
        world.add_many(records, true);
        Self {
            world,
            nxdomain: Vec::new(),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn nxdomain(mut self, raw: &str) -> Self {
        self.nxdomain.push(name(raw));
        self
    }

    pub fn was_asked(&self, owner: &str, rtype: RecordType) -> bool {
        self.asked
            .borrow()
            .contains(&RecordKey::new(name(owner), rtype))
    }

    pub fn times_asked(&self, owner: &str, rtype: RecordType) -> usize {
        let key = RecordKey::new(name(owner), rtype);
        self.asked.borrow().iter().filter(|asked| **asked == key).count()
    }

    pub fn query_count(&self) -> usize {
        self.asked.borrow().len()
    }
}

impl DnsQuerier for WorldDns {
    fn query(&self, owner: &DomainName, rtype: RecordType) -> Result<QueryAnswer, QueryError> {
        self.asked
            .borrow_mut()
            .push(RecordKey::new(owner.clone(), rtype));
        if self.nxdomain.contains(owner) {
            return Err(QueryError::NonExistentDomain(owner.to_string()));
        }
        match resolve_path(&self.world, owner, rtype) {
            Ok(path) => Ok(QueryAnswer {
                answer: path.terminal().clone(),
                aliases: path.hops().to_vec(),
            }),
            Err(_) => Err(QueryError::NoAnswer {
                name: owner.to_string(),
                rtype,
            }),
        }
    }
}

/// Landing destinations keyed by site and scheme; everything else is refused.
#[derive(Default)]
pub struct FixedLanding {
    destinations: HashMap<(String, Scheme), Url>,
}

impl FixedLanding {
    pub fn lands(mut self, site: &str, scheme: Scheme, destination: &str) -> Self {
        self.destinations
            .insert((site.to_string(), scheme), url(destination));
        self
    }
}

impl LandingResolver for FixedLanding {
    fn land(&self, site: &str, scheme: Scheme) -> Result<Landing, CollaboratorError> {
        match self.destinations.get(&(site.to_string(), scheme)) {
            Some(destination) => Landing::from_url(destination.clone()),
            None => Err(CollaboratorError::Request {
                target: format!("{scheme}://{site}/"),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Script lists keyed by landing page; unknown pages carry no scripts.
#[derive(Default)]
pub struct FixedScripts {
    pages: HashMap<Url, Vec<ScriptRef>>,
}

impl FixedScripts {
    pub fn serves(mut self, page: &str, script: &str) -> Self {
        self.pages.entry(url(page)).or_default().push(ScriptRef {
            src: url(script),
            integrity: None,
        });
        self
    }
}

impl ScriptCollector for FixedScripts {
    fn scripts(&self, page: &Url) -> Result<Vec<ScriptRef>, CollaboratorError> {
        Ok(self.pages.get(page).cloned().unwrap_or_default())
    }
}

pub fn shop_records() -> Vec<RRecord> {
    vec![
        record("www.shop.example.", RecordType::CNAME, &["edge.cdn.test."]),
        record("edge.cdn.test.", RecordType::A, &["203.0.113.10"]),
        record("shop.example.", RecordType::NS, &["ns1.dns.test.", "ns2.dns.test."]),
        record("shop.example.", RecordType::MX, &["10 mx.shop.example."]),
        record("mx.shop.example.", RecordType::A, &["192.0.2.25"]),
        record("dns.test.", RecordType::NS, &["ns1.dns.test."]),
        record("ns1.dns.test.", RecordType::A, &["192.0.2.1"]),
        record("ns2.dns.test.", RecordType::A, &["198.51.100.7"]),
        record("static.assets.test.", RecordType::A, &["198.51.100.80"]),
        record("assets.test.", RecordType::NS, &["ns.lost.test."]),
    ]
}

pub fn shop_landing() -> FixedLanding {
    FixedLanding::default()
        .lands("shop.example", Scheme::Https, "https://www.shop.example/")
        .lands("static.assets.test", Scheme::Https, "https://static.assets.test/")
}

pub fn shop_scripts() -> FixedScripts {
    FixedScripts::default().serves(
        "https://www.shop.example/",
        "https://static.assets.test/app.js",
    )
}

pub fn range_table() -> RangeTable {
    RangeTable::from_entries(vec![
        AutonomousSystemEntry::new(
            64500,
            "DNS-PROVIDER",
            "US",
            Ipv4Addr::new(192, 0, 2, 0),
            Ipv4Addr::new(192, 0, 2, 255),
        ),
        AutonomousSystemEntry::new(
            64501,
            "SECOND-PROVIDER",
            "NL",
            Ipv4Addr::new(198, 51, 100, 0),
            Ipv4Addr::new(198, 51, 100, 127),
        ),
        AutonomousSystemEntry::new(
            0,
            "Not routed",
            "None",
            Ipv4Addr::new(203, 0, 113, 0),
            Ipv4Addr::new(203, 0, 113, 255),
        ),
    ])
}

pub fn prefix_source() -> TsvPrefixSource {
    TsvPrefixSource::from_rows(vec![(
        64500,
        PrefixRow {
            prefix: "192.0.2.0/24".parse().expect("valid prefix"),
            rov_state: RovState::Valid,
            country_code: "US".to_string(),
            visibility: Some(120),
            roas: "64500 192.0.2.0/24".to_string(),
        },
    )])
    .with_empty_table(64501)
}
