//! Cumulative results of a mapping run.
//!
//! Every aggregate merges first-seen-wins: once a key is present, a later
//! phase never overwrites it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use url::Url;

use crate::asn::{AsResolutionResults, RovResults};
use crate::dns::DomainName;
use crate::landing::{ScriptRef, SiteLanding};
use crate::resolution::Zone;

fn merge_first_wins<K: Ord + Clone, V: Clone>(
    into: &mut BTreeMap<K, V>,
    from: &BTreeMap<K, V>,
) -> usize {
    let mut added = 0;
    for (key, value) in from {
        if !into.contains_key(key) {
            into.insert(key.clone(), value.clone());
            added += 1;
        }
    }
    added
}

/// The DNS dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneDependencies {
    /// Domain name to the zones it depends on.
    pub per_domain: BTreeMap<DomainName, Vec<Zone>>,
    /// Nameserver to the zones naming it (fan-in).
    pub per_nameserver: BTreeMap<DomainName, Vec<DomainName>>,
}

impl ZoneDependencies {
    pub fn merge(&mut self, other: &ZoneDependencies) -> usize {
        merge_first_wins(&mut self.per_domain, &other.per_domain)
            + merge_first_wins(&mut self.per_nameserver, &other.per_nameserver)
    }

    /// Distinct zones across all domains, by name, first occurrence kept.
    pub fn zones(&self) -> Vec<&Zone> {
        let mut seen = BTreeSet::new();
        self.per_domain
            .values()
            .flatten()
            .filter(|zone| seen.insert(zone.name().clone()))
            .collect()
    }
}

/// Script hosting dependencies discovered on landing pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptDependencies {
    /// Web site to the scripts its landing pages reference.
    pub per_site: BTreeMap<String, BTreeSet<ScriptRef>>,
    /// Script source to the sites hosting it.
    pub hosting_sites: BTreeMap<Url, BTreeSet<DomainName>>,
}

impl ScriptDependencies {
    pub fn merge(&mut self, other: &ScriptDependencies) -> usize {
        merge_first_wins(&mut self.per_site, &other.per_site)
            + merge_first_wins(&mut self.hosting_sites, &other.hosting_sites)
    }

    /// Every script hosting site, sorted.
    pub fn all_sites(&self) -> BTreeSet<DomainName> {
        self.hosting_sites.values().flatten().cloned().collect()
    }
}

/// DNS and AS results of one phase.
#[derive(Debug, Clone, Default)]
pub struct PhaseResults {
    pub zone_dependencies: ZoneDependencies,
    pub as_results: AsResolutionResults,
}

/// Everything a run produced, merged across phases.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MappingResults {
    pub web_sites: BTreeMap<String, SiteLanding>,
    pub mail_domains: BTreeMap<DomainName, Vec<DomainName>>,
    pub zone_dependencies: ZoneDependencies,
    pub as_results: AsResolutionResults,
    pub scripts: ScriptDependencies,
    pub script_sites: BTreeMap<DomainName, SiteLanding>,
    pub rov: RovResults,
}

impl MappingResults {
    /// Merges a phase's DNS and AS results into the totals.
    pub fn merge_phase(&mut self, phase: &PhaseResults) {
        self.zone_dependencies.merge(&phase.zone_dependencies);
        self.as_results.merge(&phase.as_results);
    }

    pub fn merge_web_sites(&mut self, landings: &BTreeMap<String, SiteLanding>) -> usize {
        merge_first_wins(&mut self.web_sites, landings)
    }

    pub fn merge_mail_domains(&mut self, domains: &BTreeMap<DomainName, Vec<DomainName>>) -> usize {
        merge_first_wins(&mut self.mail_domains, domains)
    }

    pub fn merge_script_sites(&mut self, landings: &BTreeMap<DomainName, SiteLanding>) -> usize {
        merge_first_wins(&mut self.script_sites, landings)
    }
}
