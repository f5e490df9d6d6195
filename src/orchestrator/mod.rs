//! The three-phase resolution pipeline.
//!
//! - **Preamble**: land the web sites, resolve the mail domains.
//! - **Midst**: zone dependencies and AS mapping of the preamble's frontier,
//!   script discovery on the landing pages, landing of the script sites.
//! - **Epilogue**: zone dependencies and AS mapping of the script sites'
//!   servers, then the ROV cross-check over the cumulative AS results.
//!
//! Each phase consumes the frontier of the previous one. Per-entity failures
//! end up in the error log and the phase moves on to the next entity; only
//! integrity violations abort the run.

mod results;

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use strum::IntoEnumIterator;

use crate::asn::{cross_check, map_nameservers, RangeTable, RovPrefixSource};
use crate::dns::{DnsQuerier, DomainName};
use crate::error_handling::{
    categorize_landing_error, ErrorKind, ErrorLog, IntegrityError,
};
use crate::landing::{LandingResolver, Scheme, ScriptCollector, SiteLanding};
use crate::resolution::{zones_naming, DnsResolver, ResolverSettings, WalkMemo};
use crate::store::RecordStore;

// Re-export public API
pub use results::{
    MappingResults, PhaseResults, ScriptDependencies, ZoneDependencies,
};

/// Names to resolve in the next phase, in discovery order without repeats.
pub type Frontier = Vec<DomainName>;

fn push_unique(frontier: &mut Frontier, name: DomainName) {
    if !frontier.contains(&name) {
        frontier.push(name);
    }
}

/// The external collaborators of a run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub dns: &'a dyn DnsQuerier,
    pub landing: &'a dyn LandingResolver,
    pub scripts: &'a dyn ScriptCollector,
    /// Prefix tables for the ROV cross-check; `None` skips it.
    pub rov: Option<&'a dyn RovPrefixSource>,
}

/// Knobs of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub resolver: ResolverSettings,
    /// Whether script discovery and script site landing run in the midst.
    pub resolve_scripts: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            resolver: ResolverSettings::default(),
            resolve_scripts: true,
        }
    }
}

/// Everything a finished run hands back.
#[derive(Debug)]
pub struct MappingReport {
    pub results: MappingResults,
    pub errors: ErrorLog,
    pub store: RecordStore,
}

/// Drives the preamble, midst and epilogue over one exclusively owned store.
pub struct ResolutionOrchestrator<'a> {
    store: RecordStore,
    table: &'a RangeTable,
    collaborators: Collaborators<'a>,
    settings: OrchestratorSettings,
    results: MappingResults,
    errors: ErrorLog,
    memo: WalkMemo,
}

impl<'a> ResolutionOrchestrator<'a> {
    pub fn new(
        table: &'a RangeTable,
        collaborators: Collaborators<'a>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self::with_store(RecordStore::new(), table, collaborators, settings)
    }

    /// Starts from a pre-seeded store, e.g. one loaded from a snapshot.
    pub fn with_store(
        store: RecordStore,
        table: &'a RangeTable,
        collaborators: Collaborators<'a>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            store,
            table,
            collaborators,
            settings,
            results: MappingResults::default(),
            errors: ErrorLog::new(),
            memo: WalkMemo::default(),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn results(&self) -> &MappingResults {
        &self.results
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Runs the three phases in sequence.
    pub fn run(
        mut self,
        web_sites: &[String],
        mail_domains: &[String],
    ) -> Result<MappingReport, IntegrityError> {
        let frontier = self.preamble(web_sites, mail_domains)?;
        let frontier = self.midst(&frontier)?;
        self.epilogue(&frontier)?;
        Ok(self.finish())
    }

    pub fn finish(self) -> MappingReport {
        MappingReport {
            results: self.results,
            errors: self.errors,
            store: self.store,
        }
    }

    /// Lands the web sites and resolves the mail domains.
    ///
    /// The frontier is the landing servers, then the mail domains with their
    /// mail servers.
    pub fn preamble(
        &mut self,
        web_sites: &[String],
        mail_domains: &[String],
    ) -> Result<Frontier, IntegrityError> {
        info!(
            "Preamble: {} web sites, {} mail domains",
            web_sites.len(),
            mail_domains.len()
        );
        let mut frontier = Frontier::new();

        let mut landings: BTreeMap<String, SiteLanding> = BTreeMap::new();
        for site in web_sites.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let landing = self.land(site);
            for server in landing.servers() {
                push_unique(&mut frontier, server);
            }
            landings.entry(site.to_string()).or_insert(landing);
        }
        self.results.merge_web_sites(&landings);

        let mut mail_results: BTreeMap<DomainName, Vec<DomainName>> = BTreeMap::new();
        {
            let mut resolver = DnsResolver::with_memo(
                &mut self.store,
                self.collaborators.dns,
                self.settings.resolver,
                std::mem::take(&mut self.memo),
            );
            for raw in mail_domains.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
                let mail_domain = match DomainName::new(raw) {
                    Ok(name) => name,
                    Err(e) => {
                        self.errors.add(ErrorKind::InvalidDomainName, raw, e.to_string());
                        continue;
                    }
                };
                if mail_results.contains_key(&mail_domain) {
                    continue;
                }
                let servers = resolver.resolve_mail_domain(&mail_domain, &mut self.errors)?;
                push_unique(&mut frontier, mail_domain.clone());
                for server in &servers {
                    push_unique(&mut frontier, server.clone());
                }
                mail_results.insert(mail_domain, servers);
            }
            self.memo = resolver.into_memo();
        }
        self.results.merge_mail_domains(&mail_results);

        info!("Preamble done: frontier of {} names", frontier.len());
        Ok(frontier)
    }

    /// Maps the preamble's frontier, then discovers and lands the script sites.
    ///
    /// The frontier is the landing servers of the script sites.
    pub fn midst(&mut self, frontier: &[DomainName]) -> Result<Frontier, IntegrityError> {
        info!("Midst: {} names", frontier.len());
        let phase = self.resolve_dependencies(frontier)?;
        self.results.merge_phase(&phase);

        let mut next = Frontier::new();
        if !self.settings.resolve_scripts {
            info!("Midst done: script resolution disabled");
            return Ok(next);
        }

        let scripts = self.collect_scripts();
        self.results.scripts.merge(&scripts);

        let mut script_landings: BTreeMap<DomainName, SiteLanding> = BTreeMap::new();
        for site in scripts.all_sites() {
            if self.results.script_sites.contains_key(&site) {
                continue;
            }
            let landing = self.land(site.as_str().trim_end_matches('.'));
            for server in landing.servers() {
                push_unique(&mut next, server);
            }
            script_landings.insert(site, landing);
        }
        self.results.merge_script_sites(&script_landings);

        info!("Midst done: frontier of {} names", next.len());
        Ok(next)
    }

    /// Maps the midst's frontier and runs the ROV cross-check.
    pub fn epilogue(&mut self, frontier: &[DomainName]) -> Result<(), IntegrityError> {
        info!("Epilogue: {} names", frontier.len());
        let phase = self.resolve_dependencies(frontier)?;
        self.results.merge_phase(&phase);

        match self.collaborators.rov {
            Some(source) => {
                self.results.rov = cross_check(&self.results.as_results, source, &mut self.errors);
            }
            None => info!("ROV cross-check skipped: no prefix source"),
        }
        info!("Epilogue done");
        Ok(())
    }

    /// Zone dependencies, fan-in and AS mapping of every frontier name.
    fn resolve_dependencies(
        &mut self,
        frontier: &[DomainName],
    ) -> Result<PhaseResults, IntegrityError> {
        let mut phase = PhaseResults::default();
        let mut nameservers: Vec<DomainName> = Vec::new();
        {
            let mut resolver = DnsResolver::with_memo(
                &mut self.store,
                self.collaborators.dns,
                self.settings.resolver,
                std::mem::take(&mut self.memo),
            );
            for name in frontier {
                if phase.zone_dependencies.per_domain.contains_key(name)
                    || self.results.zone_dependencies.per_domain.contains_key(name)
                {
                    continue;
                }
                let walk = resolver.resolve_zone_dependencies(name, &mut self.errors)?;
                for nameserver in walk.nameservers {
                    if !nameservers.contains(&nameserver) {
                        nameservers.push(nameserver);
                    }
                }
                phase
                    .zone_dependencies
                    .per_domain
                    .insert(name.clone(), walk.zones);
            }
            self.memo = resolver.into_memo();
        }

        for nameserver in &nameservers {
            let zones = zones_naming(&self.store, nameserver);
            debug!("{nameserver} is named by {} zones", zones.len());
            phase
                .zone_dependencies
                .per_nameserver
                .insert(nameserver.clone(), zones);
        }

        // Nameservers mapped by an earlier phase keep their first record
        let unmapped: Vec<DomainName> = nameservers
            .into_iter()
            .filter(|nameserver| !self.results.as_results.contains(nameserver))
            .collect();
        phase.as_results = map_nameservers(self.table, &self.store, &unmapped, &mut self.errors);
        Ok(phase)
    }

    /// Lands `site` with every scheme, logging each failure.
    fn land(&mut self, site: &str) -> SiteLanding {
        let mut landing = SiteLanding::default();
        for scheme in Scheme::iter() {
            match self.collaborators.landing.land(site, scheme) {
                Ok(found) => landing.set(scheme, found),
                Err(e) => {
                    let kind = categorize_landing_error(&e);
                    self.errors.record_collaborator(kind, &e, format!("{scheme}://{site}"));
                }
            }
        }
        landing
    }

    /// Scripts of every web site's landing pages and the sites hosting them.
    fn collect_scripts(&mut self) -> ScriptDependencies {
        let mut scripts = ScriptDependencies::default();
        let pages: Vec<(String, url::Url)> = self
            .results
            .web_sites
            .iter()
            .flat_map(|(site, landing)| {
                landing
                    .landings()
                    .map(|l| (site.clone(), l.url.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (site, page) in pages {
            let found = match self.collaborators.scripts.scripts(&page) {
                Ok(found) => found,
                Err(e) => {
                    self.errors.record_collaborator(
                        ErrorKind::ScriptCollectionFailed,
                        &e,
                        page.as_str(),
                    );
                    continue;
                }
            };
            for script in found {
                match script.site() {
                    Ok(host) => {
                        scripts
                            .hosting_sites
                            .entry(script.src.clone())
                            .or_insert_with(BTreeSet::new)
                            .insert(host);
                    }
                    Err(e) => {
                        self.errors.record_collaborator(
                            ErrorKind::ScriptCollectionFailed,
                            &e,
                            script.src.as_str(),
                        );
                    }
                }
                scripts.per_site.entry(site.clone()).or_default().insert(script);
            }
        }
        info!(
            "Found {} scripts hosted on {} sites",
            scripts.hosting_sites.len(),
            scripts.all_sites().len()
        );
        scripts
    }
}
