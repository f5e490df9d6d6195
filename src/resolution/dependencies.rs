//! Zone dependency and mail domain resolution.
//!
//! `DnsResolver` answers from the store first and only asks the wire DNS
//! collaborator on a miss. Whatever the collaborator answers is inserted into
//! the store before resolving again, so records learned for one entity are
//! visible to every entity resolved after it.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use super::alias::resolve_address_via_aliases;
use super::path::{resolve_path_with_limit, Path, MAX_PATH_HOPS};
use super::zone::{build_from_ns_record, Zone};
use crate::dns::{DnsQuerier, DomainName, RRecord, RecordType};
use crate::error_handling::{ErrorLog, IntegrityError, QueryError, ResolutionError};
use crate::store::RecordStore;

/// Knobs of the DNS side of the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Ceiling on CNAME hops per path.
    pub max_hops: usize,
    /// Whether the root and top-level domains count as zone dependencies.
    pub include_tld: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_hops: MAX_PATH_HOPS,
            include_tld: false,
        }
    }
}

/// Outcome of walking the zone dependencies of one name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyWalk {
    /// Zones built, in discovery order.
    pub zones: Vec<Zone>,
    /// Every declared nameserver met, including those of zones that failed.
    pub nameservers: Vec<DomainName>,
}

/// What earlier walks already settled, so that later walks neither ask the
/// wire again nor log the same failure twice.
#[derive(Debug, Clone, Default)]
pub struct WalkMemo {
    /// Names whose NS lookup ended without a zone, with their alias targets.
    settled: HashMap<DomainName, Vec<DomainName>>,
    /// Names whose address lookup failed and was logged.
    unresolved: HashSet<DomainName>,
    /// Zones whose build failed and was logged.
    failed_zones: HashSet<DomainName>,
}

/// Store-first resolver backed by a `DnsQuerier`.
pub struct DnsResolver<'a> {
    store: &'a mut RecordStore,
    querier: &'a dyn DnsQuerier,
    settings: ResolverSettings,
    memo: WalkMemo,
}

impl<'a> DnsResolver<'a> {
    pub fn new(
        store: &'a mut RecordStore,
        querier: &'a dyn DnsQuerier,
        settings: ResolverSettings,
    ) -> Self {
        Self::with_memo(store, querier, settings, WalkMemo::default())
    }

    /// Resumes from the memo of an earlier resolver over the same store.
    pub fn with_memo(
        store: &'a mut RecordStore,
        querier: &'a dyn DnsQuerier,
        settings: ResolverSettings,
        memo: WalkMemo,
    ) -> Self {
        Self {
            store,
            querier,
            settings,
            memo,
        }
    }

    pub fn into_memo(self) -> WalkMemo {
        self.memo
    }

    pub fn store(&self) -> &RecordStore {
        &*self.store
    }

    /// Resolves `name` to a path of `rtype`, querying on a store miss.
    pub fn fetch(&mut self, name: &DomainName, rtype: RecordType) -> Result<Path, ResolutionError> {
        match resolve_path_with_limit(self.store, name, rtype, self.settings.max_hops) {
            Err(ResolutionError::NoAvailablePath(_)) => {
                let answer = self.querier.query(name, rtype)?;
                let added = self.store.add_many(answer.records().cloned(), true);
                debug!("Learned {added} records querying {rtype} for {name}");
                resolve_path_with_limit(self.store, name, rtype, self.settings.max_hops)
            }
            other => other,
        }
    }

    /// Finds an address record for `name`: store, aliases, then a query.
    pub fn fetch_address(&mut self, name: &DomainName) -> Result<RRecord, ResolutionError> {
        match resolve_address_via_aliases(self.store, name) {
            Err(ResolutionError::NoAvailablePath(_)) => {
                self.fetch(name, RecordType::A).map(|path| path.terminal().clone())
            }
            other => other,
        }
    }

    /// Looks up the address of `name`, logging a failure once per resolver.
    fn ensure_address(
        &mut self,
        name: &DomainName,
        errors: &mut ErrorLog,
    ) -> Result<(), IntegrityError> {
        if self.memo.unresolved.contains(name) {
            return Ok(());
        }
        if let Err(e) = self.fetch_address(name) {
            self.memo.unresolved.insert(name.clone());
            errors.record_resolution(e, name.as_str())?;
        }
        Ok(())
    }

    /// Targets of the CNAME chain starting at `name`, in chain order.
    ///
    /// The store is consulted first and the wire only when it holds no alias
    /// for `name`. A failed CNAME query means `name` is no alias.
    fn alias_targets(&mut self, name: &DomainName) -> Vec<DomainName> {
        if self.store.lookup_first(name, RecordType::CNAME).is_err()
            && self.fetch(name, RecordType::CNAME).is_err()
        {
            return Vec::new();
        }

        let mut targets: Vec<DomainName> = Vec::new();
        let mut current = name.clone();
        while targets.len() < self.settings.max_hops {
            let next = match self.store.lookup_first(&current, RecordType::CNAME) {
                Ok(alias) => alias.value_names().into_iter().next(),
                Err(_) => None,
            };
            let Some(next) = next else { break };
            if &next == name || targets.contains(&next) {
                break;
            }
            targets.push(next.clone());
            current = next;
        }
        targets
    }

    fn seed_names(&self, name: &DomainName) -> Vec<DomainName> {
        name.ancestors()
            .into_iter()
            .filter(|n| self.settings.include_tld || !(n.is_root() || n.is_tld()))
            .collect()
    }

    fn enqueue(&self, work: &mut Vec<DomainName>, name: &DomainName) {
        for ancestor in self.seed_names(name) {
            if !work.contains(&ancestor) {
                work.push(ancestor);
            }
        }
    }

    /// Every zone `domain` depends on, in discovery order, with the nameservers met.
    ///
    /// Walks the ancestors of `domain`, the ancestors of every alias target met
    /// on the way and the ancestors of every nameserver found, building each
    /// zone once. Per-name failures are logged into `errors`, each at most once
    /// over the lifetime of the resolver.
    ///
    /// # Errors
    ///
    /// Only integrity violations are returned.
    pub fn resolve_zone_dependencies(
        &mut self,
        domain: &DomainName,
        errors: &mut ErrorLog,
    ) -> Result<DependencyWalk, IntegrityError> {
        let mut work: Vec<DomainName> = Vec::new();
        self.enqueue(&mut work, domain);
        let mut zones: Vec<Zone> = Vec::new();
        let mut nameservers: Vec<DomainName> = Vec::new();

        let mut next = 0;
        while next < work.len() {
            let current = work[next].clone();
            next += 1;

            if let Some(targets) = self.memo.settled.get(&current) {
                for target in targets.clone() {
                    self.enqueue(&mut work, &target);
                }
                continue;
            }

            let ns_path = match self.fetch(&current, RecordType::NS) {
                Ok(path) => path,
                Err(e) => {
                    // NoAnswer only means `current` is not a zone apex
                    if !matches!(e, ResolutionError::Query(QueryError::NoAnswer { .. })) {
                        errors.record_resolution(e, current.as_str())?;
                    }
                    let targets = self.alias_targets(&current);
                    for target in &targets {
                        self.enqueue(&mut work, target);
                    }
                    self.memo.settled.insert(current, targets);
                    continue;
                }
            };
            for hop in ns_path.hops() {
                for target in hop.value_names() {
                    self.enqueue(&mut work, &target);
                }
            }

            let zone_name = ns_path.canonical_name();
            if zones.iter().any(|zone| zone.name() == zone_name) {
                continue;
            }
            debug!("{domain} depends on zone {zone_name}");

            let ns_record = ns_path.terminal();
            for nameserver in ns_record.value_names() {
                self.ensure_address(&nameserver, errors)?;
                self.enqueue(&mut work, &nameserver);
                if !nameservers.contains(&nameserver) {
                    nameservers.push(nameserver);
                }
            }

            match build_from_ns_record(self.store, ns_record) {
                Ok(zone) => zones.push(zone),
                Err(e) => {
                    if self.memo.failed_zones.insert(zone_name.clone()) {
                        errors.record_resolution(e, zone_name.as_str())?;
                    }
                }
            }
        }

        info!("{domain} depends on {} zones", zones.len());
        Ok(DependencyWalk { zones, nameservers })
    }

    /// Mail servers of `mail_domain`, each with its address resolved.
    ///
    /// A mail server whose address cannot be found is still listed; the
    /// failure goes to `errors`. An MX failure yields an empty list.
    pub fn resolve_mail_domain(
        &mut self,
        mail_domain: &DomainName,
        errors: &mut ErrorLog,
    ) -> Result<Vec<DomainName>, IntegrityError> {
        let mx_path = match self.fetch(mail_domain, RecordType::MX) {
            Ok(path) => path,
            Err(e) => {
                errors.record_resolution(e, mail_domain.as_str())?;
                return Ok(Vec::new());
            }
        };
        let mail_servers = mx_path.terminal().value_names();
        for server in &mail_servers {
            self.ensure_address(server, errors)?;
        }
        debug!("{mail_domain} has {} mail servers", mail_servers.len());
        Ok(mail_servers)
    }
}
