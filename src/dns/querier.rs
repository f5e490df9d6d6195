//! Wire DNS queries.
//!
//! The mapper never speaks the DNS protocol itself: it asks a `DnsQuerier`
//! for `(name, type)` and receives the answer record together with the CNAME
//! chain traversed to reach it. `HickoryQuerier` is the default
//! implementation, backed by `hickory-resolver`.

use std::sync::Arc;

use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType as WireRecordType};
use hickory_resolver::TokioAsyncResolver;
use log::debug;
use tokio::runtime::Runtime;

use super::name::DomainName;
use super::record::{RRecord, RecordType};
use crate::error_handling::QueryError;

/// Answer to a single query.
#[derive(Debug, Clone)]
pub struct QueryAnswer {
    /// The terminal record, named after the canonical name.
    pub answer: RRecord,
    /// CNAME records traversed from the query name to the canonical name.
    pub aliases: Vec<RRecord>,
}

impl QueryAnswer {
    /// All records of the answer, aliases first.
    pub fn records(&self) -> impl Iterator<Item = &RRecord> {
        self.aliases.iter().chain(std::iter::once(&self.answer))
    }
}

/// Blocking `resolve(name, type)` collaborator.
pub trait DnsQuerier {
    /// Queries `name` for records of `rtype`.
    ///
    /// # Errors
    ///
    /// `QueryError::NoAnswer` when the name exists but carries no record of the
    /// type, `QueryError::NonExistentDomain` on NXDOMAIN, `QueryError::Failed`
    /// for anything else.
    fn query(&self, name: &DomainName, rtype: RecordType) -> Result<QueryAnswer, QueryError>;
}

fn to_wire(rtype: RecordType) -> WireRecordType {
    match rtype {
        RecordType::A => WireRecordType::A,
        RecordType::NS => WireRecordType::NS,
        RecordType::CNAME => WireRecordType::CNAME,
        RecordType::MX => WireRecordType::MX,
    }
}

/// `DnsQuerier` backed by an async hickory resolver driven on a private runtime.
pub struct HickoryQuerier {
    resolver: Arc<TokioAsyncResolver>,
    runtime: Arc<Runtime>,
}

impl HickoryQuerier {
    pub fn new(resolver: Arc<TokioAsyncResolver>, runtime: Arc<Runtime>) -> Self {
        Self { resolver, runtime }
    }

    fn classify(name: &DomainName, rtype: RecordType, error: ResolveError) -> QueryError {
        match error.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. } => {
                if *response_code == ResponseCode::NXDomain {
                    QueryError::NonExistentDomain(name.to_string())
                } else {
                    QueryError::NoAnswer {
                        name: name.to_string(),
                        rtype,
                    }
                }
            }
            _ => QueryError::Failed {
                name: name.to_string(),
                rtype,
                reason: error.to_string(),
            },
        }
    }
}

impl DnsQuerier for HickoryQuerier {
    fn query(&self, name: &DomainName, rtype: RecordType) -> Result<QueryAnswer, QueryError> {
        debug!("Querying {rtype} records for {name}");
        let lookup = self
            .runtime
            .block_on(self.resolver.lookup(name.as_str(), to_wire(rtype)))
            .map_err(|e| Self::classify(name, rtype, e))?;

        let mut aliases = Vec::new();
        let mut canonical = name.clone();
        let mut values = Vec::new();
        for record in lookup.records() {
            let owner = match DomainName::new(&record.name().to_utf8()) {
                Ok(owner) => owner,
                Err(_) => continue,
            };
            match record.data() {
                Some(RData::CNAME(target)) if rtype != RecordType::CNAME => {
                    let target = target.to_utf8();
                    if let Ok(alias) = RRecord::new(owner, RecordType::CNAME, vec![target.clone()]) {
                        aliases.push(alias);
                    }
                    if let Ok(target) = DomainName::new(&target) {
                        canonical = target;
                    }
                }
                Some(RData::A(address)) if rtype == RecordType::A => {
                    canonical = owner;
                    values.push(address.to_string());
                }
                Some(RData::NS(ns)) if rtype == RecordType::NS => {
                    canonical = owner;
                    values.push(ns.to_utf8());
                }
                Some(RData::CNAME(target)) if rtype == RecordType::CNAME => {
                    canonical = owner;
                    values.push(target.to_utf8());
                }
                Some(RData::MX(mx)) if rtype == RecordType::MX => {
                    canonical = owner;
                    values.push(format!("{} {}", mx.preference(), mx.exchange().to_utf8()));
                }
                _ => {}
            }
        }

        if values.is_empty() {
            return Err(QueryError::NoAnswer {
                name: name.to_string(),
                rtype,
            });
        }
        let answer = RRecord::new(canonical, rtype, values).map_err(|e| QueryError::Failed {
            name: name.to_string(),
            rtype,
            reason: e.to_string(),
        })?;
        Ok(QueryAnswer { answer, aliases })
    }
}
