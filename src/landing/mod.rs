//! Page landing and script discovery.
//!
//! This module provides:
//! - The landing model (`Scheme`, `Landing`, `SiteLanding`) and script references
//! - The `LandingResolver` and `ScriptCollector` collaborator traits
//! - Default implementations backed by `reqwest` and `scraper`

mod http;
mod scripts;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use strum_macros::EnumIter;
use url::Url;

use crate::dns::DomainName;
use crate::error_handling::CollaboratorError;

// Re-export public API
pub use http::{HtmlScriptCollector, HttpLandingResolver};
pub use scripts::extract_scripts;

/// URL scheme a site is landed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a site ended up after redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Landing {
    pub url: Url,
    /// Host name serving the landing page.
    pub server: DomainName,
}

impl Landing {
    /// Builds a landing from its final URL, taking the server from the host.
    pub fn from_url(url: Url) -> Result<Self, CollaboratorError> {
        let server = host_name(&url)?;
        Ok(Self { url, server })
    }
}

/// Landing outcome of one site for both schemes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteLanding {
    pub https: Option<Landing>,
    pub http: Option<Landing>,
}

impl SiteLanding {
    pub fn set(&mut self, scheme: Scheme, landing: Landing) {
        match scheme {
            Scheme::Https => self.https = Some(landing),
            Scheme::Http => self.http = Some(landing),
        }
    }

    pub fn landings(&self) -> impl Iterator<Item = &Landing> {
        self.https.iter().chain(self.http.iter())
    }

    /// Distinct server names of the successful landings.
    pub fn servers(&self) -> BTreeSet<DomainName> {
        self.landings().map(|landing| landing.server.clone()).collect()
    }

    pub fn is_unreachable(&self) -> bool {
        self.https.is_none() && self.http.is_none()
    }
}

/// A script element of a landing page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScriptRef {
    pub src: Url,
    pub integrity: Option<String>,
}

impl ScriptRef {
    /// The site hosting the script: the host of its source URL.
    pub fn site(&self) -> Result<DomainName, CollaboratorError> {
        host_name(&self.src)
    }
}

fn host_name(url: &Url) -> Result<DomainName, CollaboratorError> {
    let host = url
        .host_str()
        .ok_or_else(|| CollaboratorError::MissingHost(url.to_string()))?;
    DomainName::new(host).map_err(|_| CollaboratorError::MissingHost(url.to_string()))
}

/// Resolves the landing destination of a site for one scheme.
pub trait LandingResolver {
    fn land(&self, site: &str, scheme: Scheme) -> Result<Landing, CollaboratorError>;
}

/// Lists the scripts referenced by a landing page.
pub trait ScriptCollector {
    fn scripts(&self, page: &Url) -> Result<Vec<ScriptRef>, CollaboratorError>;
}
