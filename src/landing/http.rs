//! `reqwest`-backed landing and script collaborators.
//!
//! Both drive the async client on a private runtime so that the resolution
//! core stays synchronous.

use std::sync::Arc;

use log::debug;
use tokio::runtime::Runtime;
use url::Url;

use super::scripts::extract_scripts;
use super::{Landing, LandingResolver, Scheme, ScriptCollector, ScriptRef};
use crate::error_handling::CollaboratorError;

fn request_error(target: &str, error: reqwest::Error) -> CollaboratorError {
    CollaboratorError::Request {
        target: target.to_string(),
        reason: error.to_string(),
    }
}

/// Lands a site by requesting its root page and following redirects.
pub struct HttpLandingResolver {
    client: Arc<reqwest::Client>,
    runtime: Arc<Runtime>,
}

impl HttpLandingResolver {
    pub fn new(client: Arc<reqwest::Client>, runtime: Arc<Runtime>) -> Self {
        Self { client, runtime }
    }
}

impl LandingResolver for HttpLandingResolver {
    fn land(&self, site: &str, scheme: Scheme) -> Result<Landing, CollaboratorError> {
        let target = format!("{scheme}://{}/", site.trim_end_matches('.'));
        let start = Url::parse(&target).map_err(|_| CollaboratorError::InvalidUrl(target.clone()))?;
        debug!("Landing {start}");
        let final_url = self
            .runtime
            .block_on(async {
                let response = self.client.get(start).send().await?;
                Ok::<Url, reqwest::Error>(response.url().clone())
            })
            .map_err(|e| request_error(&target, e))?;
        debug!("{target} landed on {final_url}");
        Landing::from_url(final_url)
    }
}

/// Downloads a landing page and lists its `<script src>` elements.
pub struct HtmlScriptCollector {
    client: Arc<reqwest::Client>,
    runtime: Arc<Runtime>,
}

impl HtmlScriptCollector {
    pub fn new(client: Arc<reqwest::Client>, runtime: Arc<Runtime>) -> Self {
        Self { client, runtime }
    }
}

impl ScriptCollector for HtmlScriptCollector {
    fn scripts(&self, page: &Url) -> Result<Vec<ScriptRef>, CollaboratorError> {
        let body = self
            .runtime
            .block_on(async {
                let response = self.client.get(page.clone()).send().await?;
                response.error_for_status()?.text().await
            })
            .map_err(|e| request_error(page.as_str(), e))?;
        let scripts = extract_scripts(page, &body);
        debug!("Found {} scripts on {page}", scripts.len());
        Ok(scripts)
    }
}
