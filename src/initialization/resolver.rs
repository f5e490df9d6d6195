//! DNS resolver initialization.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tokio::runtime::Runtime;

use crate::config::{DNS_ATTEMPTS, DNS_TIMEOUT_SECS};

/// Initializes the DNS resolver used by the wire querier.
///
/// Uses the default upstream configuration with short timeouts so that dead
/// servers fail fast and end up in the error log instead of stalling a phase.
/// Caching is disabled: the record store is the only cache of a run.
pub fn init_resolver(runtime: &Runtime) -> Arc<TokioAsyncResolver> {
    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = DNS_ATTEMPTS;
    // Names are always fully qualified; never append search domains
    opts.ndots = 0;
    opts.cache_size = 0;

    let _guard = runtime.enter();
    Arc::new(TokioAsyncResolver::tokio(ResolverConfig::default(), opts))
}
