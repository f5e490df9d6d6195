//! Resolution over the record store.
//!
//! This module provides:
//! - Alias-chasing path resolution with a hop ceiling (`resolve_path`)
//! - Reverse alias lookups (`all_aliases_of`, `resolve_address_via_aliases`)
//! - All-or-nothing zone reconstruction (`build_from_ns_record`, `zones_naming`)
//! - Store-first zone dependency and mail domain resolution (`DnsResolver`)

mod alias;
mod dependencies;
mod path;
mod zone;

// Re-export public API
pub use alias::{all_aliases_of, resolve_address_via_aliases};
pub use dependencies::{DependencyWalk, DnsResolver, ResolverSettings, WalkMemo};
pub use path::{resolve_path, resolve_path_with_limit, Path, MAX_PATH_HOPS};
pub use zone::{build_from_ns_record, build_zone, zones_naming, Zone};
