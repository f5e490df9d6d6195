//! dns_rov_mapper library: DNS dependency graphs mapped onto autonomous systems.
//!
//! Starting from web sites and mail domains, a run resolves the zones every
//! name depends on, the nameservers of those zones and their addresses, maps
//! each address onto the autonomous system announcing it, and cross-checks
//! the announcing prefixes against route origin validation tables. Scripts
//! referenced by the landing pages of the web sites pull their hosting sites
//! into the graph as well.
//!
//! # Example
//!
//! ```no_run
//! use dns_rov_mapper::{run_mapping, Config};
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     web_sites: Some(PathBuf::from("sites.txt")),
//!     mail_domains: Some(PathBuf::from("mail_domains.txt")),
//!     as_table: PathBuf::from("ip2asn-v4.tsv"),
//!     ..Default::default()
//! };
//!
//! let run = run_mapping(config)?;
//! println!(
//!     "{} nameservers mapped, {} errors logged",
//!     run.report.results.as_results.len(),
//!     run.report.errors.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The resolution core is synchronous. `run_mapping` starts its own Tokio
//! runtime for the network collaborators, so it must not be called from
//! inside an async context.

mod app;
pub mod asn;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod landing;
pub mod orchestrator;
pub mod resolution;
pub mod store;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use orchestrator::{
    Collaborators, MappingReport, MappingResults, OrchestratorSettings, ResolutionOrchestrator,
};
pub use run::{read_seed_file, run_mapping, RunReport};

// Internal run module (wires the collaborators and drives a mapping run)
mod run {
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::path::{Path, PathBuf};
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::info;

    use crate::app::print_run_summary;
    use crate::asn::{RangeTable, RovPrefixSource, TsvPrefixSource};
    use crate::config::Config;
    use crate::dns::HickoryQuerier;
    use crate::export::{export_all, ExportOptions, ExportReport};
    use crate::initialization::{init_client, init_resolver, init_runtime};
    use crate::landing::{HtmlScriptCollector, HttpLandingResolver};
    use crate::orchestrator::{
        Collaborators, MappingReport, OrchestratorSettings, ResolutionOrchestrator,
    };
    use crate::resolution::ResolverSettings;
    use crate::store::RecordStore;

    /// Outcome of a mapping run.
    #[derive(Debug)]
    pub struct RunReport {
        /// Results, error log and final record store
        pub report: MappingReport,
        /// Files written to the output directory
        pub exported: ExportReport,
        /// Directory the files were written to
        pub output_dir: PathBuf,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Reads one seed per line, skipping blank lines and `#` comments.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn read_seed_file(path: &Path) -> Result<Vec<String>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open seed file {}", path.display()))?;
        let mut seeds = Vec::new();
        for line in BufReader::new(file).lines() {
            let line =
                line.with_context(|| format!("Failed to read seed file {}", path.display()))?;
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                seeds.push(trimmed.to_string());
            }
        }
        info!("Read {} seeds from {}", seeds.len(), path.display());
        Ok(seeds)
    }

    fn read_optional_seeds(path: Option<&PathBuf>) -> Result<Vec<String>> {
        match path {
            Some(path) => read_seed_file(path),
            None => Ok(Vec::new()),
        }
    }

    /// Runs a full mapping with the provided configuration.
    ///
    /// Loads the seeds, the range table and the optional prefix table and
    /// snapshot, runs the three phases against live DNS and HTTP, then
    /// exports everything into `config.output_dir`.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - A seed file, the range table or the prefix table cannot be read
    /// - The runtime or the HTTP client cannot be initialized
    /// - An integrity violation aborts the run
    /// - The output files cannot be written
    ///
    /// Per-entity failures are not errors: they end up in the error log.
    pub fn run_mapping(config: Config) -> Result<RunReport> {
        let start = Instant::now();

        let web_sites = read_optional_seeds(config.web_sites.as_ref())?;
        let mail_domains = read_optional_seeds(config.mail_domains.as_ref())?;
        if web_sites.is_empty() && mail_domains.is_empty() {
            info!("No web sites or mail domains to map");
        }

        let table = RangeTable::load_tsv_file(&config.as_table)?;
        let rov_source = match (&config.rov_prefixes, config.skip_rov) {
            (Some(path), false) => Some(TsvPrefixSource::load_file(path)?),
            (Some(_), true) => {
                info!("ROV cross-check disabled by --skip-rov");
                None
            }
            (None, _) => None,
        };

        let mut store = RecordStore::new();
        if let Some(path) = &config.snapshot {
            store
                .load_snapshot_file(path, config.snapshot_separator)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
        }

        let runtime = init_runtime().context("Failed to initialize runtime")?;
        let resolver = init_resolver(&runtime);
        let client = {
            let _guard = runtime.enter();
            init_client(&config).context("Failed to initialize HTTP client")?
        };
        let querier = HickoryQuerier::new(resolver, runtime.clone());
        let landing = HttpLandingResolver::new(client.clone(), runtime.clone());
        let scripts = HtmlScriptCollector::new(client, runtime);

        let collaborators = Collaborators {
            dns: &querier,
            landing: &landing,
            scripts: &scripts,
            rov: rov_source.as_ref().map(|s| s as &dyn RovPrefixSource),
        };
        let settings = OrchestratorSettings {
            resolver: ResolverSettings {
                max_hops: config.max_hops,
                include_tld: config.include_tld,
            },
            resolve_scripts: !config.skip_scripts,
        };

        let report = ResolutionOrchestrator::with_store(store, &table, collaborators, settings)
            .run(&web_sites, &mail_domains)
            .context("Mapping run aborted")?;

        let options = ExportOptions {
            output_dir: config.output_dir.clone(),
            snapshot_separator: config.snapshot_separator,
            ..Default::default()
        };
        let exported = export_all(&report, &options)?;

        let elapsed_seconds = start.elapsed().as_secs_f64();
        print_run_summary(&report, elapsed_seconds);

        Ok(RunReport {
            report,
            exported,
            output_dir: config.output_dir,
            elapsed_seconds,
        })
    }
}
