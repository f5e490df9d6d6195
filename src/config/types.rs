//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_AS_TABLE_PATH, DEFAULT_MAX_PATH_HOPS, DEFAULT_OUTPUT_DIR, DEFAULT_SNAPSHOT_SEPARATOR,
    DEFAULT_USER_AGENT, HTTP_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Run configuration, parsed from the command line or built programmatically.
///
/// # Examples
///
/// ```no_run
/// use dns_rov_mapper::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     web_sites: Some(PathBuf::from("sites.txt")),
///     skip_scripts: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dns_rov_mapper",
    about = "Maps the DNS zone dependencies of web sites and mail domains onto autonomous systems and checks their route origin validation state."
)]
pub struct Config {
    /// File with one web site per line
    #[arg(long, value_parser)]
    pub web_sites: Option<PathBuf>,

    /// File with one mail domain per line
    #[arg(long, value_parser)]
    pub mail_domains: Option<PathBuf>,

    /// IP-to-AS range table (iptoasn ip2asn-v4.tsv layout)
    #[arg(long, value_parser, default_value = DEFAULT_AS_TABLE_PATH)]
    pub as_table: PathBuf,

    /// Per-AS prefix table: as_number, prefix, rov_state, country_code, visibility, roas
    #[arg(long, value_parser)]
    pub rov_prefixes: Option<PathBuf>,

    /// Record snapshot preloaded into the store before the run
    #[arg(long, value_parser)]
    pub snapshot: Option<PathBuf>,

    /// Directory the result files are written to
    #[arg(long, value_parser, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Field separator of snapshot files
    #[arg(long, default_value_t = DEFAULT_SNAPSHOT_SEPARATOR)]
    pub snapshot_separator: char,

    /// Maximum number of alias hops followed per resolution
    #[arg(long, default_value_t = DEFAULT_MAX_PATH_HOPS)]
    pub max_hops: usize,

    /// Also consider top-level domains and the root as zones
    #[arg(long)]
    pub include_tld: bool,

    /// Skip script discovery and the landing of script hosting sites
    #[arg(long)]
    pub skip_scripts: bool,

    /// Skip the ROV cross-check even when a prefix table is given
    #[arg(long)]
    pub skip_rov: bool,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_sites: None,
            mail_domains: None,
            as_table: PathBuf::from(DEFAULT_AS_TABLE_PATH),
            rov_prefixes: None,
            snapshot: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            snapshot_separator: DEFAULT_SNAPSHOT_SEPARATOR,
            max_hops: DEFAULT_MAX_PATH_HOPS,
            include_tld: false,
            skip_scripts: false,
            skip_rov: false,
            timeout_seconds: HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
