//! Configuration constants.
//!
//! Defaults for the CLI options plus the names of the files a run writes.

/// Hop ceiling of the path resolver, shared by every resolution in a run.
pub const DEFAULT_MAX_PATH_HOPS: usize = crate::resolution::MAX_PATH_HOPS;

/// Field separator of record store snapshots.
pub const DEFAULT_SNAPSHOT_SEPARATOR: char = ';';

/// Field delimiter of the error log CSV.
pub const ERROR_LOG_DELIMITER: u8 = b'\t';

/// Directory the result files land in.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Path of the IP-to-AS range table (iptoasn `ip2asn-v4.tsv` layout).
pub const DEFAULT_AS_TABLE_PATH: &str = "./ip2asn-v4.tsv";

// Network operation timeouts
/// DNS query timeout in seconds
/// Most answers arrive well under a second; a short timeout fails fast on dead servers
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// DNS attempts per query before it is logged as failed
pub const DNS_ATTEMPTS: usize = 2;
/// Per-request HTTP timeout in seconds, covering redirects
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Maximum number of redirect hops followed while landing a site
pub const MAX_REDIRECT_HOPS: usize = 10;

/// Default User-Agent string for landing and script requests.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Output file names
pub const ERROR_LOG_FILE: &str = "errors.csv";
pub const ZONES_FILE: &str = "zone_dependencies.csv";
pub const AS_RESULTS_FILE: &str = "as_resolution.csv";
pub const ROV_FILE: &str = "rov.csv";
pub const MAIL_FILE: &str = "mail_servers.csv";
pub const SCRIPTS_FILE: &str = "scripts.csv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const SNAPSHOT_FILE: &str = "records.snapshot";
