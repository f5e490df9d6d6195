//! Logger initialization.

use std::io::{self, Write};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

fn level_marker(level: Level) -> (&'static str, ColoredString) {
    let name = level.to_string();
    match level {
        Level::Error => ("❌", name.red()),
        Level::Warn => ("⚠️", name.yellow()),
        Level::Info => ("✔️", name.green()),
        Level::Debug => ("🔍", name.blue()),
        Level::Trace => ("🔬", name.purple()),
    }
}

fn write_plain(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    let (emoji, level) = level_marker(record.level());
    writeln!(buf, "{emoji} {} [{level}] {}", record.target().cyan(), record.args())
}

fn write_json(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    let message = serde_json::to_string(&record.args().to_string())
        .unwrap_or_else(|_| "\"\"".into());
    writeln!(
        buf,
        "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{message}}}",
        chrono::Utc::now().timestamp_millis(),
        record.level(),
        record.target(),
    )
}

/// Initializes the logger with the specified level and format.
///
/// Plain output is colored and prefixed with an emoji per level; JSON output
/// is one object per line with a millisecond timestamp. `RUST_LOG` is read
/// first and `level` overrides it for this crate.
///
/// ```bash
/// RUST_LOG=dns_rov_mapper=debug,hickory_proto=warn dns_rov_mapper --web-sites sites.txt
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    // Truncated and malformed UDP answers are retried by hickory itself
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("hickory_resolver", LevelFilter::Warn);
    builder.filter_module("dns_rov_mapper", level);

    match format {
        LogFormat::Json => builder.format(write_json),
        LogFormat::Plain => builder.format(write_plain),
    };

    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
