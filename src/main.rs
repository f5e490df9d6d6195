//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `dns_rov_mapper` library that handles argument
//! parsing, `.env` loading, logger initialization and the exit code.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use dns_rov_mapper::initialization::init_logger_with;
use dns_rov_mapper::{run_mapping, Config};

fn main() -> Result<()> {
    // Lets RUST_LOG live in a .env file next to the seed lists
    let _ = dotenvy::dotenv();

    let config = Config::parse();
    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    match run_mapping(config) {
        Ok(run) => {
            println!(
                "✅ Mapped {} nameservers ({} errors logged) in {:.1}s",
                run.report.results.as_results.len(),
                run.report.errors.len(),
                run.elapsed_seconds
            );
            println!("Results saved in {}", run.output_dir.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("dns_rov_mapper error: {:#}", e);
            process::exit(1);
        }
    }
}
