//! Main application helpers.
//!
//! This module provides the end-of-run statistics printed by the run entry point.

pub mod statistics;

// Re-export public API
pub use statistics::{print_error_statistics, print_run_summary};
