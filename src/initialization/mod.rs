//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - Tokio runtime driving the network collaborators
//! - DNS resolver
//! - HTTP client
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod resolver;

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::error_handling::InitializationError;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Initializes the runtime the blocking collaborators drive their clients on.
///
/// The resolution core is synchronous; DNS and HTTP collaborators call
/// `block_on` on this runtime, so a current-thread runtime is enough.
///
/// # Errors
///
/// Returns `InitializationError::RuntimeError` if the runtime cannot start.
pub fn init_runtime() -> Result<Arc<Runtime>, InitializationError> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(Arc::new(runtime))
}
