//! Library root for `dm-triage`.
//!
//! dm-triage is a webhook service for a venue's social-media direct messages, designed to:
//! - Classify each inbound message into a handling category
//! - Alert staff immediately about VIP and reservation requests
//! - Log every message to a shared spreadsheet
//! - Prepare canned replies for routine enquiries
//!
//! The external collaborators (the log store, the staff alert channel, and the
//! reply transport) sit behind traits, so each can be swapped or mocked.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;
pub mod triage;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the dm-triage runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the log, notifier, and reply services
/// - Serves the webhook routes
pub async fn start(config: Config) -> Void {
    info!("Starting dm-triage ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
