//! Inbound event handling for dm-triage.
//!
//! This module provides functionality for handling webhook traffic:
//! - Decoding inbound direct-message events
//! - Running the triage pipeline and its side effects in order
//! - Serving the HTTP routes that front the pipeline

pub mod server;
pub mod webhook;
