//! Service integrations for external collaborators.
//!
//! This module contains implementations for the services used by dm-triage:
//! - Message log stores (e.g., Google Sheets)
//! - Staff alert channels (e.g., the operator log, Slack)
//! - Auto-reply hooks
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod log;
pub mod notify;
pub mod reply;
