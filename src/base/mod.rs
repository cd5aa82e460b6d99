//! Core components, types, and utilities for dm-triage.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Canned replies and staff alert templates.
//! - Common types and result handling.

pub mod config;
pub mod replies;
pub mod types;
