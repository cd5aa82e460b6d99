//! The pure stages of the triage pipeline.
//!
//! - `classifier` maps message text to a `key: value` classification block.
//! - `record` parses such a block back into fields.
//! - `reply` picks the canned reply (if any) for a classification.

pub mod classifier;
pub mod record;
pub mod reply;
