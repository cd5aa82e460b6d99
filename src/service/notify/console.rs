//! Staff alerts written to the operator log.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::base::types::Void;

use super::{GenericStaffNotifier, StaffNotifier};

impl StaffNotifier {
    /// Creates a notifier that writes alerts to the log stream.
    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleStaffNotifier))
    }
}

/// Writes alerts to the log at `WARN` so they stand out.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleStaffNotifier;

#[async_trait]
impl GenericStaffNotifier for ConsoleStaffNotifier {
    async fn send_alert(&self, text: &str) -> Void {
        warn!("=== NOTIFY STAFF ===\n{}\n====================", text);
        Ok(())
    }
}
