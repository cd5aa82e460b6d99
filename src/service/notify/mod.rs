pub mod console;
pub mod slack;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, instrument};

use crate::base::types::Void;

// Traits.

/// Generic staff notification trait that alert channels must implement.
///
/// Implementations deliver a freeform alert to whoever is on shift. Errors
/// are reported to the caller, which decides what to do with them.
#[async_trait]
pub trait GenericStaffNotifier: Send + Sync + 'static {
    /// Deliver an alert.
    async fn send_alert(&self, text: &str) -> Void;
}

// Structs.

/// Staff notifier for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct StaffNotifier {
    inner: Arc<dyn GenericStaffNotifier>,
}

impl StaffNotifier {
    pub fn new(inner: Arc<dyn GenericStaffNotifier>) -> Self {
        Self { inner }
    }

    /// Best-effort alert delivery.
    ///
    /// Failures are logged here and never returned.
    #[instrument(skip_all)]
    pub async fn notify(&self, text: &str) {
        if let Err(err) = self.inner.send_alert(text).await {
            error!("Failed to notify staff: {}", err);
        }
    }
}
