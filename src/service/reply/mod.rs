pub mod trace;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, instrument};

use crate::base::types::Void;

// Traits.

/// Generic hook invoked when a canned reply is available for a message.
///
/// This is where a transport that actually answers the sender plugs in.
#[async_trait]
pub trait GenericReplyHook: Send + Sync + 'static {
    /// Handle a canned reply addressed to `sender`.
    async fn on_auto_reply(&self, sender: &str, text: &str) -> Void;
}

// Structs.

/// Auto-reply hook for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ReplyHook {
    inner: Arc<dyn GenericReplyHook>,
}

impl ReplyHook {
    pub fn new(inner: Arc<dyn GenericReplyHook>) -> Self {
        Self { inner }
    }

    /// Hand the reply to the hook; failures are logged and dropped.
    #[instrument(skip_all)]
    pub async fn dispatch(&self, sender: &str, text: &str) {
        if let Err(err) = self.inner.on_auto_reply(sender, text).await {
            error!("Auto-reply hook failed: {}", err);
        }
    }
}
