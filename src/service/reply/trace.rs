//! Auto-reply hook that only records the reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::base::types::Void;

use super::{GenericReplyHook, ReplyHook};

impl ReplyHook {
    /// Creates a hook that logs replies without sending them.
    pub fn trace() -> Self {
        Self::new(Arc::new(TraceReplyHook))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TraceReplyHook;

#[async_trait]
impl GenericReplyHook for TraceReplyHook {
    async fn on_auto_reply(&self, sender: &str, text: &str) -> Void {
        info!("Auto-reply prepared for `{}` (not sent).", sender);
        debug!("Auto-reply text:\n{}", text);
        Ok(())
    }
}
