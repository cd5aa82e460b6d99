//! Staff alerts posted to a Slack channel.

use std::sync::Arc;

use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{info, instrument};

use crate::base::types::{Res, Void};

use super::{GenericStaffNotifier, StaffNotifier};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `StaffNotifier` applied by the slack implementation.

impl StaffNotifier {
    /// Creates a notifier that posts alerts to a Slack channel.
    pub fn slack(bot_token: &str, channel_id: &str) -> Res<Self> {
        let client = SlackStaffNotifier::new(bot_token, channel_id)?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Structs.

/// Slack notifier implementation.
struct SlackStaffNotifier {
    bot_token: SlackApiToken,
    channel_id: SlackChannelId,
    client: Arc<FullClient>,
}

impl SlackStaffNotifier {
    /// Create a new Slack notifier.
    #[instrument(name = "SlackStaffNotifier::new", skip_all)]
    fn new(bot_token: &str, channel_id: &str) -> Res<Self> {
        let bot_token = SlackApiToken::new(SlackApiTokenValue(bot_token.to_string()));

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_http1().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        info!("Staff alerts will be posted to Slack channel {}.", channel_id);

        Ok(Self {
            bot_token,
            channel_id: SlackChannelId(channel_id.to_string()),
            client,
        })
    }
}

#[async_trait]
impl GenericStaffNotifier for SlackStaffNotifier {
    #[instrument(skip_all)]
    async fn send_alert(&self, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());
        let request = SlackApiChatPostMessageRequest::new(self.channel_id.clone(), message).with_link_names(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to post staff alert: {}", e))?;

        Ok(())
    }
}
