//! Runtime services and shared state for dm-triage.

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::server,
    service::{log::RowAppender, notify::StaffNotifier, reply::ReplyHook},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the log appender, staff notifier, reply hook, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The message log appender.
    pub log: RowAppender,
    /// The staff notifier.
    pub notifier: StaffNotifier,
    /// The auto-reply hook.
    pub replies: ReplyHook,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the log appender.
        let log = RowAppender::sheets(&config)?;

        // Initialize the staff notifier.
        let notifier = match config.slack_alerts() {
            Some((token, channel)) => StaffNotifier::slack(token, channel)?,
            None => StaffNotifier::console(),
        };

        // Replies are prepared but not sent.
        let replies = ReplyHook::trace();

        Ok(Self { config, log, notifier, replies })
    }

    /// Serve the webhook routes until Ctrl-C.
    pub async fn start(&self) -> Void {
        let address = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&address).await?;

        info!("Server running on http://{}", listener.local_addr()?);

        axum::serve(listener, server::router(self.clone()))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutting down ...");
            })
            .await?;

        Ok(())
    }
}
