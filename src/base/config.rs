//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use chrono::FixedOffset;
use serde::Deserialize;

use crate::base::replies;

use super::types::Res;

/// Default address to bind the webhook server to.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default port for the webhook server.
fn default_port() -> u16 {
    3000
}

/// Default OAuth token endpoint for the service-account handshake.
fn default_google_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Default Sheets API base URL.
fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

/// Default range rows are appended to.
fn default_sheet_range() -> String {
    "Main Log!A:L".to_string()
}

/// Default value for the log's source column.
fn default_source_label() -> String {
    "Instagram".to_string()
}

/// Default value for the log's language column.
fn default_language() -> String {
    "JA".to_string()
}

/// Default display timezone (JST).
fn default_utc_offset_hours() -> i32 {
    9
}

/// Default timeout for requests to the log store, in seconds.
fn default_store_timeout_secs() -> u64 {
    10
}

/// Default store-information reply.
fn default_store_info_reply() -> String {
    replies::STORE_INFO_REPLY.to_string()
}

/// Configuration for the dm-triage application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Address to bind to (`DM_TRIAGE_HOST`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on (`DM_TRIAGE_PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Target spreadsheet ID (`DM_TRIAGE_SPREADSHEET_ID`).
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Service account email (`DM_TRIAGE_GOOGLE_SERVICE_ACCOUNT_EMAIL`).
    #[serde(default)]
    pub google_service_account_email: String,
    /// Service account PEM private key (`DM_TRIAGE_GOOGLE_PRIVATE_KEY`).
    /// Literal `\n` sequences are turned into newlines before use.
    #[serde(default)]
    pub google_private_key: String,
    /// OAuth token endpoint (`DM_TRIAGE_GOOGLE_TOKEN_URI`).
    #[serde(default = "default_google_token_uri")]
    pub google_token_uri: String,
    /// Sheets API base URL (`DM_TRIAGE_SHEETS_API_BASE`).
    #[serde(default = "default_sheets_api_base")]
    pub sheets_api_base: String,
    /// Range that rows are appended to (`DM_TRIAGE_SHEET_RANGE`).
    #[serde(default = "default_sheet_range")]
    pub sheet_range: String,
    /// Source column value (`DM_TRIAGE_SOURCE_LABEL`).
    #[serde(default = "default_source_label")]
    pub source_label: String,
    /// Language column value when the classification does not name one (`DM_TRIAGE_DEFAULT_LANGUAGE`).
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Offset from UTC, in hours, used to format log timestamps (`DM_TRIAGE_UTC_OFFSET_HOURS`).
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// Timeout, in seconds, for each request to the log store, including the token handshake (`DM_TRIAGE_STORE_TIMEOUT_SECS`).
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
    /// Reply text for store-information enquiries (`DM_TRIAGE_STORE_INFO_REPLY`).
    #[serde(default = "default_store_info_reply")]
    pub store_info_reply: String,
    /// Slack bot token used for staff alerts (`DM_TRIAGE_SLACK_BOT_TOKEN`).
    #[serde(default)]
    pub slack_bot_token: Option<String>,
    /// Slack channel that receives staff alerts (`DM_TRIAGE_SLACK_ALERT_CHANNEL`).
    #[serde(default)]
    pub slack_alert_channel: Option<String>,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            spreadsheet_id: String::new(),
            google_service_account_email: String::new(),
            google_private_key: String::new(),
            google_token_uri: default_google_token_uri(),
            sheets_api_base: default_sheets_api_base(),
            sheet_range: default_sheet_range(),
            source_label: default_source_label(),
            default_language: default_language(),
            utc_offset_hours: default_utc_offset_hours(),
            store_timeout_secs: default_store_timeout_secs(),
            store_info_reply: default_store_info_reply(),
            slack_bot_token: None,
            slack_alert_channel: None,
        }
    }
}

impl ConfigInner {
    /// The display timezone for log timestamps.
    pub fn display_offset(&self) -> Res<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| anyhow::anyhow!("Invalid UTC offset: {} hours.", self.utc_offset_hours))
    }

    /// Whether Slack alerting is fully configured.
    pub fn slack_alerts(&self) -> Option<(&str, &str)> {
        match (self.slack_bot_token.as_deref(), self.slack_alert_channel.as_deref()) {
            (Some(token), Some(channel)) if !token.is_empty() && !channel.is_empty() => Some((token, channel)),
            _ => None,
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("DM_TRIAGE"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    pub fn validate(&self) -> Res<()> {
        if self.port == 0 {
            return Err(anyhow::anyhow!("Port must be non-zero."));
        }

        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(anyhow::anyhow!("UTC offset must be between -12 and 14 hours."));
        }

        if self.store_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Store timeout must be at least one second."));
        }

        if self.sheet_range.trim().is_empty() {
            return Err(anyhow::anyhow!("Sheet range must not be empty."));
        }

        let token_set = self.slack_bot_token.as_deref().is_some_and(|t| !t.is_empty());
        let channel_set = self.slack_alert_channel.as_deref().is_some_and(|c| !c.is_empty());

        if token_set != channel_set {
            return Err(anyhow::anyhow!("Slack bot token and alert channel must be set together."));
        }

        Ok(())
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}
