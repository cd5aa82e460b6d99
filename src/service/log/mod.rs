pub mod sheets;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use crate::base::{
    config::Config,
    types::{ClassificationRecord, Res, Status},
};

/// Format used for the timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

// Errors.

/// Failure to append a row to the external log store.
#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error("Log store is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("Invalid service credential: {0}")]
    Credential(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Log store error {status}: {message}")]
    Api { status: u16, message: String },
}

// Traits.

/// Generic row appender trait that log stores must implement.
///
/// Implementations append one row to the end of the log and nothing else: no
/// reads, no row addressing. They must be safe to share across concurrent
/// requests.
#[async_trait]
pub trait GenericRowAppender: Send + Sync + 'static {
    /// Append a single row to the log.
    async fn append_row(&self, row: &LogRow) -> Result<(), AppendError>;
}

// Structs.

/// One row of the message log.
///
/// The column order is the sheet's schema:
/// `(blank), source, sender, message, timestamp, language, category, auto_reply, status, alert, notes, reply_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub source: String,
    pub sender: String,
    pub message: String,
    pub timestamp: String,
    pub language: String,
    pub category: String,
    pub auto_reply: String,
    pub status: Status,
    pub alert: String,
    pub notes: String,
    pub reply_type: String,
}

impl LogRow {
    /// Number of cells in a row.
    pub const WIDTH: usize = 12;

    /// Build a row for a classified message.
    ///
    /// Absent classification fields become empty cells.
    pub fn build(record: &ClassificationRecord, message: &str, sender: &str, timestamp: DateTime<FixedOffset>, settings: &RowSettings) -> Self {
        let category = record.category.map(|c| c.label().to_string()).unwrap_or_default();
        let auto_reply = record.auto_reply.map(|f| f.label().to_string()).unwrap_or_default();
        let alert = record.alert.map(|f| f.label().to_string()).unwrap_or_default();

        let (status, reply_type) = if record.is_auto_reply() {
            (Status::AutoReplied, category.clone())
        } else {
            (Status::NeedsAttention, String::new())
        };

        Self {
            source: settings.source.clone(),
            sender: sender.to_string(),
            message: message.to_string(),
            timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
            language: record.language.clone().unwrap_or_else(|| settings.language.clone()),
            category,
            auto_reply,
            status,
            alert,
            notes: String::new(),
            reply_type,
        }
    }

    /// The row as sheet cells, in column order.
    pub fn cells(&self) -> [String; Self::WIDTH] {
        [
            String::new(),
            self.source.clone(),
            self.sender.clone(),
            self.message.clone(),
            self.timestamp.clone(),
            self.language.clone(),
            self.category.clone(),
            self.auto_reply.clone(),
            self.status.label().to_string(),
            self.alert.clone(),
            self.notes.clone(),
            self.reply_type.clone(),
        ]
    }
}

/// Fixed values stamped onto every row.
#[derive(Debug, Clone)]
pub struct RowSettings {
    pub source: String,
    pub language: String,
    pub offset: FixedOffset,
}

impl RowSettings {
    pub fn from_config(config: &Config) -> Res<Self> {
        Ok(Self {
            source: config.source_label.clone(),
            language: config.default_language.clone(),
            offset: config.display_offset()?,
        })
    }
}

/// Row appender for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct RowAppender {
    inner: Arc<dyn GenericRowAppender>,
    settings: Arc<RowSettings>,
}

impl RowAppender {
    pub fn new(inner: Arc<dyn GenericRowAppender>, settings: RowSettings) -> Self {
        Self {
            inner,
            settings: Arc::new(settings),
        }
    }

    /// Build the row for a classified message and append it.
    ///
    /// The timestamp is taken now, in the configured display timezone.
    pub async fn append(&self, record: &ClassificationRecord, message: &str, sender: &str) -> Result<LogRow, AppendError> {
        let timestamp = Utc::now().with_timezone(&self.settings.offset);
        let row = LogRow::build(record, message, sender, timestamp, &self.settings);

        self.inner.append_row(&row).await?;

        Ok(row)
    }
}
