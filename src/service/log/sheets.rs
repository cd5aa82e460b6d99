//! Google Sheets implementation of the row appender.
//!
//! Rows are written with the Sheets `values:append` endpoint. Authentication
//! is the service-account JWT bearer handshake; the resulting access token is
//! cached and shared by all requests until shortly before it expires.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::base::{config::Config, types::Res};

use super::{AppendError, GenericRowAppender, LogRow, RowAppender, RowSettings};

/// OAuth scope granting write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Lifetime requested for the signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Cached tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

// Extra methods on `RowAppender` applied by the sheets implementation.

impl RowAppender {
    /// Creates a row appender backed by Google Sheets.
    pub fn sheets(config: &Config) -> Res<Self> {
        let client = SheetsRowAppender::new(config)?;
        Ok(Self::new(Arc::new(client), RowSettings::from_config(config)?))
    }
}

// Structs.

/// Claims of the service-account assertion.
#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now
    }
}

/// Google Sheets row appender.
pub struct SheetsRowAppender {
    http: reqwest::Client,
    api_base: Url,
    token_uri: String,
    spreadsheet_id: String,
    range: String,
    client_email: String,
    private_key: String,
    token: Mutex<Option<AccessToken>>,
}

impl SheetsRowAppender {
    /// Create a new Sheets appender. No network traffic happens until the first append.
    #[instrument(name = "SheetsRowAppender::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let api_base = Url::parse(&config.sheets_api_base)?;

        if config.spreadsheet_id.is_empty() {
            info!("No spreadsheet configured; log appends will fail until one is set.");
        }

        let http = reqwest::Client::builder().timeout(std::time::Duration::from_secs(config.store_timeout_secs)).build()?;

        Ok(Self {
            http,
            api_base,
            token_uri: config.google_token_uri.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.sheet_range.clone(),
            client_email: config.google_service_account_email.clone(),
            private_key: normalize_private_key(&config.google_private_key),
            token: Mutex::new(None),
        })
    }

    /// The `values:append` URL for the configured spreadsheet and range.
    fn append_url(&self) -> Result<Url, AppendError> {
        let mut url = self.api_base.clone();
        let range = format!("{}:append", self.range);

        url.path_segments_mut()
            .map_err(|_| AppendError::NotConfigured("sheets_api_base"))?
            .pop_if_empty()
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", range.as_str()]);

        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        Ok(url)
    }

    /// Sign the service-account assertion.
    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, AppendError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| AppendError::Credential(e.to_string()))?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| AppendError::Credential(e.to_string()))
    }

    /// Return a usable access token, performing the handshake if the cached one is missing or stale.
    ///
    /// The cache lock is only held to read or store the token, never across the
    /// handshake, so a stalled token endpoint cannot queue other appends behind it.
    #[instrument(name = "SheetsRowAppender::access_token", skip_all)]
    async fn access_token(&self) -> Result<String, AppendError> {
        let now = Utc::now();

        if let Some(token) = self.token.lock().await.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = self.request_token(now).await?;
        let value = token.value.clone();

        *self.token.lock().await = Some(token);

        Ok(value)
    }

    /// Perform the service-account handshake.
    async fn request_token(&self, now: DateTime<Utc>) -> Result<AccessToken, AppendError> {
        if self.client_email.is_empty() || self.private_key.trim().is_empty() {
            return Err(AppendError::NotConfigured("google service account"));
        }

        debug!("Requesting a new access token ...");

        let assertion = self.sign_assertion(now)?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppendError::Auth(format!("{status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;

        Ok(AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl GenericRowAppender for SheetsRowAppender {
    #[instrument(skip_all)]
    async fn append_row(&self, row: &LogRow) -> Result<(), AppendError> {
        if self.spreadsheet_id.is_empty() {
            return Err(AppendError::NotConfigured("spreadsheet_id"));
        }

        let url = self.append_url()?;
        let token = self.access_token().await?;

        let response = self.http.post(url).bearer_auth(token).json(&json!({ "values": [row.cells()] })).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppendError::Api { status: status.as_u16(), message });
        }

        debug!("Appended row for sender `{}`.", row.sender);

        Ok(())
    }
}

// Helpers.

/// Keys copied out of JSON credentials often carry literal `\n` sequences.
fn normalize_private_key(key: &str) -> String {
    key.replace("\\n", "\n")
}

// Tests.
