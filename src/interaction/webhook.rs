//! The webhook dispatcher.
//!
//! Each inbound event runs through the same fixed sequence:
//! classify, alert staff (VIP only), append to the log, pick a canned reply.
//! Staff alerts, log appends, and reply hooks are isolated: their failures are
//! logged and never change the response. Only a fault in the orchestration
//! itself (e.g. an undecodable body) yields a 500.

use axum::http::StatusCode;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        replies,
        types::{ClassificationRecord, InboundEvent, Res},
    },
    runtime::Runtime,
    service::log::LogRow,
    triage::{classifier, record, reply},
};

/// Message used by the diagnostic route.
pub const TEST_MESSAGE: &str = "VIP席空いてますか？";

/// Sender used by the diagnostic route.
pub const TEST_SENDER: &str = "TEST_USER";

/// What happened to a dispatched event.
#[derive(Debug, Clone)]
pub struct Dispatched {
    /// The classification the event received.
    pub record: ClassificationRecord,
    /// Whether a staff alert was attempted.
    pub notified: bool,
    /// The appended row, or `None` if the append failed.
    pub row: Option<LogRow>,
    /// The canned reply, if one applies.
    pub reply: Option<String>,
}

/// Handle a raw webhook body and produce the response status.
#[instrument(skip_all)]
pub async fn handle_webhook_body(body: &[u8], runtime: &Runtime) -> StatusCode {
    let result = async {
        let event = decode_event(body)?;
        dispatch(event, runtime).await
    }
    .await;

    match result {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            error!("Webhook fatal error: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Run the fixed diagnostic VIP message through the pipeline.
#[instrument(skip_all)]
pub async fn run_test_event(runtime: &Runtime) -> Res<Dispatched> {
    dispatch(InboundEvent::new(TEST_SENDER, TEST_MESSAGE), runtime).await
}

/// Decode an event from a webhook body.
///
/// An empty body is an empty event; a body that is not JSON is an error.
pub fn decode_event(body: &[u8]) -> Res<InboundEvent> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InboundEvent::default());
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| anyhow::anyhow!("Malformed webhook body: {}", e))?;

    Ok(InboundEvent::from_json(&value))
}

/// Run one event through the pipeline.
#[instrument(skip_all, fields(sender = %event.sender))]
pub async fn dispatch(event: InboundEvent, runtime: &Runtime) -> Res<Dispatched> {
    info!("Received message: {:?}", event.message);

    // Classify.

    let raw = classifier::classify(&event.message);
    let record = record::parse_record(&raw);

    info!("Classified as {:?} (alert: {:?}, auto_reply: {:?}).", record.category, record.alert, record.auto_reply);

    // Alert staff before anything is written, so a slow or failing log store cannot delay it.

    let notified = record.is_vip();
    if notified {
        runtime.notifier.notify(&replies::vip_alert(&event.message)).await;
    }

    // Append to the log.

    let row = match runtime.log.append(&record, &event.message, &event.sender).await {
        Ok(row) => Some(row),
        Err(err) => {
            warn!("Failed to append to the message log (continuing): {}", err);
            None
        }
    };

    // Canned reply.

    let reply = reply::generate_reply(&record, &runtime.config.store_info_reply).map(str::to_string);
    info!("Auto-reply: {}", if reply.is_some() { "available" } else { "none" });

    if let Some(text) = &reply {
        runtime.replies.dispatch(&event.sender, text).await;
    }

    Ok(Dispatched { record, notified, row, reply })
}
