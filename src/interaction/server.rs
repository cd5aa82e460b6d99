//! HTTP routes for the webhook server.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::error;

use crate::runtime::Runtime;

use super::webhook;

/// Liveness response for `GET /`.
pub const LIVENESS: &str = "Webhook server is running!";

/// Response for a completed `GET /test`.
pub const TEST_COMPLETE: &str = "OK /test 完了";

/// Build the application router.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/webhook", post(receive_webhook))
        .route("/test", get(run_test))
        .with_state(runtime)
}

async fn liveness() -> &'static str {
    LIVENESS
}

async fn receive_webhook(State(runtime): State<Runtime>, body: Bytes) -> StatusCode {
    webhook::handle_webhook_body(&body, &runtime).await
}

async fn run_test(State(runtime): State<Runtime>) -> Response {
    match webhook::run_test_event(&runtime).await {
        Ok(_) => TEST_COMPLETE.into_response(),
        Err(err) => {
            error!("Test route failed: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
