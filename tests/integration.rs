#![cfg(test)]

use std::sync::{Arc, Mutex};
use tracing_subscriber::util::SubscriberInitExt;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use dm_triage::{
    base::{
        config::{Config, ConfigInner},
        replies::STORE_INFO_REPLY,
        types::{Category, Status, Void},
    },
    interaction::{server, webhook},
    runtime::Runtime,
    service::{
        log::{AppendError, GenericRowAppender, LogRow, RowAppender, RowSettings},
        notify::{GenericStaffNotifier, StaffNotifier},
        reply::{GenericReplyHook, ReplyHook},
    },
};
use mockall::{Sequence, mock};
use tower::ServiceExt;

// Mocks.

mock! {
    pub Appender {}

    #[async_trait]
    impl GenericRowAppender for Appender {
        async fn append_row(&self, row: &LogRow) -> Result<(), AppendError>;
    }
}

mock! {
    pub Notifier {}

    #[async_trait]
    impl GenericStaffNotifier for Notifier {
        async fn send_alert(&self, text: &str) -> Void;
    }
}

mock! {
    pub Replies {}

    #[async_trait]
    impl GenericReplyHook for Replies {
        async fn on_auto_reply(&self, sender: &str, text: &str) -> Void;
    }
}

type Rows = Arc<Mutex<Vec<LogRow>>>;

/// An appender that records every row it is given.
fn recording_appender(rows: &Rows) -> MockAppender {
    let rows = rows.clone();
    let mut mock = MockAppender::new();

    mock.expect_append_row().returning(move |row| {
        rows.lock().unwrap().push(row.clone());
        Ok(())
    });

    mock
}

/// An appender whose store is always down.
fn failing_appender() -> MockAppender {
    let mut mock = MockAppender::new();

    mock.expect_append_row().times(1).returning(|_| {
        Err(AppendError::Api {
            status: 503,
            message: "backend unavailable".to_string(),
        })
    });

    mock
}

/// A log sink the test can read back.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn quiet_notifier() -> MockNotifier {
    let mut mock = MockNotifier::new();
    mock.expect_send_alert().never();
    mock
}

fn quiet_replies() -> MockReplies {
    let mut mock = MockReplies::new();
    mock.expect_on_auto_reply().never();
    mock
}

/// Helper function to setup the test runtime.
fn setup_runtime(appender: MockAppender, notifier: MockNotifier, replies: MockReplies) -> Runtime {
    let config = Config::from(ConfigInner::default());
    let settings = RowSettings::from_config(&config).expect("Failed to build row settings");

    Runtime {
        log: RowAppender::new(Arc::new(appender), settings),
        notifier: StaffNotifier::new(Arc::new(notifier)),
        replies: ReplyHook::new(Arc::new(replies)),
        config,
    }
}

async fn post_webhook(runtime: &Runtime, body: &str) -> StatusCode {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    server::router(runtime.clone()).oneshot(request).await.unwrap().status()
}

async fn get(runtime: &Runtime, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = server::router(runtime.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, String::from_utf8(body.to_vec()).unwrap())
}

// Tests.

#[tokio::test]
async fn test_vip_message_alerts_then_logs() {
    let mut seq = Sequence::new();
    let rows = Rows::default();

    let mut notifier = MockNotifier::new();
    notifier
        .expect_send_alert()
        .withf(|text| text.contains("VIP席空いてますか？") && text.contains("スタッフ対応必要"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let mut appender = MockAppender::new();
    let captured = rows.clone();
    appender.expect_append_row().times(1).in_sequence(&mut seq).returning(move |row| {
        captured.lock().unwrap().push(row.clone());
        Ok(())
    });

    let runtime = setup_runtime(appender, notifier, quiet_replies());

    let status = post_webhook(&runtime, r#"{"message":"VIP席空いてますか？","sender":"u1"}"#).await;

    assert_eq!(status, StatusCode::OK);

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.sender, "u1");
    assert_eq!(row.message, "VIP席空いてますか？");
    assert_eq!(row.category, "VIP");
    assert_eq!(row.alert, "YES");
    assert_eq!(row.auto_reply, "NO");
    assert_eq!(row.status, Status::NeedsAttention);
    assert_eq!(row.reply_type, "");
    assert_eq!(row.source, "Instagram");
    assert_eq!(row.cells().len(), LogRow::WIDTH);
}

#[tokio::test]
async fn test_log_outage_still_acknowledges() {
    let mut replies = MockReplies::new();
    replies
        .expect_on_auto_reply()
        .withf(|sender, text| sender.to_string() == "u5" && text.to_string() == STORE_INFO_REPLY)
        .times(1)
        .returning(|_, _| Ok(()));

    let runtime = setup_runtime(failing_appender(), quiet_notifier(), replies);

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let _guard = tracing_subscriber::fmt().with_ansi(false).with_writer(move || writer.clone()).set_default();

    let status = post_webhook(&runtime, r#"{"message":"営業時間を教えてください","sender":"u5"}"#).await;

    assert_eq!(status, StatusCode::OK);

    let logs = logs.contents();
    assert!(logs.contains("WARN"));
    assert!(logs.contains("Failed to append to the message log (continuing)"));
    assert!(logs.contains("503"));
}

#[tokio::test]
async fn test_stalled_sheets_backend_still_acknowledges() {
    // A token endpoint that accepts connections and never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = Config::from(ConfigInner {
        spreadsheet_id: "sheet-123".to_string(),
        google_service_account_email: "bot@example.iam.gserviceaccount.com".to_string(),
        google_private_key: include_str!("fixtures/service_account_key.pem").to_string(),
        google_token_uri: format!("http://{addr}/token"),
        store_timeout_secs: 1,
        ..Default::default()
    });

    let runtime = Runtime {
        log: RowAppender::sheets(&config).unwrap(),
        notifier: StaffNotifier::new(Arc::new(quiet_notifier())),
        replies: ReplyHook::new(Arc::new(quiet_replies())),
        config,
    };

    let requests: Vec<_> = (0..3)
        .map(|i| {
            let runtime = runtime.clone();
            tokio::spawn(async move { post_webhook(&runtime, &format!(r#"{{"message":"hello {i}","sender":"u{i}"}}"#)).await })
        })
        .collect();

    let statuses = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let mut statuses = Vec::new();
        for request in requests {
            statuses.push(request.await.unwrap());
        }
        statuses
    })
    .await
    .expect("webhook requests stayed blocked on the log store");

    assert!(statuses.iter().all(|s| *s == StatusCode::OK));
}

#[tokio::test]
async fn test_notifier_failure_does_not_block_log() {
    let rows = Rows::default();

    let mut notifier = MockNotifier::new();
    notifier.expect_send_alert().times(1).returning(|_| Err(anyhow::anyhow!("chat is down")));

    let runtime = setup_runtime(recording_appender(&rows), notifier, quiet_replies());

    let status = post_webhook(&runtime, r#"{"message":"シャンパン入れたいです","sender":"u6"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_message_is_other() {
    let rows = Rows::default();
    let runtime = setup_runtime(recording_appender(&rows), quiet_notifier(), quiet_replies());

    let status = post_webhook(&runtime, r#"{"sender":"u2"}"#).await;

    assert_eq!(status, StatusCode::OK);

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].message, "");
    assert_eq!(rows[0].sender, "u2");
    assert_eq!(rows[0].category, Category::Other.label());
    assert_eq!(rows[0].status, Status::AutoReplied);
    assert_eq!(rows[0].reply_type, "その他");
}

#[tokio::test]
async fn test_empty_body_uses_defaults() {
    let rows = Rows::default();
    let runtime = setup_runtime(recording_appender(&rows), quiet_notifier(), quiet_replies());

    let status = post_webhook(&runtime, "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.lock().unwrap()[0].sender, "Unknown");
}

#[tokio::test]
async fn test_malformed_body_is_server_error() {
    let mut appender = MockAppender::new();
    appender.expect_append_row().never();

    let runtime = setup_runtime(appender, quiet_notifier(), quiet_replies());

    let status = post_webhook(&runtime, r#"{"message": "#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_liveness() {
    let runtime = setup_runtime(MockAppender::new(), quiet_notifier(), quiet_replies());

    let (status, body) = get(&runtime, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, server::LIVENESS);
}

#[tokio::test]
async fn test_diagnostic_route_runs_vip_pipeline() {
    let rows = Rows::default();

    let mut notifier = MockNotifier::new();
    notifier.expect_send_alert().times(1).returning(|_| Ok(()));

    let runtime = setup_runtime(recording_appender(&rows), notifier, quiet_replies());

    let (status, body) = get(&runtime, "/test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, server::TEST_COMPLETE);

    let rows = rows.lock().unwrap();
    assert_eq!(rows[0].sender, webhook::TEST_SENDER);
    assert_eq!(rows[0].category, "VIP");
}

#[tokio::test]
async fn test_diagnostic_route_survives_log_outage() {
    let mut notifier = MockNotifier::new();
    notifier.expect_send_alert().times(1).returning(|_| Ok(()));

    let runtime = setup_runtime(failing_appender(), notifier, quiet_replies());

    let (status, _) = get(&runtime, "/test").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_dispatch_reports_outcome() {
    let mut replies = MockReplies::new();
    replies.expect_on_auto_reply().times(1).returning(|_, _| Ok(()));

    let runtime = setup_runtime(failing_appender(), quiet_notifier(), replies);

    let dispatched = webhook::dispatch(dm_triage::base::types::InboundEvent::new("u7", "お店の場所はどこですか"), &runtime).await.unwrap();

    assert_eq!(dispatched.record.category, Some(Category::StoreInfo));
    assert!(!dispatched.notified);
    assert!(dispatched.row.is_none());
    assert_eq!(dispatched.reply.as_deref(), Some(STORE_INFO_REPLY));
}

#[tokio::test]
async fn test_concurrent_requests_each_log_once() {
    let rows = Rows::default();
    let runtime = setup_runtime(recording_appender(&rows), quiet_notifier(), quiet_replies());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let runtime = runtime.clone();
            tokio::spawn(async move { post_webhook(&runtime, &format!(r#"{{"message":"hello {i}","sender":"u{i}"}}"#)).await })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let mut senders: Vec<_> = rows.lock().unwrap().iter().map(|r| r.sender.clone()).collect();
    senders.sort();

    assert_eq!(senders, (0..8).map(|i| format!("u{i}")).collect::<Vec<_>>());
}
