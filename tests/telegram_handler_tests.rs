//! End-to-end tests of the Telegram handler against a local Bot API stand-in.

mod test_utils;

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use serde_json::json;
use telelog::{
    CapturedDiagnostics, DeliveryReport, Diagnostics, HandlerBuilderTrait, LogHandler, LogLevel,
    LogRecord, SharedFormatter, TelegramHandler, TelegramHandlerBuilder, TemplateFormatter,
};
use test_utils::fixtures::tcp_listener;
use test_utils::mock_bot_api::{closed_port, spawn_bot_api};

const OK_BODY: &str = r#"{"ok":true,"result":{"message_id":1}}"#;
const PARSE_ERROR_BODY: &str =
    r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#;

fn build_handler(addr: SocketAddr, diagnostics: &Arc<CapturedDiagnostics>) -> TelegramHandler {
    TelegramHandlerBuilder::new()
        .with_credentials("123:abc", "-100200300")
        .with_service_name("billing")
        .with_api_base(format!("http://{addr}"))
        .with_timeout_ms(2_000)
        .with_backoff_base_ms(0)
        .with_diagnostics(Arc::clone(diagnostics) as Arc<dyn Diagnostics>)
        .build_inner(SharedFormatter::new(TemplateFormatter::new(
            "<b>[%(levelname)s]</b> %(name)s\n%(message)s",
        )))
        .expect("handler should build")
}

fn error_record(message: &str) -> LogRecord {
    LogRecord::new("jobs.sync", LogLevel::Error, message)
}

#[rstest]
fn posts_html_message_as_json(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_bot_api(tcp_listener, vec![(200, OK_BODY)]);
    let diagnostics = Arc::new(CapturedDiagnostics::new());
    let handler = build_handler(addr, &diagnostics);

    let report = handler.emit(&error_record("sync failed"));
    assert_eq!(report, DeliveryReport::Delivered { attempts: 1 });

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/bot123:abc/sendMessage");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(
        captured.json(),
        json!({
            "chat_id": "-100200300",
            "text": "<b>[billing]</b>\n<b>[ERROR]</b> jobs.sync\nsync failed",
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        })
    );
    assert!(diagnostics.lines().is_empty());
}

#[rstest]
fn bad_request_is_resent_without_markup(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_bot_api(tcp_listener, vec![(400, PARSE_ERROR_BODY), (200, OK_BODY)]);
    let diagnostics = Arc::new(CapturedDiagnostics::new());
    let handler = build_handler(addr, &diagnostics);

    let report = handler.emit(&error_record("value <unclosed"));
    assert_eq!(report, DeliveryReport::Recovered);

    let first = rx.recv_timeout(Duration::from_secs(5)).expect("first request");
    let second = rx.recv_timeout(Duration::from_secs(5)).expect("fallback request");
    assert_eq!(first.json()["parse_mode"], "HTML");
    assert!(second.json().get("parse_mode").is_none());
    assert_eq!(first.json()["text"], second.json()["text"]);
    assert_eq!(
        diagnostics.lines(),
        vec!["Telegram send recovered after HTTP 400 by removing parse_mode.".to_string()]
    );
}

#[rstest]
fn failed_fallback_reports_both_causes(tcp_listener: TcpListener) {
    let (addr, _rx) = spawn_bot_api(
        tcp_listener,
        vec![
            (400, PARSE_ERROR_BODY),
            (400, r#"{"ok":false,"description":"chat not found"}"#),
        ],
    );
    let diagnostics = Arc::new(CapturedDiagnostics::new());
    let handler = build_handler(addr, &diagnostics);

    assert_eq!(handler.emit(&error_record("boom")), DeliveryReport::Abandoned);
    assert_eq!(
        diagnostics.lines(),
        vec![
            "Failed to send log to Telegram (HTTP 400). Description: Bad Request: can't parse entities"
                .to_string(),
            "Fallback without parse_mode also failed: HTTP 400: chat not found".to_string(),
        ]
    );
}

#[rstest]
#[case(401, r#"{"ok":false,"description":"Unauthorized"}"#)]
#[case(500, "upstream exploded")]
fn other_statuses_are_reported_once(
    tcp_listener: TcpListener,
    #[case] status: u16,
    #[case] body: &'static str,
) {
    let (addr, rx) = spawn_bot_api(tcp_listener, vec![(status, body)]);
    let diagnostics = Arc::new(CapturedDiagnostics::new());
    let handler = build_handler(addr, &diagnostics);

    assert_eq!(handler.emit(&error_record("boom")), DeliveryReport::Abandoned);
    rx.recv_timeout(Duration::from_secs(5)).expect("single request");
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

    let lines = diagnostics.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(&status.to_string()), "{lines:?}");
}

#[rstest]
fn unreachable_endpoint_is_retried_then_dropped() {
    let diagnostics = Arc::new(CapturedDiagnostics::new());
    let handler = build_handler(closed_port(), &diagnostics);

    assert_eq!(handler.emit(&error_record("boom")), DeliveryReport::Abandoned);
    let lines = diagnostics.lines();
    assert_eq!(lines.len(), 1);
    assert!(
        lines[0].starts_with("Failed to send log to Telegram after 3 attempts:"),
        "{lines:?}"
    );
}

#[rstest]
fn handle_never_surfaces_delivery_failures() {
    let diagnostics = Arc::new(CapturedDiagnostics::new());
    let handler = build_handler(closed_port(), &diagnostics);

    assert!(handler.handle(error_record("boom")).is_ok());
    assert!(handler.flush());
    handler.close();
    assert!(handler.handle(error_record("late")).is_err());
}
