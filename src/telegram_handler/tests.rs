//! Delivery-policy tests driven by a scripted client.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rstest::{fixture, rstest};
use serde_json::Value;

use crate::diagnostics::CapturedDiagnostics;
use crate::formatter::{LogFormatter, TemplateFormatter};
use crate::handler::{HandlerError, LogHandler};
use crate::level::LogLevel;
use crate::log_record::LogRecord;

use super::{
    ChatClient, ClientError, ClientFactory, DeliveryReport, SendMessagePayload, SendOutcome,
    Sleeper, TelegramHandler, TelegramHandlerConfig,
};

#[derive(Default)]
struct Script {
    outcomes: Mutex<VecDeque<SendOutcome>>,
    sent: Mutex<Vec<Value>>,
    created: AtomicUsize,
}

impl Script {
    fn sent(&self) -> Vec<Value> {
        self.sent.lock().clone()
    }

    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

struct ScriptedFactory(Arc<Script>);

struct ScriptedClient(Arc<Script>);

impl ClientFactory for ScriptedFactory {
    fn create(&self, _timeout: Duration) -> Result<Arc<dyn ChatClient>, ClientError> {
        self.0.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedClient(Arc::clone(&self.0))))
    }
}

impl ChatClient for ScriptedClient {
    fn send(&self, url: &str, payload: &SendMessagePayload<'_>) -> SendOutcome {
        assert!(url.ends_with("/bot123:abc/sendMessage"), "unexpected url {url}");
        self.0
            .sent
            .lock()
            .push(serde_json::to_value(payload).expect("payload serialises"));
        self.0
            .outcomes
            .lock()
            .pop_front()
            .unwrap_or(SendOutcome::Delivered)
    }
}

#[derive(Default)]
struct RecordingSleeper(Mutex<Vec<Duration>>);

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.0.lock().push(duration);
    }
}

struct PanickingFormatter;

impl LogFormatter for PanickingFormatter {
    fn format(&self, _record: &LogRecord) -> String {
        panic!("formatter exploded")
    }
}

struct Harness {
    script: Arc<Script>,
    sleeper: Arc<RecordingSleeper>,
    diagnostics: Arc<CapturedDiagnostics>,
}

impl Harness {
    fn handler(&self, config: TelegramHandlerConfig, outcomes: Vec<SendOutcome>) -> TelegramHandler {
        self.script.outcomes.lock().extend(outcomes);
        TelegramHandler::with_client_factory(config, Arc::new(ScriptedFactory(Arc::clone(&self.script))))
            .with_formatter(TemplateFormatter::new("%(message)s"))
            .with_sleeper(self.sleeper.clone())
            .with_diagnostics(self.diagnostics.clone())
    }

    fn delays(&self) -> Vec<Duration> {
        self.sleeper.0.lock().clone()
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        script: Arc::new(Script::default()),
        sleeper: Arc::new(RecordingSleeper::default()),
        diagnostics: Arc::new(CapturedDiagnostics::new()),
    }
}

fn config() -> TelegramHandlerConfig {
    TelegramHandlerConfig::new("123:abc", "-100")
}

fn transport(msg: &str) -> SendOutcome {
    SendOutcome::Transport(msg.to_owned())
}

fn rejected(status: u16, description: Option<&str>) -> SendOutcome {
    SendOutcome::Rejected {
        status,
        description: description.map(str::to_owned),
    }
}

fn record(message: &str) -> LogRecord {
    LogRecord::new("app.jobs", LogLevel::Error, message)
}

#[rstest]
fn first_attempt_success_sends_html(harness: Harness) {
    let handler = harness.handler(config(), vec![]);
    assert_eq!(
        handler.emit(&record("<b>boom</b>")),
        DeliveryReport::Delivered { attempts: 1 }
    );

    let sent = harness.script.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["chat_id"], "-100");
    assert_eq!(sent[0]["text"], "<b>boom</b>");
    assert_eq!(sent[0]["parse_mode"], "HTML");
    assert_eq!(sent[0]["disable_web_page_preview"], true);
    assert!(harness.delays().is_empty());
    assert!(harness.diagnostics.lines().is_empty());
}

#[rstest]
fn transport_errors_retry_with_doubling_pauses(harness: Harness) {
    let handler = harness.handler(config(), vec![transport("reset"), transport("reset")]);
    assert_eq!(
        handler.emit(&record("m")),
        DeliveryReport::Delivered { attempts: 3 }
    );
    assert_eq!(
        harness.delays(),
        vec![Duration::from_millis(500), Duration::from_millis(1_000)]
    );
    assert_eq!(harness.script.created(), 3);
    assert!(harness.diagnostics.lines().is_empty());
}

#[rstest]
fn exhausted_transport_retries_are_reported(harness: Harness) {
    let handler = harness.handler(
        config(),
        vec![transport("reset"), transport("reset"), transport("timed out")],
    );
    assert_eq!(handler.emit(&record("m")), DeliveryReport::Abandoned);
    assert_eq!(harness.script.sent().len(), 3);
    assert_eq!(harness.delays().len(), 2);
    assert_eq!(
        harness.diagnostics.lines(),
        vec!["Failed to send log to Telegram after 3 attempts: timed out".to_owned()]
    );

    // The next message starts on a fresh client.
    assert_eq!(
        handler.emit(&record("again")),
        DeliveryReport::Delivered { attempts: 1 }
    );
    assert_eq!(harness.script.created(), 4);
}

#[rstest]
fn bad_request_falls_back_to_plain_text(harness: Harness) {
    let handler = harness.handler(
        config(),
        vec![rejected(400, Some("Bad Request: can't parse entities"))],
    );
    assert_eq!(handler.emit(&record("<b>unclosed")), DeliveryReport::Recovered);

    let sent = harness.script.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["parse_mode"], "HTML");
    assert!(sent[1].get("parse_mode").is_none());
    assert_eq!(sent[1]["text"], "<b>unclosed");
    assert_eq!(sent[1]["disable_web_page_preview"], true);
    assert_eq!(
        harness.diagnostics.lines(),
        vec!["Telegram send recovered after HTTP 400 by removing parse_mode.".to_owned()]
    );
    assert!(harness.delays().is_empty());
}

#[rstest]
fn failed_fallback_reports_both_failures(harness: Harness) {
    let handler = harness.handler(
        config(),
        vec![
            rejected(400, Some("Bad Request: can't parse entities")),
            rejected(400, Some("Bad Request: chat not found")),
        ],
    );
    assert_eq!(handler.emit(&record("m")), DeliveryReport::Abandoned);
    assert_eq!(harness.script.sent().len(), 2);
    assert_eq!(
        harness.diagnostics.lines(),
        vec![
            "Failed to send log to Telegram (HTTP 400). Description: Bad Request: can't parse entities"
                .to_owned(),
            "Fallback without parse_mode also failed: HTTP 400: Bad Request: chat not found"
                .to_owned(),
        ]
    );
}

#[rstest]
fn fallback_transport_failure_drops_client(harness: Harness) {
    let handler = harness.handler(config(), vec![rejected(400, None), transport("reset")]);
    assert_eq!(handler.emit(&record("m")), DeliveryReport::Abandoned);
    assert_eq!(
        harness.diagnostics.lines(),
        vec![
            "Failed to send log to Telegram (HTTP 400). Description: none".to_owned(),
            "Fallback without parse_mode also failed: reset".to_owned(),
        ]
    );
    handler.emit(&record("next"));
    assert_eq!(harness.script.created(), 2);
}

#[rstest]
#[case(401, Some("Unauthorized"), "Failed to send log to Telegram (HTTP 401). Description: Unauthorized")]
#[case(429, None, "Failed to send log to Telegram (HTTP 429). Description: none")]
#[case(500, Some("oops"), "Failed to send log to Telegram (HTTP 500). Description: oops")]
fn other_statuses_are_reported_once(
    harness: Harness,
    #[case] status: u16,
    #[case] description: Option<&str>,
    #[case] expected: &str,
) {
    let handler = harness.handler(config(), vec![rejected(status, description)]);
    assert_eq!(handler.emit(&record("m")), DeliveryReport::Abandoned);
    assert_eq!(harness.script.sent().len(), 1);
    assert!(harness.delays().is_empty());
    assert_eq!(harness.diagnostics.lines(), vec![expected.to_owned()]);
    // HTTP-level rejections keep the client.
    assert_eq!(harness.script.created(), 1);
}

#[rstest]
fn unexpected_errors_are_reported_without_retry(harness: Harness) {
    let handler = harness.handler(config(), vec![SendOutcome::Other("encoder broke".into())]);
    assert_eq!(handler.emit(&record("m")), DeliveryReport::Abandoned);
    assert_eq!(harness.script.sent().len(), 1);
    assert_eq!(
        harness.diagnostics.lines(),
        vec!["Failed to send log to Telegram: encoder broke".to_owned()]
    );
}

#[rstest]
fn service_name_prefixes_and_truncation_applies(harness: Harness) {
    let handler = harness.handler(config().with_service_name("billing"), vec![]);
    handler.emit(&record(&"z".repeat(5_000)));

    let sent = harness.script.sent();
    let text = sent[0]["text"].as_str().expect("text is a string");
    assert!(text.starts_with("<b>[billing]</b>\nzzz"));
    assert!(text.ends_with("..."));
    assert_eq!(text.chars().count(), 4_000);
}

#[rstest]
fn close_is_idempotent_and_rejects_later_records(harness: Harness) {
    let handler = harness.handler(config(), vec![]);
    assert_eq!(handler.handle(record("before")), Ok(()));
    LogHandler::close(&handler);
    LogHandler::close(&handler);
    assert_eq!(handler.handle(record("after")), Err(HandlerError::Closed));
    assert_eq!(harness.script.sent().len(), 1);
}

#[rstest]
fn close_without_any_send_is_harmless(harness: Harness) {
    let handler = harness.handler(config(), vec![]);
    handler.close();
    assert_eq!(harness.script.created(), 0);
}

#[rstest]
fn formatter_panic_becomes_handler_error(harness: Harness) {
    let handler = harness
        .handler(config(), vec![])
        .with_formatter(PanickingFormatter);
    assert_eq!(
        handler.handle(record("m")),
        Err(HandlerError::Panicked("formatter exploded".into()))
    );
    assert!(harness.script.sent().is_empty());
}

#[test]
fn debug_output_omits_token() {
    let handler = TelegramHandler::with_config(TelegramHandlerConfig::new("123:secret", "-100"));
    let rendered = format!("{handler:?}");
    assert!(!rendered.contains("secret"));
    assert!(rendered.contains("-100"));
}
