//! Public handler type exported by the crate.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    diagnostics::{Diagnostics, StderrDiagnostics},
    formatter::{LogFormatter, SharedFormatter},
    handler::{HandlerError, LogHandler, panic_message},
    log_record::LogRecord,
};

use super::{
    client::{ClientFactory, SendOutcome, UreqClientFactory},
    client_slot::ClientSlot,
    config::TelegramHandlerConfig,
    payload::{SendMessagePayload, compose_text},
    retry::{RetryPolicy, Sleeper, ThreadSleeper},
};

/// What happened to a single message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryReport {
    /// Accepted with markup after `attempts` tries.
    Delivered { attempts: u32 },
    /// Accepted only after markup was disabled.
    Recovered,
    /// Given up; a diagnostic has been written.
    Abandoned,
}

/// Handler forwarding records to a Telegram chat.
///
/// Sends synchronously on the caller's thread. Transport failures are retried
/// with a fresh client, a 400 response triggers one plain-text resend, and
/// every other failure is reported through [`Diagnostics`] and dropped.
pub struct TelegramHandler {
    endpoint: String,
    chat_id: String,
    service_name: Option<String>,
    max_message_chars: usize,
    retry: RetryPolicy,
    formatter: SharedFormatter,
    slot: ClientSlot,
    sleeper: Arc<dyn Sleeper>,
    diagnostics: Arc<dyn Diagnostics>,
    closed: AtomicBool,
}

impl TelegramHandler {
    /// Construct the handler from a configuration object.
    pub fn with_config(config: TelegramHandlerConfig) -> Self {
        Self::with_client_factory(config, Arc::new(UreqClientFactory))
    }

    /// Construct the handler with a custom client factory.
    pub fn with_client_factory(
        config: TelegramHandlerConfig,
        factory: Arc<dyn ClientFactory>,
    ) -> Self {
        Self {
            endpoint: config.endpoint_url(),
            chat_id: config.chat_id,
            service_name: config.service_name,
            max_message_chars: config.max_message_chars,
            retry: config.retry,
            formatter: SharedFormatter::default(),
            slot: ClientSlot::new(factory, config.timeout),
            sleeper: Arc::new(ThreadSleeper),
            diagnostics: Arc::new(StderrDiagnostics),
            closed: AtomicBool::new(false),
        }
    }

    /// Replace the formatter used to render records.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: LogFormatter + 'static,
    {
        self.formatter = SharedFormatter::new(formatter);
        self
    }

    /// Replace the formatter with an already shared instance.
    pub fn with_shared_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Replace the pause used between retries.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replace the sink for delivery diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Destination chat.
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Format `record` and deliver it.
    pub fn emit(&self, record: &LogRecord) -> DeliveryReport {
        let message = self.formatter.format(record);
        self.send_message(message)
    }

    /// Shape and deliver an already formatted message.
    pub fn send_message(&self, message: String) -> DeliveryReport {
        let text = compose_text(
            message,
            self.service_name.as_deref(),
            self.max_message_chars,
        );
        let payload = SendMessagePayload::html(&self.chat_id, &text);
        self.deliver(&payload)
    }

    /// Close the handler and release the HTTP client. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.slot.invalidate();
    }

    fn deliver(&self, payload: &SendMessagePayload<'_>) -> DeliveryReport {
        let attempts = self.retry.attempts();
        for attempt in 0..attempts {
            match self.send_once(payload) {
                SendOutcome::Delivered => {
                    return DeliveryReport::Delivered {
                        attempts: attempt + 1,
                    };
                }
                SendOutcome::Transport(err) => {
                    self.slot.invalidate();
                    if attempt + 1 < attempts {
                        self.sleeper.sleep(self.retry.delay_for(attempt));
                        continue;
                    }
                    self.report(&format!(
                        "Failed to send log to Telegram after {attempts} attempts: {err}"
                    ));
                }
                SendOutcome::Rejected {
                    status: 400,
                    description,
                } => return self.resend_without_markup(payload, description),
                SendOutcome::Rejected {
                    status,
                    description,
                } => self.report_rejection(status, description.as_deref()),
                SendOutcome::Other(err) => {
                    self.report(&format!("Failed to send log to Telegram: {err}"));
                }
            }
            break;
        }
        DeliveryReport::Abandoned
    }

    fn resend_without_markup(
        &self,
        payload: &SendMessagePayload<'_>,
        description: Option<String>,
    ) -> DeliveryReport {
        let plain = payload.without_markup();
        let failure = match self.send_once(&plain) {
            SendOutcome::Delivered => {
                self.report("Telegram send recovered after HTTP 400 by removing parse_mode.");
                return DeliveryReport::Recovered;
            }
            SendOutcome::Transport(err) => {
                self.slot.invalidate();
                err
            }
            SendOutcome::Rejected {
                status,
                description,
            } => match description {
                Some(desc) => format!("HTTP {status}: {desc}"),
                None => format!("HTTP {status}"),
            },
            SendOutcome::Other(err) => err,
        };
        self.report_rejection(400, description.as_deref());
        self.report(&format!(
            "Fallback without parse_mode also failed: {failure}"
        ));
        DeliveryReport::Abandoned
    }

    fn send_once(&self, payload: &SendMessagePayload<'_>) -> SendOutcome {
        match self.slot.acquire() {
            Ok(client) => client.send(&self.endpoint, payload),
            Err(err) => SendOutcome::Transport(err.to_string()),
        }
    }

    fn report_rejection(&self, status: u16, description: Option<&str>) {
        self.report(&format!(
            "Failed to send log to Telegram (HTTP {status}). Description: {}",
            description.unwrap_or("none")
        ));
    }

    fn report(&self, line: &str) {
        self.diagnostics.report(line);
    }
}

impl LogHandler for TelegramHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(HandlerError::Closed);
        }
        panic::catch_unwind(AssertUnwindSafe(|| self.emit(&record)))
            .map(|_| ())
            .map_err(|payload| HandlerError::Panicked(panic_message(payload.as_ref())))
    }

    fn close(&self) {
        TelegramHandler::close(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for TelegramHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramHandler")
            .field("chat_id", &self.chat_id)
            .field("service_name", &self.service_name)
            .field("retry", &self.retry)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
