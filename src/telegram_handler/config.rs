//! Configuration consumed by the Telegram handler lifecycle.
//!
//! `TelegramHandlerBuilder` constructs these values before passing them to
//! [`TelegramHandler`](super::TelegramHandler) for runtime use.

use std::fmt;
use std::time::Duration;

use super::retry::RetryPolicy;

/// Base URL of the public Bot API.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
/// Timeout applied to every individual request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Retries after the first attempt for transport failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Pause before the first retry; doubled for each further retry.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);
/// Longest text, in characters, sent in a single message.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Configuration object describing how to construct a
/// [`TelegramHandler`](super::TelegramHandler).
#[derive(Clone)]
pub struct TelegramHandlerConfig {
    /// Scheme and host of the Bot API, without a trailing slash.
    pub api_base: String,
    /// Bot token issued by BotFather.
    pub bot_token: String,
    /// Destination chat identifier.
    pub chat_id: String,
    /// Optional service tag prepended to every message.
    pub service_name: Option<String>,
    /// Timeout for each HTTP request.
    pub timeout: Duration,
    /// Retry schedule for transport failures.
    pub retry: RetryPolicy,
    /// Character cap applied after the service prefix is added.
    pub max_message_chars: usize,
}

impl TelegramHandlerConfig {
    /// Create a configuration targeting the public Bot API.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            service_name: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }

    /// Set the service name; empty names are treated as unset.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        let name = service_name.into();
        self.service_name = (!name.is_empty()).then_some(name);
        self
    }

    /// Override the API base, e.g. for a local Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Full `sendMessage` URL for this bot.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

impl fmt::Debug for TelegramHandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramHandlerConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("service_name", &self.service_name)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("max_message_chars", &self.max_message_chars)
            .finish()
    }
}
