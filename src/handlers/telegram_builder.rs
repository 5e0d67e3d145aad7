//! Builder for [`TelegramHandler`].
//!
//! Collects bot credentials, the optional service tag, timeouts and the retry
//! schedule. The HTTP client factory, retry sleeper and diagnostics sink can
//! be overridden, which is how tests and local Bot API servers plug in.

use std::{fmt, sync::Arc, time::Duration};

use super::{CommonBuilder, HandlerBuildError, HandlerBuilderTrait, common::common_setters};
use crate::{
    diagnostics::Diagnostics,
    formatter::SharedFormatter,
    telegram_handler::{
        ClientFactory, RetryPolicy, Sleeper, TelegramHandler, TelegramHandlerConfig,
    },
};

/// Shortest cap that still leaves room for the `...` marker.
const MIN_MESSAGE_CHARS: usize = 4;

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`TelegramHandler`] instances.
#[derive(Clone, Default)]
pub struct TelegramHandlerBuilder {
    bot_token: Option<String>,
    chat_id: Option<String>,
    service_name: Option<String>,
    api_base: Option<String>,
    timeout_ms: Option<u64>,
    max_retries: Option<u32>,
    backoff_base_ms: Option<u64>,
    max_message_chars: Option<usize>,
    client_factory: Option<Arc<dyn ClientFactory>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
    common: CommonBuilder,
}

impl TelegramHandlerBuilder {
    /// Create a new builder with no credentials configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bot token and destination chat (both required).
    pub fn with_credentials(
        mut self,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        self.bot_token = Some(bot_token.into());
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Tag every message with `<b>[service_name]</b>`. Empty names are ignored.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        let name = service_name.into();
        self.service_name = (!name.is_empty()).then_some(name);
        self
    }

    /// Point the handler at another Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    option_setter!(
        #[doc = "Set the per-request timeout in milliseconds."]
        with_timeout_ms,
        timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set how many times a transport failure is retried."]
        with_max_retries,
        max_retries,
        u32
    );
    option_setter!(
        #[doc = "Set the pause before the first retry in milliseconds."]
        with_backoff_base_ms,
        backoff_base_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the character cap applied to outgoing text."]
        with_max_message_chars,
        max_message_chars,
        usize
    );
    option_setter!(
        #[doc = "Replace the HTTP client factory."]
        with_client_factory,
        client_factory,
        Arc<dyn ClientFactory>
    );
    option_setter!(
        #[doc = "Replace the pause used between retries."]
        with_sleeper,
        sleeper,
        Arc<dyn Sleeper>
    );
    option_setter!(
        #[doc = "Replace the sink for delivery diagnostics."]
        with_diagnostics,
        diagnostics,
        Arc<dyn Diagnostics>
    );

    fn validate(&self) -> Result<(), HandlerBuildError> {
        Self::require("bot token", self.bot_token.as_deref())?;
        Self::require("chat id", self.chat_id.as_deref())?;
        CommonBuilder::ensure_non_zero("timeout_ms", self.timeout_ms)?;
        if let Some(max) = self.max_message_chars
            && max < MIN_MESSAGE_CHARS
        {
            return Err(HandlerBuildError::InvalidConfig(format!(
                "max_message_chars must be at least {MIN_MESSAGE_CHARS}"
            )));
        }
        Ok(())
    }

    fn require(field: &str, value: Option<&str>) -> Result<(), HandlerBuildError> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(()),
            _ => Err(HandlerBuildError::InvalidConfig(format!(
                "Telegram handler requires a {field}"
            ))),
        }
    }

    /// Validate the builder and produce the handler configuration.
    pub fn build_config(&self) -> Result<TelegramHandlerConfig, HandlerBuildError> {
        self.validate()?;
        let mut config = TelegramHandlerConfig::new(
            self.bot_token.clone().unwrap_or_default(),
            self.chat_id.clone().unwrap_or_default(),
        );
        config.service_name = self.service_name.clone();
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        let defaults = RetryPolicy::default();
        config.retry = RetryPolicy {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            base: self
                .backoff_base_ms
                .map_or(defaults.base, Duration::from_millis),
        };
        if let Some(max) = self.max_message_chars {
            config.max_message_chars = max;
        }
        Ok(config)
    }
}

common_setters!(TelegramHandlerBuilder);

impl HandlerBuilderTrait for TelegramHandlerBuilder {
    type Handler = TelegramHandler;

    fn build_inner(&self, formatter: SharedFormatter) -> Result<Self::Handler, HandlerBuildError> {
        let config = self.build_config()?;
        let mut handler = match &self.client_factory {
            Some(factory) => TelegramHandler::with_client_factory(config, Arc::clone(factory)),
            None => TelegramHandler::with_config(config),
        };
        handler = handler.with_shared_formatter(formatter);
        if let Some(sleeper) = &self.sleeper {
            handler = handler.with_sleeper(Arc::clone(sleeper));
        }
        if let Some(diagnostics) = &self.diagnostics {
            handler = handler.with_diagnostics(Arc::clone(diagnostics));
        }
        Ok(handler)
    }

    fn common(&self) -> &CommonBuilder {
        &self.common
    }
}

impl fmt::Debug for TelegramHandlerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramHandlerBuilder")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("service_name", &self.service_name)
            .field("api_base", &self.api_base)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("max_message_chars", &self.max_message_chars)
            .field("common", &self.common)
            .finish_non_exhaustive()
    }
}
