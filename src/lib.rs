//! Logging pipeline with a best-effort Telegram sink.
//!
//! Records travel from named [`Logger`]s through a [`Pipeline`] to the
//! handlers bound along the dotted logger hierarchy. Two handlers ship with
//! the crate: a queued [`StreamHandler`] for the console and a synchronous
//! [`TelegramHandler`] that forwards formatted records to a chat through the
//! Bot API. [`MaxLevelFilter`] keeps a handler below a severity ceiling so
//! errors can be routed away from stdout.
//!
//! [`LoggingSettings`] reads the deployment settings from the environment
//! and an optional `.env` file and realises the standard topology.

mod diagnostics;
mod handler;
mod level;
mod log_record;
mod rate_limited_warner;
mod stream_handler;

pub mod config;
pub mod filters;
pub mod formatter;
pub mod handlers;
pub mod logger;
pub mod pipeline;
pub mod settings;
pub mod telegram_handler;

#[cfg(feature = "log-compat")]
pub mod log_compat;
#[cfg(feature = "tracing-compat")]
pub mod tracing_layer;

#[cfg(test)]
mod test_utils;

pub use config::{ConfigBuilder, ConfigError, FormatterBuilder, LoggerConfigBuilder};
pub use diagnostics::{CapturedDiagnostics, Diagnostics, StderrDiagnostics};
pub use filters::{FilterBuilder, LogFilter, MaxLevelFilter, MaxLevelFilterBuilder};
pub use formatter::{DefaultFormatter, LogFormatter, SharedFormatter, TemplateFormatter};
pub use handler::{HandlerError, LogHandler};
pub use handlers::{
    FormatterId, HandlerBuildError, HandlerBuilder, HandlerBuilderTrait, StreamHandlerBuilder,
    TelegramHandlerBuilder,
};
pub use level::{LogLevel, ParseLevelError};
pub use log_record::{LogRecord, RecordMetadata};
pub use logger::{HandlerBinding, Logger, ROOT_LOGGER};
pub use pipeline::Pipeline;
pub use rate_limited_warner::RateLimitedWarner;
pub use settings::{LoggingSettings, SettingsError};
pub use stream_handler::StreamHandler;
pub use telegram_handler::{
    DeliveryReport, TelegramHandler, TelegramHandlerConfig, UreqClientFactory,
};

#[cfg(feature = "log-compat")]
pub use settings::init_from_env;
