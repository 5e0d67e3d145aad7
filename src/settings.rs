//! Environment-driven logging settings.
//!
//! [`LoggingSettings`] reads `LOG_LEVEL`, `DEBUG`, `LOG_TELEGRAM_BOT_TOKEN`,
//! `LOG_TELEGRAM_CHAT_ID` and `LOG_SERVICE_NAME` from the process environment,
//! layered over a `.env` file parsed with `rust-ini`. Process variables win
//! over file entries, keys are case-insensitive and empty values count as
//! unset.
//!
//! [`LoggingSettings::to_config`] turns the settings into the standard
//! wiring: a console handler that never sees errors, a debug console handler,
//! and a Telegram handler for errors when credentials are present.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use ini::{Ini, ParseOption};
use thiserror::Error;

use crate::{
    config::{ConfigBuilder, ConfigError, FormatterBuilder, LoggerConfigBuilder},
    filters::MaxLevelFilterBuilder,
    handlers::{StreamHandlerBuilder, TelegramHandlerBuilder},
    level::{LogLevel, ParseLevelError},
    pipeline::Pipeline,
};

/// File consulted by [`LoggingSettings::from_env`].
pub const DEFAULT_ENV_FILE: &str = ".env";

pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const DEBUG_VAR: &str = "DEBUG";
pub const BOT_TOKEN_VAR: &str = "LOG_TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "LOG_TELEGRAM_CHAT_ID";
pub const SERVICE_NAME_VAR: &str = "LOG_SERVICE_NAME";

/// Template of the `console` formatter.
pub const CONSOLE_FORMAT: &str = "%(asctime)s - %(name)s - %(levelname)s - %(message)s";
/// Template of the `telegram` formatter.
pub const TELEGRAM_FORMAT: &str = "<b>[%(levelname)s]</b> %(name)s\n%(message)s";

/// Loggers that keep their records out of root.
pub const ISOLATED_LOGGERS: [&str; 2] = ["jobs", "access_requests"];

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The `.env` file exists but could not be read or parsed.
    #[error("failed to load env file: {0}")]
    EnvFile(#[from] ini::Error),
    /// `LOG_LEVEL` is not a level name.
    #[error("invalid LOG_LEVEL: {0}")]
    InvalidLevel(#[from] ParseLevelError),
    /// A boolean variable holds an unrecognised word.
    #[error("invalid boolean for {key}: {value:?}")]
    InvalidBool { key: String, value: String },
    /// The derived configuration failed to build.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Another `log` logger is already installed.
    #[cfg(feature = "log-compat")]
    #[error("failed to install log bridge: {0}")]
    Install(#[from] log::SetLoggerError),
}

/// Settings that drive the standard logging wiring.
#[derive(Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub log_level: LogLevel,
    pub debug: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub service_name: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            debug: false,
            telegram_bot_token: None,
            telegram_chat_id: None,
            service_name: None,
        }
    }
}

impl LoggingSettings {
    /// Read `.env` from the working directory and the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_sources(Some(Path::new(DEFAULT_ENV_FILE)), std::env::vars())
    }

    /// Read an optional env file, then overlay `vars`.
    ///
    /// A missing file is not an error.
    pub fn from_sources<I, K, V>(env_file: Option<&Path>, vars: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values = match env_file {
            Some(path) => read_env_file(path)?,
            None => HashMap::new(),
        };
        for (key, value) in vars {
            values.insert(key.as_ref().to_ascii_uppercase(), value.into());
        }
        Self::from_map(&values)
    }

    /// Interpret already collected upper-case keys.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, SettingsError> {
        let get = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        let defaults = Self::default();
        let log_level = match get(LOG_LEVEL_VAR) {
            Some(raw) => raw.parse()?,
            None => defaults.log_level,
        };
        let debug = match get(DEBUG_VAR) {
            Some(raw) => parse_bool(DEBUG_VAR, &raw)?,
            None => defaults.debug,
        };
        Ok(Self {
            log_level,
            debug,
            telegram_bot_token: get(BOT_TOKEN_VAR),
            telegram_chat_id: get(CHAT_ID_VAR),
            service_name: get(SERVICE_NAME_VAR),
        })
    }

    /// Whether both Telegram credentials are present.
    pub fn telegram_enabled(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }

    /// Level of the root logger: DEBUG while debugging, else `log_level`.
    pub fn root_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }

    /// Handler ids attached to root and to the isolated loggers.
    pub fn handler_ids(&self) -> Vec<&'static str> {
        let console = if self.debug { "console_debug" } else { "console" };
        let mut ids = vec![console];
        if self.telegram_enabled() {
            ids.push("telegram");
        }
        ids
    }

    /// Build the standard configuration from these settings.
    pub fn to_config(&self) -> ConfigBuilder {
        let handler_ids = self.handler_ids();
        let mut builder = ConfigBuilder::new()
            .with_filter(
                "stdout_no_errors",
                MaxLevelFilterBuilder::new().with_max_level("WARNING"),
            )
            .with_formatter("console", FormatterBuilder::new().with_format(CONSOLE_FORMAT))
            .with_formatter("telegram", FormatterBuilder::new().with_format(TELEGRAM_FORMAT))
            .with_handler(
                "console",
                StreamHandlerBuilder::stdout()
                    .with_level(self.log_level)
                    .with_filters(["stdout_no_errors"])
                    .with_formatter("console"),
            )
            .with_handler(
                "console_debug",
                StreamHandlerBuilder::stdout()
                    .with_level(LogLevel::Debug)
                    .with_formatter("console"),
            );

        if let (Some(token), Some(chat_id)) = (&self.telegram_bot_token, &self.telegram_chat_id) {
            let mut telegram = TelegramHandlerBuilder::new()
                .with_credentials(token.clone(), chat_id.clone())
                .with_level(LogLevel::Error)
                .with_formatter("telegram");
            if let Some(service_name) = &self.service_name {
                telegram = telegram.with_service_name(service_name.clone());
            }
            builder = builder.with_handler("telegram", telegram);
        }

        builder = builder.with_root_logger(
            LoggerConfigBuilder::new()
                .with_level(self.root_level())
                .with_handlers(handler_ids.iter().copied()),
        );
        for name in ISOLATED_LOGGERS {
            builder = builder.with_logger(
                name,
                LoggerConfigBuilder::new()
                    .with_level(LogLevel::Info)
                    .with_handlers(handler_ids.iter().copied())
                    .with_propagate(false),
            );
        }
        builder
    }

    /// Build the pipeline described by [`to_config`](Self::to_config).
    pub fn build_pipeline(&self) -> Result<Pipeline, SettingsError> {
        Ok(self.to_config().build()?)
    }
}

impl std::fmt::Debug for LoggingSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingSettings")
            .field("log_level", &self.log_level)
            .field("debug", &self.debug)
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "<redacted>"),
            )
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("service_name", &self.service_name)
            .finish()
    }
}

/// Load settings from the environment, build the pipeline and install it as
/// the global `log` logger.
#[cfg(feature = "log-compat")]
pub fn init_from_env() -> Result<std::sync::Arc<Pipeline>, SettingsError> {
    let pipeline = std::sync::Arc::new(LoggingSettings::from_env()?.build_pipeline()?);
    crate::log_compat::install(std::sync::Arc::clone(&pipeline))?;
    Ok(pipeline)
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, SettingsError> {
    let opt = ParseOption {
        enabled_quote: true,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = match Ini::load_from_file_opt(path, opt) {
        Ok(ini) => ini,
        Err(ini::Error::Io(err)) if err.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(err) => return Err(err.into()),
    };
    Ok(ini
        .general_section()
        .iter()
        .map(|(key, value)| {
            let key = key.trim_start_matches("export ").trim().to_ascii_uppercase();
            (key, unquote(value).to_owned())
        })
        .collect())
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, SettingsError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidBool {
            key: key.to_owned(),
            value: raw.to_owned(),
        }),
    }
}
