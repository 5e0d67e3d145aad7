//! Type definitions and builder structs for telelog configuration.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    filters::{FilterBuildError, FilterBuilder},
    formatter::{SharedFormatter, TemplateFormatter},
    handlers::{HandlerBuildError, HandlerBuilder},
    level::LogLevel,
};

/// Errors that may occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The provided configuration schema version is unsupported.
    #[error("unsupported configuration version: {0}")]
    UnsupportedVersion(u8),
    /// No root logger configuration was provided.
    #[error("missing root logger configuration")]
    MissingRootLogger,
    /// A logger name is empty or has an empty dotted segment.
    #[error("invalid logger name: {0:?}")]
    InvalidLoggerName(String),
    /// Identifiers that were referenced but never defined.
    #[error("unknown ids: {0:?}")]
    UnknownIds(Vec<String>),
    /// A handler referenced a formatter that was not defined.
    #[error("handler {handler} references unknown formatter {formatter}")]
    UnknownFormatterId {
        /// The handler whose formatter could not be resolved.
        handler: String,
        /// The missing formatter identifier.
        formatter: String,
    },
    /// The same handler id appeared twice in one list.
    #[error("duplicate handler ids: {0:?}")]
    DuplicateHandlerIds(Vec<String>),
    /// The same filter id appeared twice in one list.
    #[error("duplicate filter ids: {0:?}")]
    DuplicateFilterIds(Vec<String>),
    /// Building a filter failed.
    #[error("failed to build filter {id}: {source}")]
    FilterBuild {
        /// The identifier of the filter that failed to build.
        id: String,
        /// The underlying build error.
        #[source]
        source: FilterBuildError,
    },
    /// Building a handler failed.
    #[error("failed to build handler {id}: {source}")]
    HandlerBuild {
        /// The identifier of the handler that failed to build.
        id: String,
        /// The underlying build error.
        #[source]
        source: HandlerBuildError,
    },
}

/// Builder for formatter definitions.
#[derive(Clone, Debug, Default)]
pub struct FormatterBuilder {
    pub(crate) format: Option<String>,
    pub(crate) datefmt: Option<String>,
}

impl FormatterBuilder {
    /// Create a new `FormatterBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the format string.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the date format string.
    pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.datefmt = Some(datefmt.into());
        self
    }

    /// Return the configured format string.
    pub fn format_string(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Return the configured date format string.
    pub fn datefmt_string(&self) -> Option<&str> {
        self.datefmt.as_deref()
    }

    /// Realise the formatter. Without a format string only the message is
    /// rendered.
    pub(crate) fn build(&self) -> SharedFormatter {
        let template = TemplateFormatter::new(self.format.as_deref().unwrap_or("%(message)s"));
        match &self.datefmt {
            Some(datefmt) => SharedFormatter::new(template.with_datefmt(datefmt.clone())),
            None => SharedFormatter::new(template),
        }
    }
}

/// Builder for logger configuration.
#[derive(Clone, Debug, Default)]
pub struct LoggerConfigBuilder {
    pub(crate) level: Option<LogLevel>,
    pub(crate) propagate: Option<bool>,
    pub(crate) filters: Vec<String>,
    pub(crate) handlers: Vec<String>,
}

impl LoggerConfigBuilder {
    /// Create a new `LoggerConfigBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logger level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Set propagation behaviour.
    pub fn with_propagate(mut self, propagate: bool) -> Self {
        self.propagate = Some(propagate);
        self
    }

    /// Set filters by identifier, replacing any existing filters.
    pub fn with_filters<I, S>(mut self, filter_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filter_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set handlers by identifier, replacing any existing handlers.
    ///
    /// Handlers are invoked in the order given.
    pub fn with_handlers<I, S>(mut self, handler_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handlers = handler_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Retrieve the level if configured.
    pub fn level_opt(&self) -> Option<LogLevel> {
        self.level
    }

    /// Retrieve the propagate flag if configured.
    pub fn propagate_opt(&self) -> Option<bool> {
        self.propagate
    }

    /// Retrieve the configured filter identifiers.
    pub fn filter_ids(&self) -> &[String] {
        &self.filters
    }

    /// Retrieve the configured handler identifiers.
    pub fn handler_ids(&self) -> &[String] {
        &self.handlers
    }
}

/// Builder for the overall configuration.
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    pub(crate) version: u8,
    pub(crate) default_level: Option<LogLevel>,
    pub(crate) report_errors: bool,
    pub(crate) formatters: BTreeMap<String, FormatterBuilder>,
    pub(crate) filters: BTreeMap<String, FilterBuilder>,
    /// Registered handler builders keyed by identifier.
    pub(crate) handlers: BTreeMap<String, HandlerBuilder>,
    pub(crate) loggers: BTreeMap<String, LoggerConfigBuilder>,
    pub(crate) root_logger: Option<LoggerConfigBuilder>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            version: 1,
            default_level: None,
            report_errors: true,
            formatters: BTreeMap::new(),
            filters: BTreeMap::new(),
            handlers: BTreeMap::new(),
            loggers: BTreeMap::new(),
            root_logger: None,
        }
    }
}

impl ConfigBuilder {
    /// Create a new `ConfigBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the schema version.
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Set the level applied to loggers that do not configure one.
    pub fn with_default_level(mut self, level: LogLevel) -> Self {
        self.default_level = Some(level);
        self
    }

    /// Enable or silence the handler-error channel of the built pipeline.
    pub fn with_report_errors(mut self, report_errors: bool) -> Self {
        self.report_errors = report_errors;
        self
    }

    /// Add a formatter by identifier, replacing any existing formatter with the same id.
    pub fn with_formatter(mut self, id: impl Into<String>, builder: FormatterBuilder) -> Self {
        self.formatters.insert(id.into(), builder);
        self
    }

    /// Adds a filter configuration by its unique ID, replacing any existing entry.
    pub fn with_filter<B>(mut self, id: impl Into<String>, builder: B) -> Self
    where
        B: Into<FilterBuilder>,
    {
        self.filters.insert(id.into(), builder.into());
        self
    }

    /// Add a handler builder by identifier, replacing any existing handler with the same id.
    pub fn with_handler<B>(mut self, id: impl Into<String>, builder: B) -> Self
    where
        B: Into<HandlerBuilder>,
    {
        self.handlers.insert(id.into(), builder.into());
        self
    }

    /// Add a logger by name, replacing any existing logger with the same name.
    pub fn with_logger(mut self, name: impl Into<String>, builder: LoggerConfigBuilder) -> Self {
        self.loggers.insert(name.into(), builder);
        self
    }

    /// Set the root logger configuration, replacing any previous configuration.
    pub fn with_root_logger(mut self, builder: LoggerConfigBuilder) -> Self {
        self.root_logger = Some(builder);
        self
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn default_level(&self) -> Option<LogLevel> {
        self.default_level
    }

    pub fn root_logger(&self) -> Option<&LoggerConfigBuilder> {
        self.root_logger.as_ref()
    }

    pub fn logger_builders(&self) -> &BTreeMap<String, LoggerConfigBuilder> {
        &self.loggers
    }

    pub fn handler_builders(&self) -> &BTreeMap<String, HandlerBuilder> {
        &self.handlers
    }

    pub fn filter_builders(&self) -> &BTreeMap<String, FilterBuilder> {
        &self.filters
    }

    pub fn formatter_builders(&self) -> &BTreeMap<String, FormatterBuilder> {
        &self.formatters
    }
}
