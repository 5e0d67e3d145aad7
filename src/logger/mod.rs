//! Named loggers and their handler bindings.
//!
//! A [`Logger`] is a node in the dotted logger hierarchy. It carries an
//! optional level (unset means "inherit from the nearest configured
//! ancestor"), logger-level filters, a propagate flag and a list of
//! [`HandlerBinding`]s. Dispatch across the hierarchy lives in
//! [`Pipeline`](crate::pipeline::Pipeline).

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::{
    filters::LogFilter, handler::LogHandler, level::LogLevel, log_record::LogRecord,
};

/// Name under which the root logger is registered.
pub const ROOT_LOGGER: &str = "root";

/// Map a Rust target such as `my_app::jobs` onto the dotted name `my_app.jobs`.
///
/// An empty target names the root logger.
pub fn normalise_target(target: &str) -> Cow<'_, str> {
    if target.is_empty() {
        Cow::Borrowed(ROOT_LOGGER)
    } else if target.contains("::") {
        Cow::Owned(target.replace("::", "."))
    } else {
        Cow::Borrowed(target)
    }
}

/// A handler attached to a logger together with its own level and filters.
#[derive(Clone)]
pub struct HandlerBinding {
    id: String,
    handler: Arc<dyn LogHandler>,
    level: Option<LogLevel>,
    filters: Vec<Arc<dyn LogFilter>>,
}

impl HandlerBinding {
    pub fn new(id: impl Into<String>, handler: Arc<dyn LogHandler>) -> Self {
        Self {
            id: id.into(),
            handler,
            level: None,
            filters: Vec::new(),
        }
    }

    /// Records below `level` skip this handler.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Attach a filter evaluated after the level check.
    pub fn with_filter(mut self, filter: Arc<dyn LogFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn handler(&self) -> &Arc<dyn LogHandler> {
        &self.handler
    }

    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }

    /// Return `true` when the record clears the binding level and every
    /// binding filter.
    pub fn accepts(&self, record: &LogRecord) -> bool {
        if self.level.is_some_and(|level| record.level < level) {
            return false;
        }
        self.filters.iter().all(|f| f.should_log(record))
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

/// A configured node of the logger hierarchy.
#[derive(Clone)]
pub struct Logger {
    name: String,
    level: Option<LogLevel>,
    propagate: bool,
    filters: Vec<Arc<dyn LogFilter>>,
    handlers: Vec<HandlerBinding>,
}

impl Logger {
    /// Create a logger that inherits its level and propagates to its parent.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            propagate: true,
            filters: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Create the root logger.
    pub fn root() -> Self {
        Self::new(ROOT_LOGGER)
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_propagate(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn LogFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_handler(mut self, binding: HandlerBinding) -> Self {
        self.handlers.push(binding);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level configured on this logger, if any.
    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }

    pub fn propagate(&self) -> bool {
        self.propagate
    }

    pub fn handlers(&self) -> &[HandlerBinding] {
        &self.handlers
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_LOGGER
    }

    /// Return `true` if every logger filter approves the record.
    pub fn passes_all_filters(&self, record: &LogRecord) -> bool {
        self.filters.iter().all(|f| f.should_log(record))
    }

    /// Return `true` when `name` is this logger or one of its dotted
    /// descendants. The root logger covers every name.
    pub fn covers(&self, name: &str) -> bool {
        self.is_root()
            || name == self.name
            || name
                .strip_prefix(self.name.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("propagate", &self.propagate)
            .field("filters", &self.filters.len())
            .field("handlers", &self.handlers)
            .finish()
    }
}
