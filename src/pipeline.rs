//! Record dispatch across the logger hierarchy.
//!
//! A [`Pipeline`] owns the root logger and every configured named logger.
//! Records are routed to the most specific configured logger, gated by its
//! effective level and filters, then offered to the handler bindings of that
//! logger and each ancestor until a logger with `propagate = false` is
//! reached. Handler failures never reach the caller; they are written to the
//! pipeline's [`Diagnostics`] sink.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    diagnostics::{Diagnostics, StderrDiagnostics},
    handler::{HandlerError, LogHandler},
    level::LogLevel,
    log_record::LogRecord,
    logger::{Logger, ROOT_LOGGER},
    rate_limited_warner::RateLimitedWarner,
};

/// Level used when neither a logger nor root configures one.
pub const DEFAULT_ROOT_LEVEL: LogLevel = LogLevel::Warn;

/// Logger hierarchy plus the handler-error channel.
pub struct Pipeline {
    root: Logger,
    loggers: BTreeMap<String, Logger>,
    diagnostics: Arc<dyn Diagnostics>,
    report_errors: bool,
    drop_warner: RateLimitedWarner,
}

impl Pipeline {
    /// Create a pipeline around `root` with no named loggers.
    pub fn new(root: Logger) -> Self {
        Self {
            root,
            loggers: BTreeMap::new(),
            diagnostics: Arc::new(StderrDiagnostics),
            report_errors: true,
            drop_warner: RateLimitedWarner::default(),
        }
    }

    /// Register a named logger, replacing one with the same name.
    ///
    /// A logger named `root` replaces the root logger.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        if logger.is_root() {
            self.root = logger;
        } else {
            self.loggers.insert(logger.name().to_owned(), logger);
        }
        self
    }

    /// Replace the sink for handler errors.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Enable or silence handler-error reporting.
    pub fn with_report_errors(mut self, report_errors: bool) -> Self {
        self.report_errors = report_errors;
        self
    }

    pub fn root(&self) -> &Logger {
        &self.root
    }

    /// Look up a configured logger by exact name.
    pub fn logger(&self, name: &str) -> Option<&Logger> {
        if name == ROOT_LOGGER || name.is_empty() {
            return Some(&self.root);
        }
        self.loggers.get(name)
    }

    /// Configured loggers from the most specific match for `name` up to root.
    pub fn chain(&self, name: &str) -> Vec<&Logger> {
        let mut chain = Vec::new();
        let mut cur = name;
        while !cur.is_empty() && cur != ROOT_LOGGER {
            if let Some(logger) = self.loggers.get(cur) {
                chain.push(logger);
            }
            cur = cur.rsplit_once('.').map_or("", |(parent, _)| parent);
        }
        chain.push(&self.root);
        chain
    }

    /// First level configured along the chain for `name`.
    pub fn effective_level(&self, name: &str) -> LogLevel {
        self.chain(name)
            .into_iter()
            .find_map(Logger::level)
            .unwrap_or(DEFAULT_ROOT_LEVEL)
    }

    /// Return whether a record at `level` from logger `name` would be
    /// dispatched at all.
    pub fn is_enabled_for(&self, name: &str, level: LogLevel) -> bool {
        level >= self.effective_level(name)
    }

    /// Build a record and dispatch it.
    pub fn log(&self, name: &str, level: LogLevel, message: &str) {
        if self.is_enabled_for(name, level) {
            self.dispatch(LogRecord::new(name, level, message));
        }
    }

    /// Route an already constructed record through the hierarchy.
    ///
    /// Returns the number of handlers that accepted the record.
    pub fn dispatch(&self, record: LogRecord) -> usize {
        let chain = self.chain(&record.logger);
        let level = chain
            .iter()
            .find_map(|logger| logger.level())
            .unwrap_or(DEFAULT_ROOT_LEVEL);
        if record.level < level {
            return 0;
        }
        if let Some(owner) = chain.first()
            && owner.name() == record.logger
            && !owner.passes_all_filters(&record)
        {
            return 0;
        }

        let mut delivered = 0;
        for logger in chain {
            for binding in logger.handlers() {
                if !binding.accepts(&record) {
                    continue;
                }
                match binding.handler().handle(record.clone()) {
                    Ok(()) => delivered += 1,
                    Err(err) => self.report_handler_error(binding.id(), &record.logger, &err),
                }
            }
            if !logger.propagate() {
                break;
            }
        }
        delivered
    }

    /// Flush every distinct handler. Returns `true` if all flushes completed.
    pub fn flush(&self) -> bool {
        self.flush_warnings();
        self.distinct_handlers()
            .iter()
            .fold(true, |ok, handler| handler.flush() && ok)
    }

    /// Flush and close every distinct handler exactly once.
    pub fn shutdown(&self) {
        self.flush_warnings();
        for handler in self.distinct_handlers() {
            handler.flush();
            handler.close();
        }
    }

    fn distinct_handlers(&self) -> Vec<Arc<dyn LogHandler>> {
        let mut seen: Vec<Arc<dyn LogHandler>> = Vec::new();
        let all = std::iter::once(&self.root).chain(self.loggers.values());
        for binding in all.flat_map(Logger::handlers) {
            if !seen.iter().any(|h| Arc::ptr_eq(h, binding.handler())) {
                seen.push(Arc::clone(binding.handler()));
            }
        }
        seen
    }

    fn report_handler_error(&self, handler_id: &str, logger: &str, err: &HandlerError) {
        if !self.report_errors {
            return;
        }
        let line = format!("Logging error in handler '{handler_id}' for logger '{logger}': {err}");
        match err {
            HandlerError::QueueFull | HandlerError::Closed => {
                self.drop_warner.record_drop();
                self.drop_warner.warn_if_due(|count| {
                    self.diagnostics
                        .report(&format!("{line} ({count} records dropped)"));
                });
            }
            HandlerError::Panicked(_) | HandlerError::Message(_) => {
                self.diagnostics.report(&line);
            }
        }
    }

    fn flush_warnings(&self) {
        if !self.report_errors {
            return;
        }
        self.drop_warner.flush(|count| {
            self.diagnostics.report(&format!(
                "Logging error: {count} records dropped by closed or full handlers"
            ));
        });
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.root)
            .field("loggers", &self.loggers)
            .field("report_errors", &self.report_errors)
            .finish_non_exhaustive()
    }
}
