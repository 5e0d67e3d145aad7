//! Formatter trait and the formatters shipped with the crate.
//!
//! Provides the core [`LogFormatter`] trait alongside [`SharedFormatter`], a
//! cheaply cloneable trait object handed to handlers, and two concrete
//! formatters: [`DefaultFormatter`] and the placeholder-driven
//! [`TemplateFormatter`].

use std::{fmt, sync::Arc};

use crate::log_record::LogRecord;

mod template;

pub use template::{DEFAULT_DATE_FORMAT, TemplateFormatter};

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared across threads in a logging system.
pub trait LogFormatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &LogRecord) -> String;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn LogFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: LogFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn LogFormatter>) -> Self {
        Self { inner }
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &LogRecord) -> String {
        self.inner.format(record)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(DefaultFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn LogFormatter>)")
    }
}

impl LogFormatter for SharedFormatter {
    fn format(&self, record: &LogRecord) -> String {
        self.inner.format(record)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl LogFormatter for DefaultFormatter {
    fn format(&self, record: &LogRecord) -> String {
        format!("{} [{}] {}", record.logger, record.level, record.message)
    }
}

impl LogFormatter for Arc<dyn LogFormatter> {
    fn format(&self, record: &LogRecord) -> String {
        (**self).format(record)
    }
}

impl LogFormatter for Box<dyn LogFormatter> {
    fn format(&self, record: &LogRecord) -> String {
        (**self).format(record)
    }
}
