//! Compatibility bridge for the Rust `log` crate.
//!
//! This module provides `LogAdapter`, an implementation of `log::Log` that
//! forwards records emitted through `log::info!` and friends into a
//! [`Pipeline`]. [`install`] registers the adapter as the global logger.
//!
//! Records emitted by this crate itself (stream write failures, drop counts)
//! never re-enter the pipeline: a handler that fails to write would otherwise
//! be handed its own failure report. They go to [`Diagnostics`] instead.

use std::sync::Arc;

use log::{Metadata, Record};

use crate::diagnostics::{Diagnostics, StderrDiagnostics};
use crate::level::LogLevel;
use crate::log_record::{LogRecord, RecordMetadata};
use crate::logger::normalise_target;
use crate::pipeline::Pipeline;

/// Adapter implementing the Rust `log::Log` trait.
///
/// The adapter maps each record's target onto a dotted logger name, converts
/// the record to a [`LogRecord`], and dispatches it through the pipeline.
pub struct LogAdapter {
    pipeline: Arc<Pipeline>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl LogAdapter {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            diagnostics: Arc::new(StderrDiagnostics),
        }
    }

    /// Replace the sink for records emitted by this crate.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }
}

fn map_log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Trace => LogLevel::Trace,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Info => LogLevel::Info,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Error => LogLevel::Error,
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        map_log_level(level)
    }
}

/// Target prefix of records logged by this crate.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn is_enabled_by_global_max(level: log::Level) -> bool {
    log::max_level() >= level.to_level_filter()
}

impl log::Log for LogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        if !is_enabled_by_global_max(metadata.level()) {
            return false;
        }
        is_own_target(metadata.target())
            || self.pipeline.is_enabled_for(
                &normalise_target(metadata.target()),
                map_log_level(metadata.level()),
            )
    }

    fn log(&self, record: &Record<'_>) {
        if !is_enabled_by_global_max(record.level()) {
            return;
        }
        if is_own_target(record.target()) {
            self.diagnostics.report(&format!(
                "{} {}: {}",
                map_log_level(record.level()),
                record.target(),
                record.args()
            ));
            return;
        }
        let logger_name = normalise_target(record.target());
        let level = LogLevel::from(record.level());
        if !self.pipeline.is_enabled_for(&logger_name, level) {
            return;
        }

        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_string(),
            filename: record.file().unwrap_or_default().to_string(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };
        let log_record = LogRecord::with_metadata(
            &logger_name,
            level,
            &record.args().to_string(),
            metadata,
        );
        self.pipeline.dispatch(log_record);
    }

    fn flush(&self) {
        self.pipeline.flush();
    }
}

/// Install `pipeline` as the global `log` logger.
///
/// Fails when a different global logger is already set. On success the
/// global max level is opened up to `Trace` so the pipeline's own levels
/// decide what is kept.
pub fn install(pipeline: Arc<Pipeline>) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(LogAdapter::new(pipeline)))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
