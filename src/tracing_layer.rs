//! Bridge from the `tracing` crate into a [`Pipeline`].
//!
//! [`PipelineLayer`] is a `tracing-subscriber` layer that turns every event
//! into a [`LogRecord`]. The event's `message` field becomes the record
//! message and every other field is kept as a key-value pair.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::level::LogLevel;
use crate::log_record::{LogRecord, RecordMetadata};
use crate::logger::normalise_target;
use crate::pipeline::Pipeline;

/// A tracing layer dispatching events through a [`Pipeline`].
pub struct PipelineLayer {
    pipeline: Arc<Pipeline>,
}

impl PipelineLayer {
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    const fn map_level(level: &Level) -> LogLevel {
        match *level {
            Level::TRACE => LogLevel::Trace,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warn,
            Level::ERROR => LogLevel::Error,
        }
    }
}

impl<S> Layer<S> for PipelineLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let logger_name = normalise_target(metadata.target());
        let level = Self::map_level(metadata.level());
        if !self.pipeline.is_enabled_for(&logger_name, level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let record_metadata = RecordMetadata {
            module_path: metadata.module_path().unwrap_or_default().to_string(),
            filename: metadata.file().unwrap_or_default().to_string(),
            line_number: metadata.line().unwrap_or(0),
            key_values: visitor.fields,
            ..Default::default()
        };
        let record = LogRecord::with_metadata(
            &logger_name,
            level,
            visitor.message.as_deref().unwrap_or_default(),
            record_metadata,
        );
        self.pipeline.dispatch(record);
    }
}

/// Collects the `message` field and the remaining structured fields.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: std::collections::BTreeMap<String, String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.insert(field.name().to_owned(), format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.fields.insert(field.name().to_owned(), value.to_owned());
        }
    }
}

/// Install `pipeline` as the global `tracing` subscriber.
pub fn install(pipeline: Arc<Pipeline>) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(PipelineLayer::new(pipeline))
        .try_init()
}
