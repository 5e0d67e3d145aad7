//! Handler trait shared by every sink.

use std::any::Any;

use thiserror::Error;

use crate::log_record::LogRecord;

/// Errors a handler may return from [`LogHandler::handle`].
///
/// These never reach application code: the pipeline routes them to its
/// handler-error channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler's queue is full and the record was dropped.
    #[error("handler queue is full")]
    QueueFull,
    /// The handler has been closed.
    #[error("handler is closed")]
    Closed,
    /// Formatting or delivery panicked; the payload message is preserved.
    #[error("handler panicked: {0}")]
    Panicked(String),
    /// Any other failure described by the handler.
    #[error("{0}")]
    Message(String),
}

/// Trait implemented by all log handlers.
///
/// Handlers are `Send + Sync` so a single instance can be bound to several
/// loggers and invoked from any thread.
pub trait LogHandler: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError>;

    /// Flush pending output. Returns `true` when the flush completed.
    fn flush(&self) -> bool {
        true
    }

    /// Release resources held by the handler. Must be idempotent.
    fn close(&self) {}

    /// Expose the concrete handler for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
