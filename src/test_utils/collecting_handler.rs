//! Handlers that accumulate records in memory for test assertions.
//!
//! This module is shared across multiple test files so that each test module
//! does not need its own copy of the same boilerplate.

use crate::handler::{HandlerError, LogHandler};
use crate::log_record::LogRecord;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Handler that stores every record it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingHandler {
    records: Arc<Mutex<Vec<LogRecord>>>,
    flushes: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl CollectingHandler {
    /// Create a new empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all records received so far.
    pub fn collected(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages received so far, in order.
    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl LogHandler for CollectingHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record);
        Ok(())
    }

    fn flush(&self) -> bool {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handler that rejects every record with a fixed error.
#[derive(Clone, Debug)]
pub struct FailingHandler {
    error: HandlerError,
}

impl FailingHandler {
    pub fn new(error: HandlerError) -> Self {
        Self { error }
    }
}

impl LogHandler for FailingHandler {
    fn handle(&self, _record: LogRecord) -> Result<(), HandlerError> {
        Err(self.error.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
