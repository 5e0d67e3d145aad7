//! Stream-based logging handler implementation.
//!
//! This module defines `StreamHandler`, which formats log records and writes
//! them to a stream on a background thread. The handler forwards
//! `LogRecord` values over a bounded channel so the producer never blocks on
//! I/O.

use std::{
    any::Any,
    io::{self, Write},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use log::warn;
use parking_lot::Mutex;

use crate::{
    formatter::{LogFormatter, SharedFormatter},
    handler::{HandlerError, LogHandler},
    log_record::LogRecord,
    rate_limited_warner::RateLimitedWarner,
};

/// Queue length used by the convenience constructors.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
/// How long `flush` and `close` wait for the worker.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

enum StreamCommand {
    Record(Box<LogRecord>),
    Flush(Sender<()>),
}

/// Handler that writes formatted log records to an `io::Write` stream.
///
/// Each instance owns a background thread which receives records via a
/// channel and writes them to the provided stream. The writer and formatter
/// are moved into that thread so the caller never locks or blocks.
pub struct StreamHandler {
    tx: Mutex<Option<Sender<StreamCommand>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    done_rx: Receiver<()>,
    timeout: Duration,
    drops: RateLimitedWarner,
}

impl StreamHandler {
    /// Create a new handler writing to `stdout` with the given formatter.
    pub fn stdout(formatter: SharedFormatter) -> Self {
        Self::new(io::stdout(), formatter)
    }

    /// Create a new handler writing to `stderr` with the given formatter.
    pub fn stderr(formatter: SharedFormatter) -> Self {
        Self::new(io::stderr(), formatter)
    }

    /// Create a new handler from an arbitrary writer and formatter using the
    /// default capacity.
    pub fn new<W, F>(writer: W, formatter: F) -> Self
    where
        W: Write + Send + 'static,
        F: LogFormatter + 'static,
    {
        Self::with_capacity(writer, formatter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new handler with a custom channel capacity.
    pub fn with_capacity<W, F>(writer: W, formatter: F, capacity: usize) -> Self
    where
        W: Write + Send + 'static,
        F: LogFormatter + 'static,
    {
        let (tx, rx) = bounded::<StreamCommand>(capacity);
        let (done_tx, done_rx) = bounded(1);
        let handle = thread::spawn(move || {
            let mut writer = writer;
            for command in rx {
                match command {
                    StreamCommand::Record(record) => {
                        let msg = formatter.format(&record);
                        if writeln!(writer, "{msg}")
                            .and_then(|_| writer.flush())
                            .is_err()
                        {
                            warn!("StreamHandler write error");
                        }
                    }
                    StreamCommand::Flush(ack) => {
                        if writer.flush().is_err() {
                            warn!("StreamHandler flush error");
                        }
                        let _ = ack.send(());
                    }
                }
            }
            let _ = done_tx.send(());
        });

        Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            done_rx,
            timeout: DEFAULT_FLUSH_TIMEOUT,
            drops: RateLimitedWarner::default(),
        }
    }

    fn sender(&self) -> Option<Sender<StreamCommand>> {
        self.tx.lock().clone()
    }

    /// Wait until every queued record has been written.
    pub fn flush(&self) -> bool {
        self.drops.flush(|count| {
            warn!("StreamHandler: dropped {count} records because the queue was full");
        });
        let Some(tx) = self.sender() else {
            return false;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send_timeout(StreamCommand::Flush(ack_tx), self.timeout).is_err() {
            return false;
        }
        ack_rx.recv_timeout(self.timeout).is_ok()
    }

    /// Drain the queue and stop the worker thread. Idempotent.
    pub fn close(&self) {
        self.tx.lock().take();
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if self.done_rx.recv_timeout(self.timeout).is_err() {
            warn!("StreamHandler: worker thread did not shut down within {:?}", self.timeout);
            return;
        }
        if handle.join().is_err() {
            warn!("StreamHandler: worker thread panicked");
        }
    }
}

impl LogHandler for StreamHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        let Some(tx) = self.sender() else {
            return Err(HandlerError::Closed);
        };
        match tx.try_send(StreamCommand::Record(Box::new(record))) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.drops.record_drop();
                self.drops.warn_if_due(|count| {
                    warn!("StreamHandler: dropped {count} records because the queue was full");
                });
                Err(HandlerError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(HandlerError::Closed),
        }
    }

    fn flush(&self) -> bool {
        StreamHandler::flush(self)
    }

    fn close(&self) {
        StreamHandler::close(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for StreamHandler {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for StreamHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandler")
            .field("open", &self.tx.lock().is_some())
            .finish_non_exhaustive()
    }
}
