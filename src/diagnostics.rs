//! Last-resort diagnostic output.
//!
//! Delivery failures and handler errors cannot be logged through the pipeline
//! that produced them, so they are written as plain lines to standard error.
//! The [`Diagnostics`] seam lets tests capture those lines instead.

use std::io::{self, Write};

use parking_lot::Mutex;

/// Sink for human-readable diagnostic lines.
pub trait Diagnostics: Send + Sync {
    /// Report a single diagnostic line.
    fn report(&self, line: &str);
}

/// Writes each diagnostic line to the process's standard error stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrDiagnostics;

impl Diagnostics for StderrDiagnostics {
    fn report(&self, line: &str) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

/// Keeps diagnostic lines in memory.
#[derive(Debug, Default)]
pub struct CapturedDiagnostics {
    lines: Mutex<Vec<String>>,
}

impl CapturedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line reported so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Diagnostics for CapturedDiagnostics {
    fn report(&self, line: &str) {
        self.lines.lock().push(line.to_owned());
    }
}
