//! Progress and diagnostic accumulation for the placement engine.
//!
//! The core has no source text to attach spans to (that lives upstream, in
//! the out-of-scope netlist parser), so this is deliberately small: severities
//! and free-form messages, no codes, labels, or suggested fixes. §5 asks
//! long-running
//! phases to "periodically emit progress... for operator visibility"; this
//! is the channel that carries it. `pnr_cli` is the only consumer that ever
//! prints — everything in `pnr_place` just calls [`DiagnosticSink::emit`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Severity of a single accumulated note.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Severity {
    /// Routine progress ("placed 12/40").
    Info,
    /// A recoverable problem, typically because `force` downgraded a fatal
    /// error per §7.
    Warning,
    /// A fatal condition was raised (the sink still records it even though
    /// the caller also returns an `Err`, so CLIs can render a consistent log).
    Error,
}

/// One accumulated message.
#[derive(Clone, Debug)]
pub struct Note {
    /// The note's severity.
    pub severity: Severity,
    /// The message text.
    pub message: String,
}

/// A thread-unsafe-by-contract (single-threaded cooperative engine, §5)
/// accumulator for progress and error notes.
///
/// Uses interior mutability (`Mutex`) purely so it can be held by shared
/// reference through the placement call chain without threading `&mut`
/// through every phase function, not because the engine is actually
/// multi-threaded.
pub struct DiagnosticSink {
    notes: Mutex<Vec<Note>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new, empty sink.
    pub fn new() -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Records a note at [`Severity::Info`].
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message);
    }

    /// Records a note at [`Severity::Warning`] — used when `force` downgrades
    /// an error per §7.
    pub fn warn(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message);
    }

    /// Records a note at [`Severity::Error`].
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message);
    }

    fn emit(&self, severity: Severity, message: impl Into<String>) {
        if severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.notes.lock().unwrap().push(Note {
            severity,
            message: message.into(),
        });
    }

    /// Returns `true` if any error-severity note has been recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns a snapshot of all notes recorded so far.
    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
