//! Shared error type for faults in the foundational substrate itself.
//!
//! [`CoreError`] is reserved for bugs in the interner or delay algebra — never
//! for placement-domain failures (unknown bel, type mismatch, and so on),
//! which live in `pnr_place::PlacerError` instead: a crate-wide error for
//! foundational bugs, kept separate from each stage's own domain error enum.

/// The result type for fallible operations in this crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// An internal error in the interner or delay algebra.
///
/// These should never occur during normal operation; seeing one means a
/// caller violated a documented precondition (for example, `initialize_add`
/// racing ahead of the interner's next free slot).
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct CoreError {
    /// Description of what went wrong.
    pub message: String,
}

impl CoreError {
    /// Creates a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for CoreError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
