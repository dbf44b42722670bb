//! Cooperative cancellation for an in-progress parse.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheaply cloneable flag checked by the parser state machine at its
/// suspension points (awaiting the next chunk, awaiting the next part).
///
/// Tripping the signal does not interrupt a poll already in progress; it
/// takes effect the next time the machine would otherwise wait for more
/// input, driving it to [`crate::MultipartError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    /// Creates a signal that has not yet been tripped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of any parser sharing this signal.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` if [`AbortSignal::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
