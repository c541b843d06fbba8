//! Cooperative cancellation for long-running codec work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// A cloneable cancellation flag shared between the caller and a running
/// compress/decompress call.
///
/// Codec loops poll the token at coarse intervals; once [`cancel`](CancelToken::cancel)
/// has been called, the next poll aborts the operation with
/// [`Error::Cancelled`].
///
/// # Example
/// ```
/// use filepress::CancelToken;
///
/// let token = CancelToken::new();
/// assert!(token.check().is_ok());
/// token.cancel();
/// assert!(token.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the "not cancelled" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. All clones of this token observe the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Return `Err(Error::Cancelled)` if cancellation has been requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
