//! Cooperative per-job cancellation.
//!
//! A [`CancelToken`] is a one-way signal: once set it never resets. Stages
//! poll it at safe checkpoints (before starting, after each discrete unit of
//! work) so a cancelled job stops within one unit of whatever it was doing.
//! Blocking calls that cannot be interrupted are awaited and their result
//! discarded on the cancellation path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;

/// Marker error returned by [`CancelToken::checkpoint`] when the token is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// One-way cooperative stop signal scoped to a single job.
///
/// Cheaply cloneable; the job owns it, every stage invocation borrows it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelToken {
    /// Create a new, unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token. Idempotent and safe from any concurrent context.
    ///
    /// Returns `true` if this call transitioned the token from unset to set.
    pub fn cancel(&self) -> bool {
        let flipped = !self.cancelled.swap(true, Ordering::SeqCst);
        if flipped {
            self.notify.notify_waiters();
        }
        flipped
    }

    /// Non-blocking read; safe to poll frequently.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` if the token is set.
    ///
    /// Stages call this at every safe boundary and bail with `?`.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once the token is set. Pair with `select!` to abandon a
    /// wait (queue admission, a sleep) the moment cancellation lands.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            // Register before re-checking so a concurrent cancel between
            // the check and the await cannot be missed.
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
