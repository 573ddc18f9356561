//! Cancellation and deadlines for node operations.
//!
//! - `CancelSource`: owned by whoever may abort a call (the transport)
//! - `CancelToken`: cheap cloneable view handed to the call
//! - `CallContext`: token plus optional deadline, passed to every node operation
//!
//! Remote fetches run through [`CallContext::run`], which abandons the fetch as
//! soon as the token fires or the deadline passes. The caller then gets
//! `Cancelled` (or a `Timeout`), never a half-built node.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::error::{ClusterError, NodeError};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Controller that can trigger cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancelSource {
    state: Arc<CancelState>,
}

impl CancelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            state: Some(self.state.clone()),
        }
    }

    /// Cancel every token handed out by this source. Idempotent.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}

/// Handle checked by cancellable operations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Option<Arc<CancelState>>,
}

impl CancelToken {
    /// A token that never fires.
    pub fn none() -> Self {
        CancelToken { state: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.cancelled.load(Ordering::SeqCst))
    }

    /// Resolves once the token is cancelled; pends forever for [`CancelToken::none`].
    pub async fn cancelled(&self) {
        let Some(state) = &self.state else {
            return std::future::pending().await;
        };
        loop {
            // Register before checking the flag so a concurrent cancel is not missed
            let notified = state.notify.notified();
            if state.cancelled.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

/// Per-call context: cancellation plus an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Context with no cancellation and no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancelToken) -> Self {
        CallContext {
            cancel,
            deadline: None,
        }
    }

    /// Bound the call to `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail fast when the call has already been cancelled.
    pub fn check(&self) -> Result<(), NodeError> {
        if self.cancel.is_cancelled() {
            return Err(NodeError::Cancelled);
        }
        Ok(())
    }

    /// Run a remote fetch, racing it against cancellation and the deadline.
    pub async fn run<F, T>(&self, operation: &str, fetch: F) -> Result<T, NodeError>
    where
        F: Future<Output = Result<T, ClusterError>>,
    {
        self.check()?;

        let deadline = self.deadline;
        let expiry = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(operation, "remote fetch cancelled");
                Err(NodeError::Cancelled)
            }
            _ = expiry => {
                tracing::debug!(operation, "remote fetch hit deadline");
                Err(NodeError::Remote(ClusterError::Timeout {
                    operation: operation.to_string(),
                }))
            }
            result = fetch => result.map_err(NodeError::from),
        }
    }
}
