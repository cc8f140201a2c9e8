//! Request-scoped cancellation and deadlines.
//!
//! Every retrieval runs under a [`RequestContext`] supplied by the caller.
//! Backend calls derive a child scope from it with their own budget, so a
//! single page can time out without the caller's deadline being touched, and
//! cancelling the caller's token stops every scope derived from it.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::SourceError;

/// Cancellation token plus optional deadline for one retrieval.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Creates a context with no deadline and a fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context bound to an existing cancellation token.
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            deadline: None,
        }
    }

    /// Sets a deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// The token observed by this context.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The deadline of this context, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancels this context and every scope derived from it.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Returns true once the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Derives a child scope limited to `budget`.
    ///
    /// The child deadline is the earlier of the parent deadline and
    /// `now + budget`. Cancelling the parent cancels the child, not the
    /// other way round.
    pub fn child(&self, budget: Duration) -> ScopedContext {
        let budget_deadline = Instant::now() + budget;
        let deadline = match self.deadline {
            Some(parent) => parent.min(budget_deadline),
            None => budget_deadline,
        };
        let cancellation = self.cancellation.child_token();
        ScopedContext {
            guard: cancellation.clone().drop_guard(),
            context: RequestContext {
                cancellation,
                deadline: Some(deadline),
            },
        }
    }

    /// Runs `future` until it completes, the context is cancelled or the
    /// deadline passes, whichever comes first.
    ///
    /// Cancellation is checked before the future is polled.
    pub async fn run<T, F>(&self, future: F) -> Result<T, SourceError>
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, future).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::DeadlineExceeded),
                },
                None => future.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(SourceError::Cancelled),
            result = bounded => result,
        }
    }
}

/// A child context that is cancelled when dropped.
///
/// Holding the scope for the lifetime of a page guarantees its token is
/// released on every exit path, including early returns and panics.
#[derive(Debug)]
pub struct ScopedContext {
    context: RequestContext,
    guard: DropGuard,
}

impl ScopedContext {
    /// The context to run scoped work under.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Releases the scope now instead of at drop.
    pub fn release(self) {
        drop(self.guard);
    }
}
