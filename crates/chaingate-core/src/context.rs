//! Per-request cancellation and deadline, handed down to transports unchanged.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::GatewayError;

/// Cancellation signal and optional deadline for one request.
///
/// Cloning is cheap; every clone observes the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels the [`RequestContext`] it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    /// No deadline, never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set a deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Attach a fresh cancellation signal, replacing any previous one.
    pub fn with_cancellation(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once the request is cancelled. Pending forever otherwise.
    pub async fn cancelled(&self) {
        if let Some(mut rx) = self.cancel.clone() {
            let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
            if !closed {
                return;
            }
        }
        std::future::pending::<()>().await
    }

    /// Drive `fut` until it completes, the request is cancelled, or the
    /// deadline passes.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        if self.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }
        // The timer rounds up to the next tick, so an expired deadline may not
        // fire on the first poll.
        if self.remaining() == Some(Duration::ZERO) {
            return Err(GatewayError::DeadlineExceeded);
        }

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(GatewayError::Cancelled),
            _ = deadline => Err(GatewayError::DeadlineExceeded),
            result = fut => result,
        }
    }
}
