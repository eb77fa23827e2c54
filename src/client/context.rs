//! Per-client request context: deadline and cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::errors::{InfoSightError, InfoSightResult};

/// Deadline and cancellation applied to every exchange a client performs,
/// including token acquisition.
///
/// Clones share the cancellation state, so a caller can keep a clone and
/// cancel in-flight and future requests of the client that owns the other.
#[derive(Debug, Clone)]
pub struct RequestContext {
    timeout: Option<Duration>,
    cancelled: Arc<watch::Sender<bool>>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            timeout: None,
            cancelled: Arc::new(cancelled),
        }
    }

    /// Sets the deadline for each request, measured from when it starts.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the per-request deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Cancels the context. Pending and future requests fail with
    /// [`InfoSightError::Cancelled`].
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Runs `fut` under this context.
    pub(crate) async fn run<F, T>(&self, fut: F) -> InfoSightResult<T>
    where
        F: Future<Output = InfoSightResult<T>>,
    {
        if self.is_cancelled() {
            return Err(InfoSightError::Cancelled);
        }

        let mut cancelled = self.cancelled.subscribe();
        let on_cancel = async move {
            loop {
                if *cancelled.borrow_and_update() {
                    return;
                }
                if cancelled.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };
        let guarded = async {
            tokio::select! {
                result = fut => result,
                () = on_cancel => Err(InfoSightError::Cancelled),
            }
        };

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, guarded)
                .await
                .unwrap_or(Err(InfoSightError::Timeout)),
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let context = RequestContext::background();
        let result = context.run(async { Ok::<_, InfoSightError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_timeout_elapses() {
        let context = RequestContext::background().with_timeout(Duration::from_millis(10));
        let result = context
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, InfoSightError>(())
            })
            .await;
        assert!(matches!(result, Err(InfoSightError::Timeout)));
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let context = RequestContext::background();
        context.cancel();
        assert!(context.is_cancelled());

        let result = context.run(async { Ok::<_, InfoSightError>(()) }).await;
        assert!(matches!(result, Err(InfoSightError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_in_flight_through_clone() {
        let context = RequestContext::background();
        let handle = context.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        let result = context
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, InfoSightError>(())
            })
            .await;
        assert!(matches!(result, Err(InfoSightError::Cancelled)));
    }
}
