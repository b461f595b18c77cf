//! Cancellation utilities
//!
//! A [`CancelHandle`] can be attached to any capability call. Cancelling it
//! resolves the wrapped call with [`ServiceError::Cancelled`] and drops the
//! in-flight request, which closes the underlying HTTP connection.

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, ServiceError};

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation of every call observing this handle.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Drive `future` to completion unless this handle is cancelled first.
    ///
    /// ```rust,ignore
    /// let cancel = CancelHandle::new();
    /// let call = cancel.run(service.generate_image("a red fox", ImageGenerateOptions::default()));
    /// ```
    pub async fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!("Capability call cancelled");
                Err(ServiceError::Cancelled)
            }
            res = future => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completed_future_passes_through() {
        let handle = CancelHandle::new();
        let value = handle.run(async { Ok::<_, ServiceError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_future() {
        let handle = CancelHandle::new();
        let canceller = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = handle
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ServiceError>(())
            })
            .await;
        assert!(matches!(result, Err(ServiceError::Cancelled)));
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_handle_never_polls() {
        let handle = CancelHandle::new();
        handle.cancel();
        let result: Result<()> = handle
            .run(async { unreachable!("future should not be polled") })
            .await;
        assert!(matches!(result, Err(ServiceError::Cancelled)));
    }
}
