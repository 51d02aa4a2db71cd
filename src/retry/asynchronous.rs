//! Async flavour of the retry loop, sleeping with `tokio::time::sleep`.
//!
//! Same rules as the blocking loop: cancellation is polled only between
//! iterations, never while sleeping or while the operation's future runs.
//! `RetryEvent::elapsed` is measured on tokio's clock, so it follows a paused
//! or advanced test clock.

use std::future::Future;
use std::ops::ControlFlow;

use tokio::time::Instant;

use super::{classify, poll, single, CancelSignal, Never, Outcome, Retry, RetryError, RetryEvent};

impl Retry {
    /// Async version of [`run`](Retry::run).
    ///
    /// ```rust
    /// use persevere::{Outcome, Retry};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let retry = Retry::builder(3)
    ///     .wait(Duration::from_millis(1))
    ///     .unwrap()
    ///     .no_jitter()
    ///     .build();
    ///
    /// let result = retry
    ///     .run_async(|attempt| async move {
    ///         if attempt == 0 { Outcome::Transient("warming up") } else { Outcome::Success }
    ///     })
    ///     .await;
    ///
    /// assert!(result.is_ok());
    /// # });
    /// ```
    pub async fn run_async<E, F, Fut>(&self, op: F) -> Result<(), RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Outcome<E>>,
    {
        self.run_async_with_hooks(&Never, op, |_| {}).await
    }

    /// Async version of [`run_with_cancel`](Retry::run_with_cancel).
    pub async fn run_async_with_cancel<S, E, F, Fut>(
        &self,
        signal: &S,
        op: F,
    ) -> Result<(), RetryError<E>>
    where
        S: CancelSignal + ?Sized,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Outcome<E>>,
    {
        self.run_async_with_hooks(signal, op, |_| {}).await
    }

    /// Async version of [`run_with_hooks`](Retry::run_with_hooks).
    ///
    /// The hook is synchronous and runs before each sleep; use it for
    /// logging or metrics, not for blocking work.
    pub async fn run_async_with_hooks<S, E, F, Fut, H>(
        &self,
        signal: &S,
        mut op: F,
        mut on_retry: H,
    ) -> Result<(), RetryError<E>>
    where
        S: CancelSignal + ?Sized,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Outcome<E>>,
        H: FnMut(&RetryEvent<'_, E>),
    {
        if self.limit == 1 {
            poll(signal)?;
            return single(op(0).await);
        }

        let start = Instant::now();
        let mut backoff = self.start_backoff();
        let mut attempt = 0u32;

        while self.should_continue(attempt) {
            poll(signal)?;

            let error = match classify(op(attempt).await) {
                ControlFlow::Break(result) => return result,
                ControlFlow::Continue(error) => error,
            };

            attempt = attempt.saturating_add(1);
            let wait = backoff.current();
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, limit = self.limit, ?wait, "attempt failed, retrying");
            on_retry(&RetryEvent {
                attempt,
                error: &error,
                wait,
                elapsed: start.elapsed(),
            });

            tokio::time::sleep(wait).await;
            backoff.grow(attempt, self.jitter.as_deref());
        }

        Err(self.exhausted(attempt))
    }
}

/// Async version of [`retry`](super::retry): default engine, `limit` attempts.
pub async fn retry_async<E, F, Fut>(limit: u32, op: F) -> Result<(), RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Outcome<E>>,
{
    Retry::new(limit).run_async(op).await
}
