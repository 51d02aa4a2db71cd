//! Retry with exponential backoff.
//!
//! The engine follows the "pure core, imperative shell" split used across
//! this crate:
//!
//! - **Pure Core**: [`Backoff`] computes waits, [`Outcome`] classifies attempts,
//!   [`RetryConfig`] is just data
//! - **Imperative Shell**: [`Retry`] runs the loop, sleeps and polls cancellation
//!
//! # Quick Start
//!
//! ```rust
//! use persevere::{Outcome, Retry};
//! use std::time::Duration;
//!
//! let retry = Retry::builder(3)
//!     .wait(Duration::from_millis(1))
//!     .unwrap()
//!     .no_jitter()
//!     .build();
//!
//! let mut calls = 0;
//! let result = retry.run(|attempt| {
//!     calls += 1;
//!     if attempt < 2 {
//!         Outcome::Transient("not yet")
//!     } else {
//!         Outcome::Success
//!     }
//! });
//!
//! assert!(result.is_ok());
//! assert_eq!(calls, 3);
//! ```
//!
//! # Loop
//!
//! One iteration is one attempt:
//!
//! 1. Poll the cancellation signal; if it fired, return [`RetryError::Cancelled`]
//! 2. Call the operation with the attempt index (starting at 0)
//! 3. [`Outcome::Success`] or [`Outcome::NoOp`] ends the run successfully,
//!    [`Outcome::Abort`] ends it with [`RetryError::Aborted`]
//! 4. On [`Outcome::Transient`], count the attempt, sleep for the current wait
//!    and grow the wait (see [`Backoff`])
//!
//! The loop continues while `limit == 0` or fewer than `limit` attempts were
//! made, then reports [`RetryError::AttemptsExhausted`]. The attempt that
//! reaches the limit still sleeps before exhaustion is reported.
//!
//! A limit of exactly 1 means "try once": no sleep, and a transient failure
//! comes back as [`RetryError::Failed`] carrying the operation's error.
//!
//! # Cancellation
//!
//! Cancellation is cooperative. The signal is polled only at the top of each
//! iteration, never during a sleep or while the operation runs.
//!
//! # Features
//!
//! - `jitter` (default): random default jitter via `rand`
//! - `tracing` (default): debug events per retry, a warning on exhaustion
//! - `async`: `run_async*` and [`retry_async`] on top of `tokio::time`
//! - `serde`: `Serialize`/`Deserialize` for [`RetryConfig`]

mod backoff;
pub mod cancel;
mod config;
mod error;
pub mod jitter;
mod outcome;

#[cfg(feature = "async")]
mod asynchronous;

pub use backoff::Backoff;
pub use cancel::{CancelSignal, CancelToken, Cancelled, Deadline, Never};
pub use config::{RetryBuilder, RetryConfig, DEFAULT_BACKOFF, DEFAULT_WAIT};
pub use error::{ConfigError, RetryError};
pub use jitter::{Jitter, SharedJitter};
pub use outcome::{IntoOutcome, Outcome};

#[cfg(feature = "async")]
pub use asynchronous::retry_async;

use std::fmt;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// A configured retry engine.
///
/// Holds only configuration; the attempt counter and current wait live in
/// each call, so one engine can be shared by concurrent callers.
///
/// Build one with [`Retry::new`], [`Retry::builder`] or
/// [`Retry::from_config`].
#[derive(Clone)]
pub struct Retry {
    limit: u32,
    wait: Duration,
    backoff: Duration,
    jitter: Option<SharedJitter>,
}

/// Information about a failed attempt, passed to retry hooks before the
/// engine sleeps.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Attempts made so far (1-indexed).
    pub attempt: u32,
    /// The transient error of the attempt that just failed.
    pub error: &'a E,
    /// How long the engine is about to sleep.
    pub wait: Duration,
    /// Time since the first attempt started.
    pub elapsed: Duration,
}

impl Retry {
    /// Maximum number of attempts, `0` for no limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Base delay.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Ceiling above which the wait stops growing.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Returns true if a jitter source is configured.
    pub fn has_jitter(&self) -> bool {
        self.jitter.is_some()
    }

    /// Fresh backoff state for one run.
    pub fn start_backoff(&self) -> Backoff {
        Backoff::new(self.wait, self.backoff)
    }

    /// Run `op` until it succeeds, aborts or runs out of attempts.
    ///
    /// ```rust
    /// use persevere::{Outcome, Retry, RetryError};
    ///
    /// let retry = Retry::new(0);
    /// let result = retry.run(|_| Outcome::Abort("disk full"));
    /// assert_eq!(result, Err(RetryError::Aborted("disk full")));
    /// ```
    pub fn run<E, F>(&self, op: F) -> Result<(), RetryError<E>>
    where
        F: FnMut(u32) -> Outcome<E>,
    {
        self.run_with_hooks(&Never, op, |_| {})
    }

    /// Like [`run`](Self::run), polling `signal` before every attempt.
    ///
    /// ```rust
    /// use persevere::{CancelToken, Cancelled, Outcome, Retry, RetryError};
    ///
    /// let token = CancelToken::new();
    /// token.cancel();
    ///
    /// let result = Retry::new(5).run_with_cancel(&token, |_| Outcome::<()>::Success);
    /// assert_eq!(result, Err(RetryError::Cancelled(Cancelled::Requested)));
    /// ```
    pub fn run_with_cancel<S, E, F>(&self, signal: &S, op: F) -> Result<(), RetryError<E>>
    where
        S: CancelSignal + ?Sized,
        F: FnMut(u32) -> Outcome<E>,
    {
        self.run_with_hooks(signal, op, |_| {})
    }

    /// Run an operation that may be absent. `None` succeeds without doing
    /// anything.
    pub fn run_optional<E, F>(&self, op: Option<F>) -> Result<(), RetryError<E>>
    where
        F: FnMut(u32) -> Outcome<E>,
    {
        self.run_optional_with_cancel(&Never, op)
    }

    /// Like [`run_optional`](Self::run_optional), polling `signal` before
    /// every attempt. `None` succeeds immediately, even if `signal` has
    /// already fired.
    ///
    /// ```rust
    /// use persevere::{CancelToken, Outcome, Retry};
    ///
    /// let token = CancelToken::new();
    /// token.cancel();
    ///
    /// let op: Option<fn(u32) -> Outcome<()>> = None;
    /// assert_eq!(Retry::new(3).run_optional_with_cancel(&token, op), Ok(()));
    /// ```
    pub fn run_optional_with_cancel<S, E, F>(
        &self,
        signal: &S,
        op: Option<F>,
    ) -> Result<(), RetryError<E>>
    where
        S: CancelSignal + ?Sized,
        F: FnMut(u32) -> Outcome<E>,
    {
        match op {
            Some(op) => self.run_with_cancel(signal, op),
            None => Ok(()),
        }
    }

    /// Full form of the loop: cancellation plus a hook called before every
    /// sleep.
    ///
    /// ```rust
    /// use persevere::{Never, Outcome, Retry};
    /// use std::time::Duration;
    ///
    /// let retry = Retry::builder(3)
    ///     .wait(Duration::from_millis(1))
    ///     .unwrap()
    ///     .no_jitter()
    ///     .build();
    ///
    /// let mut waits = Vec::new();
    /// let result = retry.run_with_hooks(
    ///     &Never,
    ///     |attempt| if attempt < 2 { Outcome::Transient(()) } else { Outcome::Success },
    ///     |event| waits.push(event.wait),
    /// );
    ///
    /// assert!(result.is_ok());
    /// assert_eq!(waits, vec![Duration::from_millis(1), Duration::from_millis(2)]);
    /// ```
    pub fn run_with_hooks<S, E, F, H>(
        &self,
        signal: &S,
        mut op: F,
        mut on_retry: H,
    ) -> Result<(), RetryError<E>>
    where
        S: CancelSignal + ?Sized,
        F: FnMut(u32) -> Outcome<E>,
        H: FnMut(&RetryEvent<'_, E>),
    {
        if self.limit == 1 {
            poll(signal)?;
            return single(op(0));
        }

        let start = Instant::now();
        let mut backoff = self.start_backoff();
        let mut attempt = 0u32;

        while self.should_continue(attempt) {
            poll(signal)?;

            let error = match classify(op(attempt)) {
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

            std::thread::sleep(wait);
            backoff.grow(attempt, self.jitter.as_deref());
        }

        Err(self.exhausted(attempt))
    }

    fn should_continue(&self, attempt: u32) -> bool {
        self.limit == 0 || attempt < self.limit
    }

    fn exhausted<E>(&self, attempts: u32) -> RetryError<E> {
        #[cfg(feature = "tracing")]
        tracing::warn!(attempts, "max attempts reached");
        RetryError::AttemptsExhausted { attempts }
    }
}

impl fmt::Debug for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("limit", &self.limit)
            .field("wait", &self.wait)
            .field("backoff", &self.backoff)
            .field("jitter", &self.jitter.is_some())
            .finish()
    }
}

fn poll<S>(signal: &S) -> Result<(), Cancelled>
where
    S: CancelSignal + ?Sized,
{
    signal.check().inspect_err(|reason| {
        #[cfg(feature = "tracing")]
        tracing::debug!(%reason, "retry cancelled");
        #[cfg(not(feature = "tracing"))]
        let _ = reason;
    })
}

/// Break with the final result, or continue with the transient error.
fn classify<E>(outcome: Outcome<E>) -> ControlFlow<Result<(), RetryError<E>>, E> {
    match outcome {
        Outcome::Success | Outcome::NoOp => ControlFlow::Break(Ok(())),
        Outcome::Abort(cause) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("operation aborted");
            ControlFlow::Break(Err(RetryError::Aborted(cause)))
        }
        Outcome::Transient(error) => ControlFlow::Continue(error),
    }
}

/// Result of a single-attempt run: the outcome passes straight through.
fn single<E>(outcome: Outcome<E>) -> Result<(), RetryError<E>> {
    match classify(outcome) {
        ControlFlow::Break(result) => result,
        ControlFlow::Continue(error) => Err(RetryError::Failed(error)),
    }
}

/// Run `op` with a default engine allowing `limit` attempts.
///
/// ```rust
/// use persevere::{retry, Outcome};
///
/// assert!(retry(1, |_| Outcome::<()>::NoOp).is_ok());
/// ```
pub fn retry<E, F>(limit: u32, op: F) -> Result<(), RetryError<E>>
where
    F: FnMut(u32) -> Outcome<E>,
{
    Retry::new(limit).run(op)
}

/// Run `op` with a default engine until it succeeds or aborts.
pub fn forever<E, F>(op: F) -> Result<(), RetryError<E>>
where
    F: FnMut(u32) -> Outcome<E>,
{
    retry(0, op)
}

/// Run `op` with a default engine, polling `signal` before every attempt.
pub fn retry_with_cancel<S, E, F>(signal: &S, limit: u32, op: F) -> Result<(), RetryError<E>>
where
    S: CancelSignal + ?Sized,
    F: FnMut(u32) -> Outcome<E>,
{
    Retry::new(limit).run_with_cancel(signal, op)
}

/// Build an engine from `config` and run `op`.
///
/// An invalid configuration is reported as
/// [`RetryError::InvalidConfiguration`] before `op` is ever called.
pub fn retry_with_config<E, F>(config: &RetryConfig, op: F) -> Result<(), RetryError<E>>
where
    F: FnMut(u32) -> Outcome<E>,
{
    Retry::from_config(config)?.run(op)
}
