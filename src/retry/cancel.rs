//! Cooperative cancellation signals.
//!
//! A [`CancelSignal`] is polled by the engine at the top of every iteration,
//! before the operation is invoked. It is never observed mid-sleep or while
//! the operation is running.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Why a run was cancelled.
///
/// The engine hands this back unchanged: a signal's own reason (see
/// [`Cancelled::other`]) comes out of [`RetryError::Cancelled`] as is.
///
/// [`RetryError::Cancelled`]: crate::RetryError::Cancelled
///
/// ```rust
/// use persevere::Cancelled;
///
/// let reason = Cancelled::other(std::io::Error::other("shutting down"));
/// assert_eq!(reason.to_string(), "shutting down");
/// assert!(reason.downcast_ref::<std::io::Error>().is_some());
/// ```
#[derive(Debug, Clone)]
pub enum Cancelled {
    /// Cancellation was requested explicitly.
    Requested,
    /// A deadline passed.
    DeadlineExceeded,
    /// A reason supplied by the signal itself.
    Other(Arc<dyn Error + Send + Sync>),
}

impl Cancelled {
    /// Wrap a signal-specific reason.
    pub fn other<R>(reason: R) -> Self
    where
        R: Error + Send + Sync + 'static,
    {
        Self::Other(Arc::new(reason))
    }

    /// The signal-specific reason, if it is an `R`.
    pub fn downcast_ref<R>(&self) -> Option<&R>
    where
        R: Error + 'static,
    {
        match self {
            Self::Other(reason) => reason.downcast_ref::<R>(),
            _ => None,
        }
    }
}

/// `Other` reasons are equal only when they share the same allocation.
impl PartialEq for Cancelled {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Requested, Self::Requested) => true,
            (Self::DeadlineExceeded, Self::DeadlineExceeded) => true,
            (Self::Other(a), Self::Other(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Cancelled {}

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "operation cancelled"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
            Self::Other(reason) => write!(f, "{}", reason),
        }
    }
}

impl Error for Cancelled {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Other(reason) => Some(reason.as_ref()),
            _ => None,
        }
    }
}

/// Something the retry loop can poll for cancellation.
///
/// # Examples
///
/// ```rust
/// use persevere::{CancelSignal, CancelToken, Cancelled};
///
/// let token = CancelToken::new();
/// assert_eq!(token.check(), Ok(()));
///
/// token.cancel();
/// assert_eq!(token.check(), Err(Cancelled::Requested));
/// ```
pub trait CancelSignal {
    /// Returns the cancellation reason once the signal has fired.
    fn check(&self) -> Result<(), Cancelled>;
}

/// A signal that never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Never;

impl CancelSignal for Never {
    fn check(&self) -> Result<(), Cancelled> {
        Ok(())
    }
}

/// Handle for explicit cancellation.
///
/// A thin wrapper over [`tokio_util::sync::CancellationToken`]: clones share
/// the same state, so one clone can be handed to the retrying code and
/// another kept by whoever decides to stop it. Converts to and from the
/// tokio token, which also implements [`CancelSignal`] directly.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: CancellationToken,
}

impl CancelToken {
    /// Create a token that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone
    /// or on a parent token.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// A token that fires when this one does, but can also be cancelled on
    /// its own without affecting the parent.
    pub fn child_token(&self) -> Self {
        Self {
            inner: self.inner.child_token(),
        }
    }

    /// The underlying tokio token.
    pub fn as_tokio(&self) -> &CancellationToken {
        &self.inner
    }
}

impl From<CancellationToken> for CancelToken {
    fn from(inner: CancellationToken) -> Self {
        Self { inner }
    }
}

impl From<CancelToken> for CancellationToken {
    fn from(token: CancelToken) -> Self {
        token.inner
    }
}

impl CancelSignal for CancelToken {
    fn check(&self) -> Result<(), Cancelled> {
        self.inner.check()
    }
}

impl CancelSignal for CancellationToken {
    fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled::Requested)
        } else {
            Ok(())
        }
    }
}

// Roughly a century, used when a timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Fires once a point in time has passed.
///
/// ```rust
/// use persevere::{CancelSignal, Cancelled, Deadline};
/// use std::time::Duration;
///
/// assert_eq!(Deadline::after(Duration::ZERO).check(), Err(Cancelled::DeadlineExceeded));
/// assert_eq!(Deadline::after(Duration::from_secs(60)).check(), Ok(()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline at a fixed instant.
    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            at: now
                .checked_add(timeout)
                .or_else(|| now.checked_add(FAR_FUTURE))
                .unwrap_or(now),
        }
    }

    /// The instant after which the signal fires.
    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Time left until the deadline, zero once passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

impl CancelSignal for Deadline {
    fn check(&self) -> Result<(), Cancelled> {
        if Instant::now() >= self.at {
            Err(Cancelled::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

/// Signal backed by a closure, see [`from_fn`].
#[derive(Clone)]
pub struct FnSignal<F> {
    f: F,
}

impl<F> fmt::Debug for FnSignal<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSignal").finish_non_exhaustive()
    }
}

/// Adapt a closure into a [`CancelSignal`].
///
/// ```rust
/// use persevere::cancel::{self, CancelSignal};
/// use persevere::Cancelled;
///
/// let signal = cancel::from_fn(|| Err(Cancelled::Requested));
/// assert!(signal.check().is_err());
/// ```
pub fn from_fn<F>(f: F) -> FnSignal<F>
where
    F: Fn() -> Result<(), Cancelled>,
{
    FnSignal { f }
}

impl<F> CancelSignal for FnSignal<F>
where
    F: Fn() -> Result<(), Cancelled>,
{
    fn check(&self) -> Result<(), Cancelled> {
        (self.f)()
    }
}

/// Fires when either signal fires; the first one's reason wins.
impl<A: CancelSignal, B: CancelSignal> CancelSignal for (A, B) {
    fn check(&self) -> Result<(), Cancelled> {
        self.0.check()?;
        self.1.check()
    }
}

impl<S: CancelSignal + ?Sized> CancelSignal for Box<S> {
    fn check(&self) -> Result<(), Cancelled> {
        (**self).check()
    }
}

impl<S: CancelSignal + ?Sized> CancelSignal for Arc<S> {
    fn check(&self) -> Result<(), Cancelled> {
        (**self).check()
    }
}
