//! # Persevere
//!
//! > *"Try, try again"*
//!
//! Retry an operation that may fail transiently, waiting between attempts
//! with an exponentially growing, jittered delay, until it succeeds, runs out
//! of attempts, aborts, or is cancelled.
//!
//! ## Quick Example
//!
//! ```rust
//! use persevere::{IntoOutcome, Outcome, Retry, RetryError};
//! use std::time::Duration;
//!
//! #[derive(Debug, PartialEq)]
//! enum FetchError {
//!     Timeout,
//!     NotFound,
//! }
//!
//! fn fetch(attempt: u32) -> Result<(), FetchError> {
//!     if attempt < 2 { Err(FetchError::Timeout) } else { Err(FetchError::NotFound) }
//! }
//!
//! let retry = Retry::builder(5)
//!     .wait(Duration::from_millis(1))
//!     .unwrap()
//!     .no_jitter()
//!     .build();
//!
//! // Timeouts are retried, a missing resource is not.
//! let result = retry.run(|attempt| fetch(attempt).abort_when(|e| *e == FetchError::NotFound));
//! assert_eq!(result, Err(RetryError::Aborted(FetchError::NotFound)));
//! ```
//!
//! See the [`retry`](mod@retry) module for the loop rules.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod retry;

// Re-exports
pub use retry::cancel;
pub use retry::jitter;
pub use retry::{
    forever, retry, retry_with_cancel, retry_with_config, Backoff, CancelSignal, CancelToken,
    Cancelled, ConfigError, Deadline, IntoOutcome, Jitter, Never, Outcome, Retry, RetryBuilder,
    RetryConfig, RetryError, RetryEvent, DEFAULT_BACKOFF, DEFAULT_WAIT,
};

#[cfg(feature = "async")]
pub use retry::retry_async;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::retry::{
        CancelSignal, CancelToken, IntoOutcome, Outcome, Retry, RetryConfig, RetryError,
    };
}
