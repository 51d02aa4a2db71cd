//! Error types for retry operations.

use std::fmt;
use std::time::Duration;

use super::cancel::Cancelled;

/// Terminal error of a retry run.
///
/// Exactly one of these (or success) is produced per run. Transient failures
/// never show up here for a multi-attempt run: they are recovered by retrying.
///
/// # Examples
///
/// ```rust
/// use persevere::{Outcome, Retry, RetryError};
/// use std::time::Duration;
///
/// let retry = Retry::builder(3)
///     .wait(Duration::from_millis(1))
///     .unwrap()
///     .no_jitter()
///     .build();
///
/// let result = retry.run(|_| Outcome::<&str>::Transient("busy"));
/// assert_eq!(result, Err(RetryError::AttemptsExhausted { attempts: 3 }));
///
/// let result = retry.run(|_| Outcome::Abort("disk full"));
/// assert_eq!(result.unwrap_err().into_cause(), Some("disk full"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The attempt limit was reached without success.
    AttemptsExhausted {
        /// Number of attempts made.
        attempts: u32,
    },
    /// The operation asked not to be retried; carries its own error.
    Aborted(E),
    /// A single-attempt run (`limit == 1`) failed; carries the operation's error.
    Failed(E),
    /// The cancellation signal fired before an attempt.
    Cancelled(Cancelled),
    /// The engine could not be built from the supplied configuration.
    InvalidConfiguration(ConfigError),
}

impl<E> RetryError<E> {
    /// Extract the operation's own error, if this error carries one.
    pub fn into_cause(self) -> Option<E> {
        match self {
            Self::Aborted(e) | Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Get a reference to the operation's own error, if present.
    pub fn cause(&self) -> Option<&E> {
        match self {
            Self::Aborted(e) | Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if the attempt limit was reached.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::AttemptsExhausted { .. })
    }

    /// Returns true if the operation aborted.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Returns true if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Number of attempts made, when the limit was exhausted.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::AttemptsExhausted { attempts } => Some(*attempts),
            _ => None,
        }
    }

    /// Transform the operation error type.
    pub fn map_cause<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::AttemptsExhausted { attempts } => RetryError::AttemptsExhausted { attempts },
            Self::Aborted(e) => RetryError::Aborted(f(e)),
            Self::Failed(e) => RetryError::Failed(f(e)),
            Self::Cancelled(c) => RetryError::Cancelled(c),
            Self::InvalidConfiguration(c) => RetryError::InvalidConfiguration(c),
        }
    }
}

impl<E> From<Cancelled> for RetryError<E> {
    fn from(reason: Cancelled) -> Self {
        Self::Cancelled(reason)
    }
}

impl<E> From<ConfigError> for RetryError<E> {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfiguration(err)
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttemptsExhausted { attempts } => {
                write!(f, "max attempts reached ({} attempts)", attempts)
            }
            // The cause is surfaced as-is.
            Self::Aborted(e) | Self::Failed(e) => write!(f, "{}", e),
            Self::Cancelled(reason) => write!(f, "{}", reason),
            Self::InvalidConfiguration(err) => write!(f, "{}", err),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Aborted(e) | Self::Failed(e) => Some(e),
            Self::Cancelled(reason) => Some(reason),
            Self::InvalidConfiguration(err) => Some(err),
            Self::AttemptsExhausted { .. } => None,
        }
    }
}

/// Error returned when a retry configuration is rejected.
///
/// # Examples
///
/// ```rust
/// use persevere::{ConfigError, Retry};
/// use std::time::Duration;
///
/// let err = Retry::builder(3).wait(Duration::ZERO).unwrap_err();
/// assert_eq!(
///     err,
///     ConfigError::InvalidDuration { field: "wait", value: Duration::ZERO }
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration setting was not strictly positive.
    InvalidDuration {
        /// Name of the rejected setting.
        field: &'static str,
        /// The rejected value.
        value: Duration,
    },
}

impl ConfigError {
    /// Reject `value` for `field` unless it is strictly positive.
    pub(crate) fn check_positive(field: &'static str, value: Duration) -> Result<Duration, Self> {
        if value.is_zero() {
            Err(Self::InvalidDuration { field, value })
        } else {
            Ok(value)
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDuration { field, value } => {
                write!(f, "invalid duration for {}: {:?} (must be positive)", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_exhausted_display() {
        let err: RetryError<String> = RetryError::AttemptsExhausted { attempts: 3 };
        let display = format!("{}", err);
        assert!(display.contains("max attempts reached"));
        assert!(display.contains("3 attempts"));
    }

    #[test]
    fn test_aborted_display_is_the_cause() {
        let err = RetryError::Aborted("disk full");
        assert_eq!(format!("{}", err), "disk full");
    }

    #[test]
    fn test_into_cause() {
        assert_eq!(RetryError::Aborted("a").into_cause(), Some("a"));
        assert_eq!(RetryError::Failed("b").into_cause(), Some("b"));
        assert_eq!(
            RetryError::<&str>::AttemptsExhausted { attempts: 2 }.into_cause(),
            None
        );
        assert_eq!(
            RetryError::<&str>::Cancelled(Cancelled::Requested).into_cause(),
            None
        );
    }

    #[test]
    fn test_predicates() {
        let exhausted: RetryError<()> = RetryError::AttemptsExhausted { attempts: 5 };
        assert!(exhausted.is_exhausted());
        assert_eq!(exhausted.attempts(), Some(5));
        assert!(!exhausted.is_aborted());

        let cancelled: RetryError<()> = Cancelled::DeadlineExceeded.into();
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.attempts(), None);
    }

    #[test]
    fn test_map_cause() {
        let err = RetryError::Aborted(7).map_cause(|n| n * 6);
        assert_eq!(err, RetryError::Aborted(42));

        let err: RetryError<String> =
            RetryError::<i32>::AttemptsExhausted { attempts: 1 }.map_cause(|n| n.to_string());
        assert_eq!(err, RetryError::AttemptsExhausted { attempts: 1 });
    }

    #[test]
    fn test_source_exposes_cause() {
        use std::error::Error;

        let io = std::io::Error::other("boom");
        let err = RetryError::Aborted(io);
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));

        let exhausted: RetryError<std::io::Error> = RetryError::AttemptsExhausted { attempts: 1 };
        assert!(exhausted.source().is_none());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidDuration {
            field: "backoff",
            value: Duration::ZERO,
        };
        let display = format!("{}", err);
        assert!(display.contains("backoff"));
        assert!(display.contains("must be positive"));
    }

    #[test]
    fn test_check_positive() {
        assert!(ConfigError::check_positive("wait", Duration::ZERO).is_err());
        assert_eq!(
            ConfigError::check_positive("wait", Duration::from_nanos(1)),
            Ok(Duration::from_nanos(1))
        );
    }
}
