//! The result of a single attempt.

/// What one invocation of the operation reports back to the engine.
///
/// # Examples
///
/// ```rust
/// use persevere::Outcome;
///
/// fn fetch(attempt: u32) -> Outcome<String> {
///     match attempt {
///         0 => Outcome::Transient("connection reset".to_string()),
///         _ => Outcome::Success,
///     }
/// }
///
/// assert!(fetch(0).is_transient());
/// assert!(fetch(1).is_done());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<E> {
    /// The operation completed.
    Success,
    /// There was nothing to do. Ends the loop exactly like [`Outcome::Success`].
    NoOp,
    /// The operation failed and may succeed if retried.
    Transient(E),
    /// The operation failed and must not be retried.
    Abort(E),
}

impl<E> Outcome<E> {
    /// Returns true for [`Outcome::Success`] and [`Outcome::NoOp`].
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Success | Self::NoOp)
    }

    /// Returns true for [`Outcome::Transient`].
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Returns true for [`Outcome::Abort`].
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort(_))
    }

    /// The failure carried by this outcome, if any.
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Transient(e) | Self::Abort(e) => Some(e),
            Self::Success | Self::NoOp => None,
        }
    }

    /// Transform the error type.
    pub fn map_err<F, E2>(self, f: F) -> Outcome<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Success => Outcome::Success,
            Self::NoOp => Outcome::NoOp,
            Self::Transient(e) => Outcome::Transient(f(e)),
            Self::Abort(e) => Outcome::Abort(f(e)),
        }
    }
}

/// `Ok` is success, every `Err` is transient.
impl<E> From<Result<(), E>> for Outcome<E> {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(e) => Self::Transient(e),
        }
    }
}

/// Classify a `Result` into an [`Outcome`].
///
/// ```rust
/// use persevere::{IntoOutcome, Outcome};
///
/// let missing: Result<(), &str> = Err("not found");
/// assert_eq!(missing.abort_when(|e| *e == "not found"), Outcome::Abort("not found"));
///
/// let flaky: Result<(), &str> = Err("timeout");
/// assert_eq!(flaky.abort_when(|e| *e == "not found"), Outcome::Transient("timeout"));
/// ```
pub trait IntoOutcome<E> {
    /// Every error is transient.
    fn transient(self) -> Outcome<E>;

    /// Every error aborts.
    fn abort_on_err(self) -> Outcome<E>;

    /// Errors matching `pred` abort, the rest are transient.
    fn abort_when<P>(self, pred: P) -> Outcome<E>
    where
        P: FnOnce(&E) -> bool;

    /// Errors matching `pred` mean "nothing to do", the rest are transient.
    fn noop_when<P>(self, pred: P) -> Outcome<E>
    where
        P: FnOnce(&E) -> bool;
}

impl<E> IntoOutcome<E> for Result<(), E> {
    fn transient(self) -> Outcome<E> {
        self.into()
    }

    fn abort_on_err(self) -> Outcome<E> {
        match self {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::Abort(e),
        }
    }

    fn abort_when<P>(self, pred: P) -> Outcome<E>
    where
        P: FnOnce(&E) -> bool,
    {
        match self {
            Ok(()) => Outcome::Success,
            Err(e) if pred(&e) => Outcome::Abort(e),
            Err(e) => Outcome::Transient(e),
        }
    }

    fn noop_when<P>(self, pred: P) -> Outcome<E>
    where
        P: FnOnce(&E) -> bool,
    {
        match self {
            Ok(()) => Outcome::Success,
            Err(e) if pred(&e) => Outcome::NoOp,
            Err(e) => Outcome::Transient(e),
        }
    }
}

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn test_noop_is_done() {
        assert!(Outcome::<()>::NoOp.is_done());
        assert!(Outcome::<()>::Success.is_done());
        assert!(!Outcome::Transient(()).is_done());
        assert!(!Outcome::Abort(()).is_done());
    }

    #[test]
    fn test_from_result() {
        assert_eq!(Outcome::from(Ok::<(), &str>(())), Outcome::Success);
        assert_eq!(Outcome::from(Err::<(), _>("x")), Outcome::Transient("x"));
    }

    #[test]
    fn test_abort_on_err() {
        assert_eq!(Err::<(), _>(1).abort_on_err(), Outcome::Abort(1));
        assert_eq!(Ok::<(), i32>(()).abort_on_err(), Outcome::Success);
    }

    #[test]
    fn test_noop_when() {
        let r: Result<(), &str> = Err("already exists");
        assert_eq!(r.noop_when(|e| e.contains("exists")), Outcome::NoOp);

        let r: Result<(), &str> = Err("timeout");
        assert_eq!(r.noop_when(|e| e.contains("exists")), Outcome::Transient("timeout"));
    }

    #[test]
    fn test_error_accessor() {
        assert_eq!(Outcome::Transient(3).error(), Some(&3));
        assert_eq!(Outcome::Abort(4).error(), Some(&4));
        assert_eq!(Outcome::<i32>::NoOp.error(), None);
    }

    #[test]
    fn test_map_err() {
        assert_eq!(Outcome::Abort(2).map_err(|n| n + 1), Outcome::Abort(3));
        assert_eq!(Outcome::<i32>::NoOp.map_err(|n| n + 1), Outcome::NoOp);
    }
}
