//! Exponential backoff state.
//!
//! Pure data: no sleeping happens here, so the growth rule can be tested
//! without a clock.

use std::time::Duration;

use super::jitter::Jitter;

/// The current wait of one retry run.
///
/// The wait starts at the base delay. Each call to [`grow`](Backoff::grow)
/// recomputes it from scratch as `base * 2^attempt` (plus one jitter sample)
/// as long as it is still below the ceiling. Once it reaches the ceiling it
/// is left alone, so a jittered step may end up slightly above it.
///
/// # Examples
///
/// ```rust
/// use persevere::Backoff;
/// use std::time::Duration;
///
/// let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(8));
/// let mut waits = vec![backoff.current()];
/// for attempt in 1..=5 {
///     backoff.grow(attempt, None);
///     waits.push(backoff.current());
/// }
///
/// let secs: Vec<u64> = waits.iter().map(Duration::as_secs).collect();
/// assert_eq!(secs, vec![1, 2, 4, 8, 8, 8]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    /// Start a backoff at `base`, growing until `ceiling`.
    pub fn new(base: Duration, ceiling: Duration) -> Self {
        Self {
            base,
            ceiling,
            current: base,
        }
    }

    /// The wait to sleep before the next attempt.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// The base delay.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// The ceiling above which the wait stops growing.
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Returns true once the wait no longer grows.
    pub fn is_saturated(&self) -> bool {
        self.current >= self.ceiling
    }

    /// Grow the wait for the given number of completed attempts.
    ///
    /// Returns true if the wait was recomputed. Jitter is drawn only then.
    pub fn grow(&mut self, attempt: u32, jitter: Option<&dyn Jitter>) -> bool {
        if self.is_saturated() {
            return false;
        }
        let mut next = exponential(self.base, attempt);
        if let Some(jitter) = jitter {
            next = next.saturating_add(jitter.sample());
        }
        self.current = next;
        true
    }

    /// Preview the first `attempts` waits, without jitter.
    ///
    /// ```rust
    /// use persevere::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(500));
    /// let waits: Vec<_> = backoff.waits(5).collect();
    /// assert_eq!(waits[0], Duration::from_millis(100));
    /// assert_eq!(waits[3], Duration::from_millis(800));
    /// assert_eq!(waits[4], Duration::from_millis(800));
    /// ```
    pub fn waits(&self, attempts: u32) -> impl Iterator<Item = Duration> {
        let mut state = *self;
        (1..=attempts).map(move |attempt| {
            let wait = state.current;
            state.grow(attempt, None);
            wait
        })
    }
}

/// `base * 2^attempt`, saturating at `Duration::MAX`.
fn exponential(base: Duration, attempt: u32) -> Duration {
    match 2u32.checked_pow(attempt) {
        Some(factor) => base.saturating_mul(factor),
        None => Duration::MAX,
    }
}

#[cfg(test)]
mod backoff_tests {
    use super::*;
    use crate::retry::jitter::FixedJitter;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_starts_at_base() {
        let backoff = Backoff::new(ms(100), ms(1000));
        assert_eq!(backoff.current(), ms(100));
        assert!(!backoff.is_saturated());
    }

    #[test]
    fn test_recomputed_from_attempt_count() {
        let mut backoff = Backoff::new(ms(100), ms(10_000));
        backoff.grow(1, None);
        assert_eq!(backoff.current(), ms(200));
        // keyed off the attempt, not the previous wait
        backoff.grow(4, None);
        assert_eq!(backoff.current(), ms(1600));
    }

    #[test]
    fn test_stops_growing_at_ceiling() {
        let mut backoff = Backoff::new(ms(100), ms(400));
        assert!(backoff.grow(1, None));
        assert!(backoff.grow(2, None));
        assert_eq!(backoff.current(), ms(400));
        assert!(backoff.is_saturated());
        assert!(!backoff.grow(3, None));
        assert_eq!(backoff.current(), ms(400));
    }

    #[test]
    fn test_last_step_may_overshoot() {
        let mut backoff = Backoff::new(ms(100), ms(300));
        backoff.grow(1, None);
        backoff.grow(2, None);
        assert_eq!(backoff.current(), ms(400));
        backoff.grow(3, None);
        assert_eq!(backoff.current(), ms(400));
    }

    #[test]
    fn test_jitter_added_only_when_recomputed() {
        let jitter = FixedJitter(ms(7));
        let mut backoff = Backoff::new(ms(100), ms(200));
        assert!(backoff.grow(1, Some(&jitter)));
        assert_eq!(backoff.current(), ms(207));
        assert!(!backoff.grow(2, Some(&jitter)));
        assert_eq!(backoff.current(), ms(207));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let mut backoff = Backoff::new(ms(1), Duration::MAX);
        backoff.grow(40, None);
        assert_eq!(backoff.current(), Duration::MAX);
        assert!(backoff.is_saturated());
    }

    #[test]
    fn test_waits_preview() {
        let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(8));
        let waits: Vec<u64> = backoff.waits(6).map(|d| d.as_secs()).collect();
        assert_eq!(waits, vec![1, 2, 4, 8, 8, 8]);
    }

    #[test]
    fn test_exponential() {
        assert_eq!(exponential(ms(1), 0), ms(1));
        assert_eq!(exponential(ms(1), 10), ms(1024));
        assert_eq!(exponential(ms(1), 32), Duration::MAX);
    }
}
