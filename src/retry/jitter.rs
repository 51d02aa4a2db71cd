//! Jitter sources: small random extra delays added to each backoff step.
//!
//! Jitter spreads out retries from independent callers that failed at the
//! same moment. Any `Fn() -> Duration` is a jitter source; [`RandomJitter`]
//! (feature `jitter`) is the default.

use std::sync::Arc;
use std::time::Duration;

/// Upper bound (exclusive) of the default jitter source.
pub const DEFAULT_JITTER_MAX: Duration = Duration::from_millis(1000);

/// Produces the extra delay added when the wait grows.
pub trait Jitter: Send + Sync {
    /// Draw one jitter sample.
    fn sample(&self) -> Duration;
}

impl<F> Jitter for F
where
    F: Fn() -> Duration + Send + Sync,
{
    fn sample(&self) -> Duration {
        self()
    }
}

/// A shared, type-erased jitter source.
pub type SharedJitter = Arc<dyn Jitter>;

/// No extra delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&self) -> Duration {
        Duration::ZERO
    }
}

/// Always the same extra delay. Handy for deterministic tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedJitter(pub Duration);

impl Jitter for FixedJitter {
    fn sample(&self) -> Duration {
        self.0
    }
}

#[cfg(feature = "jitter")]
pub use random::RandomJitter;

#[cfg(feature = "jitter")]
mod random {
    use super::Jitter;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    /// Uniform whole-millisecond jitter in `[0, max)`.
    ///
    /// Owns its random generator, so two sources never share state and a
    /// seeded source is fully reproducible.
    ///
    /// ```rust
    /// use persevere::jitter::{Jitter, RandomJitter};
    /// use std::time::Duration;
    ///
    /// let a = RandomJitter::seeded(Duration::from_millis(500), 7);
    /// let b = RandomJitter::seeded(Duration::from_millis(500), 7);
    /// for _ in 0..10 {
    ///     let sample = a.sample();
    ///     assert!(sample < Duration::from_millis(500));
    ///     assert_eq!(sample, b.sample());
    /// }
    /// ```
    #[derive(Debug)]
    pub struct RandomJitter {
        max_millis: u64,
        rng: Mutex<StdRng>,
    }

    impl RandomJitter {
        /// Seeded from the operating system.
        pub fn new(max: Duration) -> Self {
            Self::with_rng(max, StdRng::from_os_rng())
        }

        /// Deterministic source for a given seed.
        pub fn seeded(max: Duration, seed: u64) -> Self {
            Self::with_rng(max, StdRng::seed_from_u64(seed))
        }

        /// Use an already constructed generator.
        pub fn with_rng(max: Duration, rng: StdRng) -> Self {
            Self {
                max_millis: u64::try_from(max.as_millis()).unwrap_or(u64::MAX),
                rng: Mutex::new(rng),
            }
        }

        /// Exclusive upper bound of the samples.
        pub fn max(&self) -> Duration {
            Duration::from_millis(self.max_millis)
        }
    }

    impl Default for RandomJitter {
        fn default() -> Self {
            Self::new(super::DEFAULT_JITTER_MAX)
        }
    }

    impl Jitter for RandomJitter {
        fn sample(&self) -> Duration {
            if self.max_millis == 0 {
                return Duration::ZERO;
            }
            // A panic elsewhere cannot leave the generator in a bad state.
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            Duration::from_millis(rng.random_range(0..self.max_millis))
        }
    }
}

/// The jitter source used when none is configured.
///
/// Random `[0, 1s)` with the `jitter` feature, nothing without it.
pub fn default_jitter() -> Option<SharedJitter> {
    #[cfg(feature = "jitter")]
    {
        Some(Arc::new(RandomJitter::new(DEFAULT_JITTER_MAX)))
    }
    #[cfg(not(feature = "jitter"))]
    {
        None
    }
}

/// Jitter source drawing from `[0, max)`, or none when `max` is zero.
pub(crate) fn bounded(max: Duration) -> Option<SharedJitter> {
    if max.is_zero() {
        return None;
    }
    #[cfg(feature = "jitter")]
    {
        Some(Arc::new(RandomJitter::new(max)))
    }
    #[cfg(not(feature = "jitter"))]
    {
        None
    }
}
