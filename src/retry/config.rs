//! Retry configuration: plain data plus a validating builder.

use std::sync::Arc;
use std::time::Duration;

use super::error::ConfigError;
use super::jitter::{self, Jitter, SharedJitter};
use super::Retry;

/// Default base delay between the first and second attempt.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(1);

/// Default ceiling above which the wait stops growing.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(64);

/// Retry settings as plain data.
///
/// Unlike [`RetryBuilder`], this can be stored, compared and (with the
/// `serde` feature) loaded from a config file. It is validated when turned
/// into an engine with [`Retry::from_config`].
///
/// `max_jitter` selects the jitter source: `None` keeps the default,
/// `Some(Duration::ZERO)` disables jitter and any other value draws
/// uniformly from `[0, max_jitter)`.
///
/// # Examples
///
/// ```rust
/// use persevere::{Retry, RetryConfig};
/// use std::time::Duration;
///
/// let config = RetryConfig {
///     limit: 5,
///     wait: Duration::from_millis(200),
///     ..RetryConfig::default()
/// };
///
/// let retry = Retry::from_config(&config).unwrap();
/// assert_eq!(retry.limit(), 5);
/// assert_eq!(retry.wait(), Duration::from_millis(200));
///
/// let bad = RetryConfig { backoff: Duration::ZERO, ..config };
/// assert!(Retry::from_config(&bad).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryConfig {
    /// Maximum number of attempts, `0` for no limit.
    pub limit: u32,
    /// Base delay.
    pub wait: Duration,
    /// Ceiling above which the wait stops growing.
    pub backoff: Duration,
    /// Upper bound of random jitter, see the type docs.
    pub max_jitter: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            wait: DEFAULT_WAIT,
            backoff: DEFAULT_BACKOFF,
            max_jitter: None,
        }
    }
}

impl RetryConfig {
    /// Check every setting, returning the first rejected one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("wait", self.wait)?;
        ConfigError::check_positive("backoff", self.backoff)?;
        Ok(())
    }

    fn jitter_source(&self) -> Option<SharedJitter> {
        match self.max_jitter {
            None => jitter::default_jitter(),
            Some(max) => jitter::bounded(max),
        }
    }
}

/// Builder for [`Retry`].
///
/// Duration setters validate their argument immediately and return
/// [`ConfigError`] for a zero duration, so an invalid engine is never built.
///
/// # Examples
///
/// ```rust
/// use persevere::Retry;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), persevere::ConfigError> {
/// let retry = Retry::builder(10)
///     .wait(Duration::from_millis(50))?
///     .backoff(Duration::from_secs(5))?
///     .jitter(|| Duration::from_millis(3))
///     .build();
///
/// assert_eq!(retry.backoff(), Duration::from_secs(5));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RetryBuilder {
    limit: u32,
    wait: Duration,
    backoff: Duration,
    jitter: Option<SharedJitter>,
}

impl RetryBuilder {
    pub(crate) fn new(limit: u32) -> Self {
        Self {
            limit,
            wait: DEFAULT_WAIT,
            backoff: DEFAULT_BACKOFF,
            jitter: jitter::default_jitter(),
        }
    }

    /// Set the base delay.
    pub fn wait(mut self, wait: Duration) -> Result<Self, ConfigError> {
        self.wait = ConfigError::check_positive("wait", wait)?;
        Ok(self)
    }

    /// Set the backoff ceiling.
    pub fn backoff(mut self, backoff: Duration) -> Result<Self, ConfigError> {
        self.backoff = ConfigError::check_positive("backoff", backoff)?;
        Ok(self)
    }

    /// Use a custom jitter source.
    pub fn jitter<J>(mut self, jitter: J) -> Self
    where
        J: Jitter + 'static,
    {
        self.jitter = Some(Arc::new(jitter));
        self
    }

    /// Use an already shared jitter source.
    pub fn shared_jitter(mut self, jitter: SharedJitter) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Go back to the default jitter source.
    pub fn reset_jitter(mut self) -> Self {
        self.jitter = jitter::default_jitter();
        self
    }

    /// Disable jitter entirely.
    pub fn no_jitter(mut self) -> Self {
        self.jitter = None;
        self
    }

    /// Finish the engine.
    pub fn build(self) -> Retry {
        Retry {
            limit: self.limit,
            wait: self.wait,
            backoff: self.backoff,
            jitter: self.jitter,
        }
    }
}

impl std::fmt::Debug for RetryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryBuilder")
            .field("limit", &self.limit)
            .field("wait", &self.wait)
            .field("backoff", &self.backoff)
            .field("jitter", &self.jitter.is_some())
            .finish()
    }
}

impl Retry {
    /// Engine with default delays and jitter.
    pub fn new(limit: u32) -> Self {
        RetryBuilder::new(limit).build()
    }

    /// Start configuring an engine.
    pub fn builder(limit: u32) -> RetryBuilder {
        RetryBuilder::new(limit)
    }

    /// Build an engine from plain settings.
    pub fn from_config(config: &RetryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            limit: config.limit,
            wait: config.wait,
            backoff: config.backoff,
            jitter: config.jitter_source(),
        })
    }
}

impl TryFrom<&RetryConfig> for Retry {
    type Error = ConfigError;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}

impl TryFrom<RetryConfig> for Retry {
    type Error = ConfigError;

    fn try_from(config: RetryConfig) -> Result<Self, Self::Error> {
        Self::from_config(&config)
    }
}
