use std::time::Duration;

/// Per-probe configuration.
///
/// Use the builder methods to customize, or [`Default`] for sensible
/// defaults.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use streamprobe::{LiveValue, ProbeConfig, ValueProbe};
///
/// let config = ProbeConfig::default().with_await_timeout(Duration::from_millis(200));
/// let live = LiveValue::<u32>::new();
/// let probe = ValueProbe::attach_with(&live, config);
/// assert_eq!(probe.config().await_timeout(), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbeConfig {
    /// How long `await_value()` and `await_next_value()` block when no
    /// explicit timeout is given. Generous on purpose so a broken test fails
    /// instead of hanging.
    /// Default: 5s
    await_timeout: Duration,
}

impl ProbeConfig {
    /// Default bound for waits without an explicit timeout.
    pub const DEFAULT_AWAIT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Set the timeout used by waits that don't specify one.
    pub fn with_await_timeout(mut self, timeout: Duration) -> Self {
        self.await_timeout = timeout;
        self
    }

    /// Returns the timeout used by waits that don't specify one.
    pub fn await_timeout(&self) -> Duration {
        self.await_timeout
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            await_timeout: Self::DEFAULT_AWAIT_TIMEOUT,
        }
    }
}
