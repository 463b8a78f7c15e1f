use std::{fmt, future::IntoFuture, pin::Pin, time::Duration};

use crate::{Result, internal::History};

/// An awaitable wait on a [`ValueProbe`](crate::ValueProbe).
///
/// Created by [`ValueProbe::expect_value`](crate::ValueProbe::expect_value)
/// and [`ValueProbe::expect_next_value`](crate::ValueProbe::expect_next_value).
/// Resolves once the probe's history passes the captured threshold, or the
/// timeout elapses. Like the blocking waits, a timeout resolves to `Ok` and
/// disposal to [`Error::Disposed`](crate::Error::Disposed).
///
/// # Example
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> streamprobe::Result {
/// use std::time::Duration;
/// use streamprobe::{LiveValue, SourceExt};
///
/// let live = LiveValue::new();
/// let probe = live.probe();
///
/// let publisher = live.clone();
/// tokio::spawn(async move { publisher.set(42) });
///
/// probe.expect_value().within(Duration::from_secs(1)).await?;
/// probe.assert_value(&42);
/// # Ok(())
/// # }
/// ```
pub struct Expectation<'a, T> {
    history: &'a History<T>,
    threshold: usize,
    timeout: Duration,
}

impl<'a, T> Expectation<'a, T> {
    pub(crate) fn new(history: &'a History<T>, threshold: usize, timeout: Duration) -> Self {
        Self {
            history,
            threshold,
            timeout,
        }
    }

    /// Override the probe's configured timeout.
    pub fn within(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<'a, T: Send + 'a> IntoFuture for Expectation<'a, T> {
    type Output = Result;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.history.wait_beyond_async(self.threshold, self.timeout))
    }
}

impl<T> fmt::Debug for Expectation<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("threshold", &self.threshold)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
