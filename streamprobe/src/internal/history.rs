use std::{
    sync::{Condvar, Mutex, PoisonError},
    time::{Duration, Instant},
};

use crate::{Error, Result, internal::lock};

/// Forwards a recorded value to a derived probe. Returns false once the
/// target is gone so it can be dropped.
pub(crate) type Forwarder<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Append-only value history shared between a probe and its observer.
///
/// All reads and writes of `values` go through one mutex, paired with a
/// condition variable that waiters re-check in a loop.
pub(crate) struct History<T> {
    record: Mutex<Record<T>>,
    arrived: Condvar,
    #[cfg(feature = "async")]
    notify: tokio::sync::Notify,
}

struct Record<T> {
    values: Vec<T>,
    disposed: bool,
    forwarders: Vec<Forwarder<T>>,
}

impl<T: Clone> History<T> {
    pub(crate) fn last(&self) -> Option<T> {
        lock(&self.record).values.last().cloned()
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        lock(&self.record).values.clone()
    }
}

impl<T> History<T> {
    pub(crate) fn new() -> Self {
        Self {
            record: Mutex::new(Record {
                values: Vec::new(),
                disposed: false,
                forwarders: Vec::new(),
            }),
            arrived: Condvar::new(),
            #[cfg(feature = "async")]
            notify: tokio::sync::Notify::new(),
        }
    }

    /// Append `value` and wake all waiters. Returns false (and drops the
    /// value) once disposed.
    pub(crate) fn push(&self, value: T) -> bool {
        {
            let mut record = lock(&self.record);
            if record.disposed {
                return false;
            }
            record.values.push(value);
            let Record {
                values, forwarders, ..
            } = &mut *record;
            if let Some(last) = values.last() {
                forwarders.retain(|forward| forward(last));
            }
            tracing::trace!(size = values.len(), "value recorded");
        }
        self.wake();
        true
    }

    /// Replay the existing history into `forwarder`, then keep it for
    /// future values. Both happen under the history lock, so no value is
    /// forwarded twice or skipped.
    pub(crate) fn forward_to(&self, forwarder: Forwarder<T>) {
        let mut record = lock(&self.record);
        for value in &record.values {
            if !forwarder(value) {
                return;
            }
        }
        if !record.disposed {
            record.forwarders.push(forwarder);
        }
    }

    /// Mark the history as terminated and release every waiter. Returns
    /// true on the first call only.
    pub(crate) fn dispose(&self) -> bool {
        {
            let mut record = lock(&self.record);
            if record.disposed {
                return false;
            }
            record.disposed = true;
            record.forwarders.clear();
        }
        self.wake();
        true
    }

    fn wake(&self) {
        self.arrived.notify_all();
        #[cfg(feature = "async")]
        self.notify.notify_waiters();
    }

    pub(crate) fn is_disposed(&self) -> bool {
        lock(&self.record).disposed
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.record).values.len()
    }

    /// Block until the history holds at least one value.
    pub(crate) fn wait_for_any(&self, timeout: Duration) -> Result {
        let record = lock(&self.record);
        self.wait_beyond(record, 0, timeout)
    }

    /// Block until the history grows past its length at call time. The
    /// length is read under the same lock the wait starts with, so a value
    /// appended concurrently with the call is never missed.
    pub(crate) fn wait_for_next(&self, timeout: Duration) -> Result {
        let record = lock(&self.record);
        let threshold = record.values.len();
        self.wait_beyond(record, threshold, timeout)
    }

    /// Ok on growth past `threshold` or on timeout, `Err(Disposed)` if the
    /// history is terminated first.
    fn wait_beyond(
        &self,
        mut record: std::sync::MutexGuard<'_, Record<T>>,
        threshold: usize,
        timeout: Duration,
    ) -> Result {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            if record.values.len() > threshold {
                return Ok(());
            }
            if record.disposed {
                tracing::warn!(size = record.values.len(), "wait released by disposal");
                return Err(Error::Disposed);
            }
            record = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        tracing::debug!(?timeout, size = record.values.len(), "wait timed out");
                        return Ok(());
                    }
                    self.arrived
                        .wait_timeout(record, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .arrived
                    .wait(record)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Async counterpart of [`wait_beyond`](Self::wait_beyond).
    ///
    /// The `Notified` future is enabled before the condition is checked, so
    /// a wake between the check and the await is not lost.
    #[cfg(feature = "async")]
    pub(crate) async fn wait_beyond_async(&self, threshold: usize, timeout: Duration) -> Result {
        let deadline = tokio::time::Instant::now().checked_add(timeout);
        loop {
            let mut notified = std::pin::pin!(self.notify.notified());
            notified.as_mut().enable();
            {
                let record = lock(&self.record);
                if record.values.len() > threshold {
                    return Ok(());
                }
                if record.disposed {
                    tracing::warn!(size = record.values.len(), "wait released by disposal");
                    return Err(Error::Disposed);
                }
            }
            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        tracing::debug!(?timeout, "wait timed out");
                        return Ok(());
                    }
                }
                None => notified.await,
            }
        }
    }
}
