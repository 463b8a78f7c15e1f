use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    LifecycleGate, Observer, ProbeConfig, Result, Source, SubscriptionId,
    internal::{History, lock},
};

#[cfg(feature = "async")]
use crate::Expectation;

/// Records every value a [`Source`] delivers and asserts on that history.
///
/// A probe subscribes on [`attach`](Self::attach) and appends each delivered
/// value to an ordered, append-only history. Accessors and assertions read
/// a snapshot of that history. Only the `await_*` methods block, until a
/// value (or the next value) arrives, the timeout elapses, or the probe is
/// disposed.
///
/// Assertions panic on the calling thread, like `assert!`, and return
/// `&Self` so they chain:
///
/// ```rust
/// use streamprobe::{LiveValue, ValueProbe};
///
/// let live = LiveValue::new();
/// let probe = ValueProbe::attach(&live);
///
/// for v in 1..=4 {
///     live.set(v);
/// }
///
/// probe
///     .assert_has_value()
///     .assert_value(&4)
///     .assert_value_matches(|v| *v > 3)
///     .assert_history_size(4)
///     .assert_never(|v| *v > 4);
/// assert_eq!(probe.value_history(), vec![1, 2, 3, 4]);
/// ```
///
/// Values may also arrive from another thread:
///
/// ```rust
/// use std::{thread, time::Duration};
/// use streamprobe::{LiveValue, ValueProbe};
///
/// let live = LiveValue::new();
/// let probe = ValueProbe::attach(&live);
///
/// let publisher = live.clone();
/// thread::spawn(move || publisher.set("ready"));
///
/// probe
///     .await_value_within(Duration::from_secs(5))?
///     .assert_value(&"ready");
/// # Ok::<(), streamprobe::Error>(())
/// ```
///
/// Dropping a probe disposes it.
pub struct ValueProbe<T> {
    history: Arc<History<T>>,
    upstream: Mutex<Option<Upstream<T>>>,
    config: ProbeConfig,
}

struct Upstream<T> {
    source: Box<dyn Source<T>>,
    id: SubscriptionId,
}

impl<T> fmt::Debug for ValueProbe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscription = lock(&self.upstream).as_ref().map(|up| up.id);
        f.debug_struct("ValueProbe")
            .field("subscription", &subscription)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ValueProbe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> ValueProbe<T> {
    /// Create a probe that is not subscribed to anything.
    ///
    /// Hand [`observer`](Self::observer) to a source yourself; removing that
    /// subscription again is then up to you.
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    /// Create an unsubscribed probe with a custom configuration.
    pub fn with_config(config: ProbeConfig) -> Self {
        Self {
            history: Arc::new(History::new()),
            upstream: Mutex::new(None),
            config,
        }
    }

    /// Subscribe a new probe to `source`.
    ///
    /// If the source already holds a value it delivers it during
    /// subscription, so the probe starts with a history of 0 or 1 values.
    pub fn attach<S>(source: &S) -> Self
    where
        S: Source<T> + Clone + 'static,
    {
        Self::attach_with(source, ProbeConfig::default())
    }

    /// [`attach`](Self::attach) with a custom configuration.
    pub fn attach_with<S>(source: &S, config: ProbeConfig) -> Self
    where
        S: Source<T> + Clone + 'static,
    {
        let probe = Self::with_config(config);
        let id = source.subscribe(probe.observer());
        probe.own(source, id);
        probe
    }

    /// Subscribe a new probe to `source`, receiving values only while
    /// `gate` is active.
    pub fn attach_gated<S>(source: &S, gate: &LifecycleGate) -> Self
    where
        S: Source<T> + Clone + 'static,
    {
        let probe = Self::new();
        let id = source.subscribe_gated(gate, probe.observer());
        probe.own(source, id);
        probe
    }

    fn own<S>(&self, source: &S, id: SubscriptionId)
    where
        S: Source<T> + Clone + 'static,
    {
        tracing::debug!(subscription = id.as_u64(), "probe attached");
        *lock(&self.upstream) = Some(Upstream {
            source: Box::new(source.clone()),
            id,
        });
    }

    /// Returns a callback that records into this probe.
    ///
    /// The callback keeps no strong reference: once the probe is dropped
    /// or disposed, calls are ignored.
    pub fn observer(&self) -> Observer<T> {
        let history = Arc::downgrade(&self.history);
        Arc::new(move |value: &T| {
            if let Some(history) = history.upgrade() {
                history.push(value.clone());
            }
        })
    }

    /// Record `value` as if the upstream had delivered it.
    ///
    /// Ignored after [`dispose`](Self::dispose).
    pub fn on_next(&self, value: &T) {
        self.history.push(value.clone());
    }

    /// Returns the configuration this probe was created with.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Returns the latest recorded value, or `None` if nothing was recorded.
    pub fn value(&self) -> Option<T> {
        self.history.last()
    }

    /// Returns a copy of the full history, oldest first.
    pub fn value_history(&self) -> Vec<T> {
        self.history.snapshot()
    }

    /// Returns the number of recorded values.
    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    /// Returns true once [`dispose`](Self::dispose) ran or the probe was
    /// dropped.
    pub fn is_disposed(&self) -> bool {
        self.history.is_disposed()
    }

    // ==================== Waiting ====================

    /// Block until the probe holds any value, using the configured timeout.
    ///
    /// Returns immediately if a value is already recorded. A timeout is not
    /// an error: the probe is returned unchanged and the next assertion
    /// reports what is missing.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`](crate::Error::Disposed) if the probe is disposed
    /// while empty, before or during the wait.
    pub fn await_value(&self) -> Result<&Self> {
        self.await_value_within(self.config.await_timeout())
    }

    /// [`await_value`](Self::await_value) with an explicit timeout.
    pub fn await_value_within(&self, timeout: Duration) -> Result<&Self> {
        self.history.wait_for_any(timeout)?;
        Ok(self)
    }

    /// Block until a value newer than the ones already recorded arrives,
    /// using the configured timeout.
    ///
    /// A value recorded concurrently with this call is never missed. A
    /// timeout is not an error.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`](crate::Error::Disposed) if the probe is or
    /// becomes disposed before a new value arrives.
    pub fn await_next_value(&self) -> Result<&Self> {
        self.await_next_value_within(self.config.await_timeout())
    }

    /// [`await_next_value`](Self::await_next_value) with an explicit timeout.
    pub fn await_next_value_within(&self, timeout: Duration) -> Result<&Self> {
        self.history.wait_for_next(timeout)?;
        Ok(self)
    }

    /// Awaitable counterpart of [`await_value`](Self::await_value).
    ///
    /// ```rust,ignore
    /// probe.expect_value().within(Duration::from_millis(500)).await?;
    /// probe.assert_value(&42);
    /// ```
    #[cfg(feature = "async")]
    #[cfg_attr(docsrs, doc(cfg(feature = "async")))]
    pub fn expect_value(&self) -> Expectation<'_, T> {
        Expectation::new(&self.history, 0, self.config.await_timeout())
    }

    /// Awaitable counterpart of [`await_next_value`](Self::await_next_value).
    ///
    /// The history length is captured when this method is called, not when
    /// the expectation is awaited.
    #[cfg(feature = "async")]
    #[cfg_attr(docsrs, doc(cfg(feature = "async")))]
    pub fn expect_next_value(&self) -> Expectation<'_, T> {
        Expectation::new(
            &self.history,
            self.history.len(),
            self.config.await_timeout(),
        )
    }

    // ==================== Derivation ====================

    /// Returns an independent probe recording `transform` of every value
    /// this probe records, the ones already recorded included.
    ///
    /// ```rust
    /// use streamprobe::{LiveValue, ValueProbe};
    ///
    /// let live = LiveValue::new();
    /// let probe = ValueProbe::attach(&live);
    /// live.set(1);
    /// live.set(2);
    ///
    /// let doubled = probe.map(|v| v * 2);
    /// live.set(3);
    ///
    /// assert_eq!(doubled.value_history(), vec![2, 4, 6]);
    /// ```
    pub fn map<U, F>(&self, transform: F) -> ValueProbe<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let derived = ValueProbe::with_config(self.config.clone());
        let target = Arc::downgrade(&derived.history);
        self.history.forward_to(Box::new(move |value: &T| {
            match target.upgrade() {
                Some(history) => history.push(transform(value)),
                None => false,
            }
        }));
        derived
    }

    // ==================== Disposal ====================

    /// Unsubscribe from the upstream source and stop recording.
    ///
    /// Idempotent. Threads blocked in an `await_*` method are released with
    /// [`Error::Disposed`](crate::Error::Disposed) unless their condition
    /// already holds. The recorded history stays readable.
    pub fn dispose(&self) -> &Self {
        let upstream = lock(&self.upstream).take();
        if let Some(Upstream { source, id }) = upstream {
            source.unsubscribe(id);
        }
        if self.history.dispose() {
            tracing::debug!(size = self.history.len(), "probe disposed");
        }
        self
    }

    /// Export the history as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns any serialization error produced by `serde_json`.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn history_json(&self) -> serde_json::Result<String>
    where
        T: serde::Serialize,
    {
        serde_json::to_string_pretty(&self.value_history())
    }
}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> ValueProbe<T> {
    // ==================== Assertions ====================

    /// Panics unless at least one value was recorded.
    #[track_caller]
    pub fn assert_has_value(&self) -> &Self {
        if self.history_size() == 0 {
            panic!("Probe never received any value");
        }
        self
    }

    /// Panics if any value was recorded.
    #[track_caller]
    pub fn assert_no_value(&self) -> &Self {
        let values = self.value_history();
        if !values.is_empty() {
            panic!(
                "Expected no value, but {} were recorded: {values:?}",
                values.len()
            );
        }
        self
    }

    /// Panics unless exactly `expected` values were recorded.
    #[track_caller]
    pub fn assert_history_size(&self, expected: usize) -> &Self {
        let values = self.value_history();
        if values.len() != expected {
            panic!(
                "History size differs; expected: {expected}, actual: {}, history: {values:?}",
                values.len()
            );
        }
        self
    }

    /// Panics unless the latest value equals `expected`.
    #[track_caller]
    pub fn assert_value(&self, expected: &T) -> &Self
    where
        T: PartialEq,
    {
        match self.value() {
            None => panic!("Expected: {expected:?}, but probe never received any value"),
            Some(actual) if actual != *expected => {
                panic!("Expected: {expected:?}, actual: {actual:?}")
            }
            Some(_) => self,
        }
    }

    /// Panics unless the latest value satisfies `predicate`.
    #[track_caller]
    pub fn assert_value_matches<P>(&self, predicate: P) -> &Self
    where
        P: Fn(&T) -> bool,
    {
        match self.value() {
            None => panic!(
                "Expected a value matching the predicate, but probe never received any value"
            ),
            Some(actual) if !predicate(&actual) => {
                panic!("Latest value {actual:?} does not match the predicate")
            }
            Some(_) => self,
        }
    }

    /// Panics if any value ever recorded satisfies `predicate`, not just
    /// the latest one.
    #[track_caller]
    pub fn assert_never<P>(&self, predicate: P) -> &Self
    where
        P: Fn(&T) -> bool,
    {
        let values = self.value_history();
        let first_match = values.iter().enumerate().find(|&(_, v)| predicate(v));
        if let Some((index, value)) = first_match {
            panic!(
                "Value at position {index} ({value:?}) matches the predicate, \
                 which was not expected; history: {values:?}"
            );
        }
        self
    }
}

impl<T> Drop for ValueProbe<T> {
    fn drop(&mut self) {
        let upstream = self
            .upstream
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(Upstream { source, id }) = upstream {
            source.unsubscribe(id);
        }
        self.history.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        thread,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::{Error, LiveValue, SourceExt};

    fn short() -> Duration {
        Duration::from_millis(30)
    }

    #[test]
    fn dispose_removes_upstream_observer() {
        let live = LiveValue::<i32>::new();
        let probe = live.probe();
        assert!(live.has_observers());

        probe.dispose();
        assert!(!live.has_observers());
        assert!(probe.is_disposed());

        probe.dispose();
        assert!(!live.has_observers());
    }

    #[test]
    fn dispose_keeps_other_subscribers() {
        let live = LiveValue::<i32>::new();
        let first = live.probe();
        let second = live.probe();

        first.dispose();
        live.set(1);

        assert!(live.has_observers());
        first.assert_no_value();
        second.assert_value(&1);
    }

    #[test]
    fn publishes_after_dispose_are_not_recorded() {
        let live = LiveValue::new();
        let probe = live.probe();
        live.set(1);
        probe.dispose();
        live.set(2);
        probe.on_next(&3);

        assert_eq!(probe.value_history(), vec![1]);
    }

    #[test]
    fn drop_unsubscribes() {
        let live = LiveValue::<i32>::new();
        {
            let _probe = live.probe();
            assert!(live.has_observers());
        }
        assert!(!live.has_observers());
    }

    #[test]
    fn history_retained_from_latest_buffered_value() {
        let live = LiveValue::new();
        live.set(1);
        live.set(2);

        let probe = live.probe();
        for v in 3..=5 {
            live.set(v);
        }

        probe.assert_history_size(4);
        assert_eq!(probe.value_history(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn asserting_value_passes() {
        let live = LiveValue::with_value(3);

        let value = live
            .probe()
            .assert_has_value()
            .assert_never(|v| *v > 3)
            .assert_value(&3)
            .assert_value_matches(|v| *v == 3)
            .assert_history_size(1)
            .value();

        assert_eq!(value, Some(3));
    }

    #[test]
    fn value_updates_as_published() {
        let live = LiveValue::new();
        let probe = live.probe();
        probe.assert_no_value();
        assert_eq!(probe.value(), None);

        live.set(3);
        live.set(4);

        probe
            .assert_has_value()
            .assert_history_size(2)
            .assert_value(&4)
            .assert_value_matches(|v| *v > 3);
    }

    #[test]
    fn absent_values_are_recorded_explicitly() {
        let live = LiveValue::<Option<i32>>::new();
        let probe = live.probe();
        assert_eq!(probe.value(), None);

        live.set(None);
        assert_eq!(probe.value(), Some(None));
        probe.assert_has_value().assert_value(&None);

        live.set(Some(1));
        assert_eq!(probe.value_history(), vec![None, Some(1)]);
    }

    #[test]
    #[should_panic(expected = "never received any value")]
    fn has_value_fails_on_empty_history() {
        let live = LiveValue::<i32>::new();
        live.probe().assert_has_value();
    }

    #[test]
    #[should_panic(expected = "Expected: 3, actual: 1")]
    fn value_fails_on_other_value() {
        LiveValue::with_value(1).probe().assert_value(&3);
    }

    #[test]
    #[should_panic(expected = "probe never received any value")]
    fn value_fails_on_empty_history() {
        LiveValue::<i32>::new().probe().assert_value(&3);
    }

    #[test]
    #[should_panic(expected = "does not match the predicate")]
    fn value_fails_on_non_matching_predicate() {
        LiveValue::with_value(1).probe().assert_value_matches(|v| *v > 1);
    }

    #[test]
    #[should_panic(expected = "Expected no value")]
    fn no_value_fails_on_value() {
        LiveValue::with_value(1).probe().assert_no_value();
    }

    #[test]
    #[should_panic(expected = "expected: 2, actual: 1")]
    fn history_size_fails_on_mismatch() {
        LiveValue::with_value(1).probe().assert_history_size(2);
    }

    #[test]
    #[should_panic(expected = "Value at position 0 (4)")]
    fn never_fails_on_previous_value() {
        let live = LiveValue::new();
        let probe = live.probe();
        live.set(4);
        live.set(5);

        probe.assert_value(&5).assert_never(|v| *v == 4);
    }

    #[test]
    fn await_value_returns_immediately_with_value() {
        let probe = LiveValue::with_value(1).probe();
        let start = Instant::now();
        probe.await_value().unwrap().assert_value(&1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn await_value_timeout_is_not_an_error() {
        let live = LiveValue::<i32>::new();
        let probe = live.probe();
        let start = Instant::now();

        probe.await_value_within(short()).unwrap().assert_no_value();
        assert!(start.elapsed() >= short());
    }

    #[test]
    fn configured_timeout_is_used_by_default() {
        let live = LiveValue::<i32>::new();
        let config = ProbeConfig::default().with_await_timeout(short());
        let probe = ValueProbe::attach_with(&live, config);
        let start = Instant::now();

        probe.await_value().unwrap();
        probe.await_next_value().unwrap();
        assert!(start.elapsed() >= short() * 2);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn await_value_receives_value_from_other_thread() {
        let live = LiveValue::new();
        let probe = live.probe();

        let publisher = live.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            publisher.set(42);
        });

        probe.await_value().unwrap().assert_value(&42);
        handle.join().unwrap();
    }

    #[test]
    fn await_next_value_waits_for_newer_value() {
        let live = LiveValue::with_value(1);
        let probe = live.probe();

        let publisher = live.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            publisher.set(2);
        });

        probe.await_next_value().unwrap().assert_value(&2).assert_history_size(2);
        handle.join().unwrap();
    }

    #[test]
    fn await_next_value_is_woken_by_concurrent_value() {
        for _ in 0..50 {
            let live = LiveValue::with_value(0);
            let recorder = Arc::new(live.probe());
            let returned = Arc::new(AtomicBool::new(false));

            let waiter = recorder.clone();
            let flag = returned.clone();
            let handle = thread::spawn(move || {
                let start = Instant::now();
                let result = waiter.await_next_value_within(Duration::from_secs(5)).map(|_| ());
                let elapsed = start.elapsed();
                flag.store(true, Ordering::SeqCst);
                (result, elapsed)
            });

            // Keep publishing until the waiter has returned, so at least one
            // value lands after its snapshot whenever it starts waiting.
            let mut next = 1;
            while !returned.load(Ordering::SeqCst) {
                live.set(next);
                next += 1;
                thread::yield_now();
            }

            let (result, elapsed) = handle.join().unwrap();
            assert_eq!(result, Ok(()));
            assert!(elapsed < Duration::from_secs(1), "wait took {elapsed:?}");
            assert!(recorder.history_size() > 1);
        }
    }

    #[test]
    fn await_next_value_releases_already_blocked_waiter() {
        let live = LiveValue::with_value(0);
        let recorder = Arc::new(live.probe());

        let waiter = recorder.clone();
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let result = waiter.await_next_value_within(Duration::from_secs(5)).map(|_| ());
            (result, start.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        live.set(1);

        let (result, elapsed) = handle.join().unwrap();
        assert_eq!(result, Ok(()));
        assert!(elapsed < Duration::from_secs(2), "wait took {elapsed:?}");
        recorder.assert_value(&1);
    }

    #[test]
    fn dispose_releases_blocked_waiter() {
        let live = LiveValue::<i32>::new();
        let probe = Arc::new(live.probe());

        let waiter = probe.clone();
        let handle =
            thread::spawn(move || waiter.await_value_within(Duration::from_secs(30)).err());

        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        probe.dispose();

        assert_eq!(handle.join().unwrap(), Some(Error::Disposed));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!live.has_observers());
    }

    #[test]
    fn await_after_dispose_fails_fast() {
        let live = LiveValue::with_value(1);
        let probe = live.probe();
        probe.dispose();

        // The awaited condition already holds
        probe.await_value().unwrap();
        assert_eq!(probe.await_next_value().unwrap_err(), Error::Disposed);
    }

    #[test]
    fn map_back_fills_and_follows() {
        let live = LiveValue::new();
        let probe = live.probe();
        live.set(1);
        live.set(2);

        let doubled = probe.map(|v| v * 2);
        assert_eq!(doubled.value_history(), vec![2, 4]);

        live.set(3);
        assert_eq!(doubled.value_history(), vec![2, 4, 6]);
        doubled.assert_value(&6).assert_history_size(3);
    }

    #[test]
    fn map_can_change_type() {
        let live = LiveValue::with_value(7);
        let probe = live.probe();
        let labels = probe.map(|v| format!("#{v}"));
        labels.assert_value(&"#7".to_string());
    }

    #[test]
    fn derived_probe_is_independent() {
        let live = LiveValue::new();
        let probe = live.probe();
        let derived = probe.map(|v: &i32| *v + 1);

        derived.dispose();
        live.set(1);

        probe.assert_value(&1);
        derived.assert_no_value();
        assert!(live.has_observers());
    }

    #[test]
    fn dropped_derived_probe_stops_forwarding() {
        let live = LiveValue::new();
        let probe = live.probe();
        drop(probe.map(|v: &i32| *v));
        live.set(1);
        probe.assert_value(&1);
    }

    #[test]
    fn derived_probe_can_be_awaited() {
        let live = LiveValue::new();
        let probe = live.probe();
        let doubled = probe.map(|v: &i32| v * 2);

        let publisher = live.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            publisher.set(21);
        });

        doubled.await_value().unwrap().assert_value(&42);
        handle.join().unwrap();
    }

    #[test]
    fn detached_probe_observes_manually_wired_source() {
        let live = LiveValue::new();
        let probe = ValueProbe::<i32>::new();
        let id = live.subscribe(probe.observer());

        for v in 1..=4 {
            live.set(v);
        }
        probe.assert_value(&4).assert_history_size(4).assert_never(|v| *v > 4);

        live.unsubscribe(id);
        assert!(!live.has_observers());
    }

    #[test]
    fn gate_controls_delivery() {
        let live = LiveValue::new();
        let gate = LifecycleGate::initialized();
        let probe = ValueProbe::attach_gated(&live, &gate);

        live.set(1);
        probe.assert_no_value();

        gate.create().unwrap();
        probe.assert_no_value();

        gate.start().unwrap();
        probe.assert_value(&1);

        live.set(2);
        probe.assert_value(&2);

        gate.stop().unwrap();
        live.set(3);
        probe.assert_value(&2);

        gate.move_to(crate::LifecycleState::Resumed).unwrap();
        probe.assert_value(&3).assert_history_size(3);
    }

    #[test]
    fn created_gate_delays_delivery_until_started() {
        let live = LiveValue::new();
        let gate = LifecycleGate::created();
        let probe = ValueProbe::attach_gated(&live, &gate);

        live.set(1);
        probe.assert_no_value();
        gate.start().unwrap();
        probe.assert_value(&1);
    }

    #[test]
    fn resumed_gate_delivers_immediately() {
        let live = LiveValue::new();
        let gate = LifecycleGate::resumed();
        let probe = ValueProbe::attach_gated(&live, &gate);

        live.set(1);
        probe.assert_value(&1);
    }

    #[test]
    fn dispose_unhooks_gate_listener() {
        let live = LiveValue::<i32>::new();
        let gate = LifecycleGate::started();
        let probe = ValueProbe::attach_gated(&live, &gate);
        assert_eq!(gate.listener_count(), 1);

        probe.dispose();
        assert_eq!(gate.listener_count(), 0);
        assert!(!live.has_observers());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn history_json_lists_values_in_order() {
        let live = LiveValue::new();
        let probe = live.probe();
        live.set(1);
        live.set(2);

        let parsed: Vec<i32> = serde_json::from_str(&probe.history_json().unwrap()).unwrap();
        assert_eq!(parsed, vec![1, 2]);
    }
}
