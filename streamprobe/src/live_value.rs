use std::{
    fmt,
    sync::{Arc, Mutex, Weak},
    thread::{self, ThreadId},
};

use crate::{
    LifecycleGate, LifecycleState, Observer, Source, SubscriptionId,
    internal::{ObserverEntry, lock},
};

/// A thread-safe observable holding the latest published value.
///
/// `LiveValue` is the reference [`Source`]: it buffers the most recent value,
/// hands it to every new subscriber, and delivers each [`set`](Self::set)
/// synchronously on the calling thread.
///
/// Observers subscribed through a [`LifecycleGate`] only receive values while
/// the gate is active. When the gate becomes active again they receive the
/// latest value once, if they have not seen it. When the gate is destroyed
/// they are removed.
///
/// Deliveries are serialized, so every observer sees versions in increasing
/// order even with concurrent publishers. Observers run without the value's
/// state lock held and may unsubscribe themselves, but must not publish into
/// or subscribe to the same `LiveValue`.
///
/// An observer may drive a gate that gates another subscriber of the same
/// `LiveValue`. Activations raised that way are delivered at the end of the
/// current round, before [`set`](Self::set) returns.
///
/// # Example
///
/// ```rust
/// use streamprobe::{LifecycleGate, LiveValue, ValueProbe};
///
/// let live = LiveValue::new();
/// let gate = LifecycleGate::created();
/// let probe = ValueProbe::attach_gated(&live, &gate);
///
/// live.set(1);
/// probe.assert_no_value();
///
/// gate.start()?;
/// probe.assert_value(&1);
/// # Ok::<(), streamprobe::Error>(())
/// ```
pub struct LiveValue<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    // Held for a whole delivery round so observers see versions in order.
    delivery: Mutex<()>,
    state: Mutex<State<T>>,
}

struct State<T> {
    value: Option<T>,
    version: u64,
    observers: Vec<ObserverEntry<T>>,
    next_id: u64,
    /// Thread currently calling observers, if any.
    round: Option<ThreadId>,
    /// Activations raised from within the running round.
    deferred: Vec<SubscriptionId>,
}

/// Clears the round marker even if an observer panics.
struct Round<'a, T> {
    state: &'a Mutex<State<T>>,
}

impl<T> Drop for Round<'_, T> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        state.round = None;
        state.deferred.clear();
    }
}

impl<T: Clone> State<T> {
    /// Claims the latest value for every listed observer that is active and
    /// has not seen it.
    fn claim_latest(&mut self, ids: &[SubscriptionId]) -> Vec<(Observer<T>, T)> {
        let version = self.version;
        let Self {
            value, observers, ..
        } = self;
        let Some(value) = value.as_ref() else {
            return Vec::new();
        };
        observers
            .iter_mut()
            .filter(|entry| ids.contains(&entry.id) && entry.is_active())
            .filter_map(|entry| entry.claim(version))
            .map(|observer| (observer, value.clone()))
            .collect()
    }
}

impl<T> Clone for LiveValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for LiveValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("LiveValue")
            .field("has_value", &state.value.is_some())
            .field("version", &state.version)
            .field("observers", &state.observers.len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for LiveValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> LiveValue<T> {
    /// Create a value stream with no value yet.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                delivery: Mutex::new(()),
                state: Mutex::new(State {
                    value: None,
                    version: 0,
                    observers: Vec::new(),
                    next_id: 0,
                    round: None,
                    deferred: Vec::new(),
                }),
            }),
        }
    }

    /// Create a value stream already holding `value`.
    pub fn with_value(value: T) -> Self {
        let live = Self::new();
        {
            let mut state = lock(&live.inner.state);
            state.value = Some(value);
            state.version = 1;
        }
        live
    }

    /// Returns a copy of the latest value, if any.
    pub fn get(&self) -> Option<T> {
        lock(&self.inner.state).value.clone()
    }

    /// Returns how many values have been published. Starts at 0 (or 1 for
    /// [`with_value`](Self::with_value)).
    pub fn version(&self) -> u64 {
        lock(&self.inner.state).version
    }

    /// Publish `value` to every active observer before returning.
    pub fn set(&self, value: T) {
        let _delivery = lock(&self.inner.delivery);
        self.publish(value);
    }

    /// Publish a value computed from the current one.
    ///
    /// Reading and publishing happen within one delivery round, so
    /// concurrent `update` calls don't lose increments.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(Option<&T>) -> T,
    {
        let _delivery = lock(&self.inner.delivery);
        let current = lock(&self.inner.state).value.clone();
        self.publish(f(current.as_ref()));
    }

    /// Caller holds the delivery lock.
    fn publish(&self, value: T) {
        let (version, targets) = {
            let mut state = lock(&self.inner.state);
            state.value = Some(value.clone());
            state.version += 1;
            let version = state.version;
            let targets: Vec<(Observer<T>, T)> = state
                .observers
                .iter_mut()
                .filter(|entry| entry.is_active())
                .filter_map(|entry| entry.claim(version))
                .map(|observer| (observer, value.clone()))
                .collect();
            (version, targets)
        };

        tracing::trace!(version, observers = targets.len(), "publishing value");
        self.run_round(targets);
    }

    /// Calls `deliveries`, then flushes activations the observers raised
    /// meanwhile. Caller holds the delivery lock.
    fn run_round(&self, deliveries: Vec<(Observer<T>, T)>) {
        lock(&self.inner.state).round = Some(thread::current().id());
        let _round = Round {
            state: &self.inner.state,
        };

        let mut pending = deliveries;
        while !pending.is_empty() {
            for (observer, value) in pending {
                observer(&value);
            }
            pending = {
                let mut state = lock(&self.inner.state);
                let ids = std::mem::take(&mut state.deferred);
                state.claim_latest(&ids)
            };
        }
    }

    fn add_observer<F>(&self, make_entry: F) -> SubscriptionId
    where
        F: FnOnce(SubscriptionId) -> ObserverEntry<T>,
    {
        let _delivery = lock(&self.inner.delivery);
        let (id, initial) = {
            let mut state = lock(&self.inner.state);
            let id = SubscriptionId::new(state.next_id);
            state.next_id += 1;

            let mut entry = make_entry(id);
            let version = state.version;
            let initial = match &state.value {
                Some(value) if entry.is_active() => {
                    entry.claim(version).map(|observer| (observer, value.clone()))
                }
                _ => None,
            };
            state.observers.push(entry);
            (id, initial)
        };

        tracing::debug!(subscription = id.as_u64(), "observer subscribed");
        self.run_round(initial.into_iter().collect());
        id
    }

    fn on_gate_changed(&self, id: SubscriptionId, gate_state: LifecycleState) {
        if gate_state == LifecycleState::Destroyed {
            tracing::debug!(subscription = id.as_u64(), "gate destroyed, removing observer");
            self.unsubscribe(id);
            return;
        }
        if !gate_state.is_active() {
            return;
        }

        {
            let mut state = lock(&self.inner.state);
            if state.round == Some(thread::current().id()) {
                tracing::trace!(subscription = id.as_u64(), "activation deferred to end of round");
                state.deferred.push(id);
                return;
            }
        }

        let _delivery = lock(&self.inner.delivery);
        let pending = lock(&self.inner.state).claim_latest(&[id]);
        if !pending.is_empty() {
            tracing::trace!(subscription = id.as_u64(), "delivering latest value on activation");
        }
        self.run_round(pending);
    }
}

impl<T: Clone + Send + Sync + 'static> Source<T> for LiveValue<T> {
    fn subscribe(&self, observer: Observer<T>) -> SubscriptionId {
        self.add_observer(|id| ObserverEntry::new(id, observer))
    }

    fn subscribe_gated(&self, gate: &LifecycleGate, observer: Observer<T>) -> SubscriptionId {
        if gate.state() == LifecycleState::Destroyed {
            let mut state = lock(&self.inner.state);
            let id = SubscriptionId::new(state.next_id);
            state.next_id += 1;
            tracing::debug!(subscription = id.as_u64(), "gate already destroyed, observer ignored");
            return id;
        }
        self.add_observer(|id| {
            let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
            let listener = gate.add_listener(move |state| {
                if let Some(inner) = weak.upgrade() {
                    LiveValue { inner }.on_gate_changed(id, state);
                }
            });
            ObserverEntry::gated(id, observer, gate.clone(), listener)
        })
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let removed = {
            let mut state = lock(&self.inner.state);
            let index = state.observers.iter().position(|entry| entry.id == id);
            index.map(|index| state.observers.remove(index))
        };
        if let Some(entry) = removed {
            entry.unhook();
            tracing::debug!(subscription = id.as_u64(), "observer unsubscribed");
        }
    }

    fn has_observers(&self) -> bool {
        !lock(&self.inner.state).observers.is_empty()
    }

    fn has_active_observers(&self) -> bool {
        lock(&self.inner.state)
            .observers
            .iter()
            .any(ObserverEntry::is_active)
    }
}
