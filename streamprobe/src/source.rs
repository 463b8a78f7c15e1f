use std::sync::Arc;

use crate::{LifecycleGate, ValueProbe};

/// Callback a source invokes for every value it delivers.
///
/// Sources call observers synchronously on the publishing thread.
pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Identifies one subscription on a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// An observable value stream a [`ValueProbe`] can attach to.
///
/// Implementors hold at most one current value and push each new value to
/// their subscribers. The probe relies on the following contract:
///
/// - Delivery is synchronous on the publishing thread, and each subscriber
///   sees values in publication order.
/// - A subscriber that joins while a value is held receives that value
///   before or during `subscribe` (if it is active at that point).
/// - A gated subscriber only receives values while its gate is active;
///   on re-activation it receives the *latest* value once, not the ones it
///   missed. Subscribing through a gate that is already destroyed
///   registers nothing.
/// - After `unsubscribe` no further values reach the subscriber, except one
///   delivery that was already in flight.
///
/// [`LiveValue`](crate::LiveValue) is the reference implementation.
pub trait Source<T>: Send + Sync {
    /// Subscribe an always-active observer.
    fn subscribe(&self, observer: Observer<T>) -> SubscriptionId;

    /// Subscribe an observer whose delivery is gated by `gate`.
    fn subscribe_gated(&self, gate: &LifecycleGate, observer: Observer<T>) -> SubscriptionId;

    /// Remove a subscription. Unknown or already removed ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    /// Returns true if any observer is subscribed, active or not.
    fn has_observers(&self) -> bool;

    /// Returns true if any subscribed observer is currently allowed to
    /// receive values.
    fn has_active_observers(&self) -> bool;
}

/// Shorthand for attaching a probe to a source.
///
/// ```rust
/// use streamprobe::{LiveValue, SourceExt};
///
/// let live = LiveValue::with_value(3);
/// live.probe().assert_value(&3).assert_history_size(1);
/// ```
pub trait SourceExt<T>: Source<T> {
    /// Attach a new [`ValueProbe`] to this source.
    fn probe(&self) -> ValueProbe<T>
    where
        Self: Clone + Sized + 'static,
        T: Clone + Send + Sync + 'static,
    {
        ValueProbe::attach(self)
    }
}

impl<T, S: Source<T>> SourceExt<T> for S {}
