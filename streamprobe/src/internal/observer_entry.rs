use crate::{LifecycleGate, ListenerId, Observer, SubscriptionId};

/// One subscriber of a [`LiveValue`](crate::LiveValue).
pub(crate) struct ObserverEntry<T> {
    pub(crate) id: SubscriptionId,
    pub(crate) observer: Observer<T>,
    pub(crate) gate: Option<(LifecycleGate, ListenerId)>,
    /// Version of the last value handed to `observer`. Versions start at 1,
    /// so 0 means nothing was delivered yet.
    pub(crate) last_version: u64,
}

impl<T> ObserverEntry<T> {
    pub(crate) fn new(id: SubscriptionId, observer: Observer<T>) -> Self {
        Self {
            id,
            observer,
            gate: None,
            last_version: 0,
        }
    }

    pub(crate) fn gated(
        id: SubscriptionId,
        observer: Observer<T>,
        gate: LifecycleGate,
        listener: ListenerId,
    ) -> Self {
        Self {
            gate: Some((gate, listener)),
            ..Self::new(id, observer)
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.gate.as_ref().is_none_or(|(gate, _)| gate.is_active())
    }

    /// Marks `version` as delivered and returns the observer if it has not
    /// seen that version yet.
    pub(crate) fn claim(&mut self, version: u64) -> Option<Observer<T>> {
        if self.last_version >= version {
            return None;
        }
        self.last_version = version;
        Some(self.observer.clone())
    }

    pub(crate) fn unhook(&self) {
        if let Some((gate, listener)) = &self.gate {
            gate.remove_listener(*listener);
        }
    }
}
