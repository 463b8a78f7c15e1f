use std::{
    fmt,
    sync::{Arc, Mutex},
};

use crate::{Error, LifecycleEvent, LifecycleState, Result, internal::lock};

/// Callback invoked with the new state after every single-step transition.
pub type Listener = Arc<dyn Fn(LifecycleState) + Send + Sync>;

/// Identifies a listener registered with [`LifecycleGate::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A minimal host lifecycle, used to decide when a source may deliver.
///
/// The gate walks the edge graph
///
/// ```text
/// Initialized -> Created -> Started -> Resumed
/// Resumed -> Started -> Created -> Destroyed
/// ```
///
/// one edge per call. Requests off the graph fail with
/// [`Error::IllegalTransition`] and leave the state untouched.
/// [`move_to`](Self::move_to) walks several edges, each
/// of which is reported to listeners in order.
///
/// Sources subscribed through a gate (see
/// [`Source::subscribe_gated`](crate::Source::subscribe_gated)) only deliver
/// while the gate [`is_active`](Self::is_active).
///
/// `LifecycleGate` is a cheap-to-clone handle; clones share state.
///
/// # Example
///
/// ```rust
/// use streamprobe::{LifecycleGate, LifecycleState};
///
/// let gate = LifecycleGate::resumed();
/// gate.pause()?.stop()?.destroy()?;
/// assert_eq!(gate.state(), LifecycleState::Destroyed);
///
/// // No skipping edges
/// assert!(LifecycleGate::initialized().start().is_err());
/// # Ok::<(), streamprobe::Error>(())
/// ```
#[derive(Clone)]
pub struct LifecycleGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    // Held for a whole transition, listener calls included, so that
    // listeners observe states in transition order.
    transition: Mutex<()>,
    state: Mutex<GateState>,
}

struct GateState {
    current: LifecycleState,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl fmt::Debug for LifecycleGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("LifecycleGate")
            .field("state", &state.current)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl Default for LifecycleGate {
    fn default() -> Self {
        Self::initialized()
    }
}

impl LifecycleGate {
    /// A gate in the `Initialized` state.
    pub fn initialized() -> Self {
        Self::in_state(LifecycleState::Initialized)
    }

    /// A gate in the `Created` state (inactive).
    pub fn created() -> Self {
        Self::in_state(LifecycleState::Created)
    }

    /// A gate in the `Started` state (active).
    pub fn started() -> Self {
        Self::in_state(LifecycleState::Started)
    }

    /// A gate in the `Resumed` state (active).
    pub fn resumed() -> Self {
        Self::in_state(LifecycleState::Resumed)
    }

    /// A fresh gate has no listeners, so starting in `current` is
    /// indistinguishable from walking the edges up to it.
    fn in_state(current: LifecycleState) -> Self {
        Self {
            inner: Arc::new(GateInner {
                transition: Mutex::new(()),
                state: Mutex::new(GateState {
                    current,
                    listeners: Vec::new(),
                    next_listener_id: 0,
                }),
            }),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> LifecycleState {
        lock(&self.inner.state).current
    }

    /// Returns true while the state is `Started` or `Resumed`.
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// `Initialized -> Created`
    pub fn create(&self) -> Result<&Self> {
        self.handle_event(LifecycleEvent::Create)
    }

    /// `Created -> Started`
    pub fn start(&self) -> Result<&Self> {
        self.handle_event(LifecycleEvent::Start)
    }

    /// `Started -> Resumed`
    pub fn resume(&self) -> Result<&Self> {
        self.handle_event(LifecycleEvent::Resume)
    }

    /// `Resumed -> Started`
    pub fn pause(&self) -> Result<&Self> {
        self.handle_event(LifecycleEvent::Pause)
    }

    /// `Started -> Created`
    pub fn stop(&self) -> Result<&Self> {
        self.handle_event(LifecycleEvent::Stop)
    }

    /// `Created -> Destroyed`
    pub fn destroy(&self) -> Result<&Self> {
        self.handle_event(LifecycleEvent::Destroy)
    }

    /// Apply a single lifecycle event.
    ///
    /// Fails with [`Error::IllegalTransition`] unless the gate is in the
    /// event's [`source`](LifecycleEvent::source) state. On success every
    /// listener is called with the new state on this thread, after the state
    /// lock has been released.
    ///
    /// Listeners must not drive transitions on the same gate.
    pub fn handle_event(&self, event: LifecycleEvent) -> Result<&Self> {
        let _transition = lock(&self.inner.transition);
        let (from, listeners) = {
            let mut state = lock(&self.inner.state);
            let from = state.current;
            if from != event.source() {
                tracing::debug!(%from, to = %event.target(), "rejecting lifecycle transition");
                return Err(Error::illegal(from, event.target()));
            }
            state.current = event.target();
            let listeners: Vec<Listener> =
                state.listeners.iter().map(|(_, l)| l.clone()).collect();
            (from, listeners)
        };

        tracing::debug!(
            %from,
            to = %event.target(),
            listeners = listeners.len(),
            "lifecycle transition"
        );
        for listener in listeners {
            listener(event.target());
        }
        Ok(self)
    }

    /// Walk edge by edge to `target`.
    ///
    /// Each intermediate state is a real transition that listeners observe.
    /// Moving to the current state is a no-op. Fails if `target` cannot be
    /// reached (back to `Initialized`, or out of `Destroyed`).
    pub fn move_to(&self, target: LifecycleState) -> Result<&Self> {
        loop {
            let current = self.state();
            if current == target {
                return Ok(self);
            }
            match current.step_towards(target) {
                Some(event) => {
                    self.handle_event(event)?;
                }
                None => return Err(Error::illegal(current, target)),
            }
        }
    }

    /// Register a callback for state changes.
    ///
    /// The listener is not called with the current state, only with
    /// subsequent ones.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(LifecycleState) + Send + Sync + 'static,
    {
        let mut state = lock(&self.inner.state);
        let id = ListenerId(state.next_listener_id);
        state.next_listener_id += 1;
        state.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn remove_listener(&self, id: ListenerId) {
        lock(&self.inner.state)
            .listeners
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.state).listeners.len()
    }
}
