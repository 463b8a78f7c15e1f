use std::fmt;

/// Lifecycle states of a [`LifecycleGate`](crate::LifecycleGate).
///
/// States form an ordered lattice, declared in ascending order:
///
/// `Destroyed < Initialized < Created < Started < Resumed`
///
/// A gate is *active* while it is at least [`Started`](Self::Started).
/// Sources attached to a gate only deliver values while it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LifecycleState {
    /// Terminal state. No transition leaves it.
    Destroyed,
    /// Freshly constructed, not yet created.
    Initialized,
    Created,
    Started,
    Resumed,
}

impl LifecycleState {
    /// Returns true if `self` is `state` or above it in the lattice.
    pub fn is_at_least(self, state: LifecycleState) -> bool {
        self >= state
    }

    /// Returns true for `Started` and `Resumed`.
    pub fn is_active(self) -> bool {
        self.is_at_least(LifecycleState::Started)
    }

    /// Returns the event whose single edge leads from `self` one step
    /// towards `target`, or `None` if `target` is `self` or unreachable.
    ///
    /// Nothing leads back to `Initialized` and nothing leaves `Destroyed`.
    pub(crate) fn step_towards(self, target: LifecycleState) -> Option<LifecycleEvent> {
        use LifecycleState::*;
        if self == target || self == Destroyed || target == Initialized {
            return None;
        }
        match (self, target) {
            (Initialized, _) => Some(LifecycleEvent::Create),
            (Created, Destroyed) => Some(LifecycleEvent::Destroy),
            (Created, _) => Some(LifecycleEvent::Start),
            (Started, Resumed) => Some(LifecycleEvent::Resume),
            (Started, _) => Some(LifecycleEvent::Stop),
            (Resumed, _) => Some(LifecycleEvent::Pause),
            (Destroyed, _) => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Destroyed => "destroyed",
            Self::Initialized => "initialized",
            Self::Created => "created",
            Self::Started => "started",
            Self::Resumed => "resumed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-step lifecycle transition.
///
/// Every event is legal from exactly one state:
///
/// | Event | From | To |
/// |-------|------|----|
/// | [`Create`](Self::Create) | `Initialized` | `Created` |
/// | [`Start`](Self::Start) | `Created` | `Started` |
/// | [`Resume`](Self::Resume) | `Started` | `Resumed` |
/// | [`Pause`](Self::Pause) | `Resumed` | `Started` |
/// | [`Stop`](Self::Stop) | `Started` | `Created` |
/// | [`Destroy`](Self::Destroy) | `Created` | `Destroyed` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// The only state this event may be applied in.
    pub fn source(self) -> LifecycleState {
        match self {
            Self::Create => LifecycleState::Initialized,
            Self::Start | Self::Destroy => LifecycleState::Created,
            Self::Resume | Self::Stop => LifecycleState::Started,
            Self::Pause => LifecycleState::Resumed,
        }
    }

    /// The state this event leads to.
    pub fn target(self) -> LifecycleState {
        match self {
            Self::Create | Self::Stop => LifecycleState::Created,
            Self::Start | Self::Pause => LifecycleState::Started,
            Self::Resume => LifecycleState::Resumed,
            Self::Destroy => LifecycleState::Destroyed,
        }
    }
}
