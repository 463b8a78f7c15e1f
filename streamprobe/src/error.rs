use crate::LifecycleState;

/// The single error type for all fallible streamprobe operations.
///
/// Assertion mismatches are not represented here: `assert_*` methods panic
/// on the calling thread like `assert!` does. This enum covers the outcomes
/// a test may want to match on instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The probe was disposed before the awaited value arrived.
    ///
    /// Returned by the `await_*` methods (and async expectations) so that
    /// "the probe was torn down" is distinguishable from a timeout, which
    /// is not an error.
    #[error("Probe was disposed while waiting for a value")]
    Disposed,

    /// A lifecycle transition that is not an edge of the lifecycle graph.
    #[error("Illegal lifecycle transition from {from} to {to}")]
    IllegalTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
}

impl Error {
    pub(crate) fn illegal(from: LifecycleState, to: LifecycleState) -> Self {
        Error::IllegalTransition { from, to }
    }
}
