mod history;
mod observer_entry;

pub(crate) use history::History;
pub(crate) use observer_entry::ObserverEntry;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the guard if a panicking callback poisoned it.
///
/// Every structure guarded this way is append-only or replaced wholesale,
/// so the state seen after a panic is still consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
