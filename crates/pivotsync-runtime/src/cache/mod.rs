mod regions;
mod views;

pub use regions::RegionCache;
pub use views::ViewCache;

use std::sync::{Mutex, MutexGuard};

/// Poison-tolerant lock. Writers only ever replace whole values.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
